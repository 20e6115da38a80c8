//! Names for temporary media files.

use rand::Rng;

/// `{unix-nanos}_{0..=100}.{ext}`. Concurrent handlers share one working
/// directory.
pub fn random_file_name(extension: &str) -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    let suffix: u8 = rand::thread_rng().gen_range(0..=100);
    format!("{}_{}.{}", nanos, suffix, extension.trim_start_matches('.'))
}
