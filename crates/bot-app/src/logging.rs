use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber and read `.env` if present.
///
/// `RUST_LOG` controls filtering, defaulting to `info`. Records from the
/// library crates' `log` calls are captured too.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!("Read dotenv file from: {}", path.display()),
        Err(dotenvy::Error::Io(io_error)) if io_error.kind() == std::io::ErrorKind::NotFound => {
            info!("Couldn't find a dotenv file");
        }
        Err(err) => warn!("Error reading dotenv file: {err}"),
    }
}
