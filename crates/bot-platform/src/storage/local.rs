//! Local directory backend for downloaded and generated media.
//! Files are never deleted.

use std::path::PathBuf;
use async_trait::async_trait;
use bot_core::ports::FileStorePort;
use bot_types::{BotError, Result};

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

fn fs_error(path: &PathBuf, e: std::io::Error) -> BotError {
    BotError::Fs {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl FileStorePort for LocalFileStore {
    async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| fs_error(&self.root, e))
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.root.join(name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| fs_error(&path, e))?;
        log::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(path)
    }
}
