//! JSON-file pending store with atomic overwrite.
//!
//! The snapshot is a single JSON document. Saves write a sibling temp
//! file and rename it over the target, so a crash mid-save leaves either
//! the previous snapshot or the new one intact. A missing file loads as
//! an empty log; an unparseable file is [`StoreError::Corrupt`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::traits::{PendingStore, StoreError};
use crate::mutation::MutationLog;

pub struct FilePendingStore {
    path: PathBuf,
}

impl FilePendingStore {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl PendingStore for FilePendingStore {
    async fn load(&self) -> Result<MutationLog, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No pending snapshot, starting empty");
                return Ok(MutationLog::new());
            }
            Err(e) => return Err(StoreError::Unavailable(e.to_string())),
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn save(&self, log: &MutationLog) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(log).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            }
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        debug!(
            path = %self.path.display(),
            entries = log.len(),
            bytes = bytes.len(),
            "Pending snapshot saved"
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }
}
