// File-backed snapshot store: one JSON file per key
use crate::application::snapshot_store::SnapshotStore;
use crate::domain::measurement::Dataset;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot in {path} is not a dataset: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, key: &str) -> Self {
        let dir = dir.into();
        let path = dir.join(format!("{}.json", key));
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the slot; `None` when nothing has been saved yet.
    pub async fn read_snapshot(&self) -> Result<Option<Dataset>, SnapshotError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(&self.path, source)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| SnapshotError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    /// Replace the slot. The new contents are written beside it and renamed
    /// into place, so readers see either the old or the new dataset.
    pub async fn write_snapshot(&self, dataset: &Dataset) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec(dataset).map_err(SnapshotError::Encode)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| self.io_error(&self.dir, source))?;

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, &json)
            .await
            .map_err(|source| self.io_error(&staging, source))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|source| self.io_error(&self.path, source))?;

        Ok(())
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Dataset {
        match self.read_snapshot().await {
            Ok(Some(dataset)) => {
                tracing::debug!(rows = dataset.len(), "Loaded snapshot");
                dataset
            }
            Ok(None) => Dataset::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable snapshot");
                Dataset::new()
            }
        }
    }

    async fn save(&self, dataset: &Dataset) {
        match self.write_snapshot(dataset).await {
            Ok(()) => tracing::debug!(rows = dataset.len(), "Saved snapshot"),
            Err(e) => tracing::warn!(error = %e, "Could not save snapshot"),
        }
    }
}
