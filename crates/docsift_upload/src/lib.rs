use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

/// A file received on the upload endpoint. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub media_type: String,
    pub file_name: String,
    pub payload: Bytes,
}

#[derive(Debug, Error)]
pub enum TempStorageError {
    #[error("failed to create temp file in {dir}: {source}")]
    Create {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write temp file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory that holds request-scoped upload files.
#[derive(Debug, Clone)]
pub struct TempStorage {
    dir: PathBuf,
}

impl TempStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Writes the payload to a fresh, uniquely named file.
    pub async fn store(&self, payload: Bytes) -> Result<TempUpload, TempStorageError> {
        let (_, path) = tempfile::Builder::new()
            .prefix("upload-")
            .rand_bytes(12)
            .tempfile_in(&self.dir)
            .and_then(|file| file.keep().map_err(|err| err.error))
            .map_err(|source| TempStorageError::Create {
                dir: self.dir.clone(),
                source,
            })?;

        // from here on the guard owns the path, including on write failure
        let upload = TempUpload::new(path);
        tokio::fs::write(upload.path(), &payload)
            .await
            .map_err(|source| TempStorageError::Write {
                path: upload.path().to_path_buf(),
                source,
            })?;

        Ok(upload)
    }
}

/// Handle to one stored upload. `release` removes the file; dropping an
/// unreleased handle removes it synchronously.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    released: bool,
}

impl TempUpload {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Safe to call more than once. Failures are logged, never returned.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        release_path(&self.path).await;
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to remove temp upload on drop");
            }
        }
    }
}

/// Removes a file, treating an already missing file as success.
pub async fn release_path(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "temp upload released"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to remove temp upload");
        }
    }
}
