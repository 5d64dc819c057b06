//! Directory-backed storage for uploaded task files

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Uploaded files keyed by their (sanitized) file name
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reduce a client-supplied name to its last path component
    pub fn sanitize(name: &str) -> Result<String, StoreError> {
        let last = name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if last.is_empty() || last == "." || last == ".." {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(last.to_string())
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(Self::sanitize(name)?))
    }

    /// Store `bytes`, replacing an earlier upload with the same name
    pub fn save(&self, name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let name = Self::sanitize(name)?;
        std::fs::write(self.root.join(&name), bytes)?;
        tracing::info!(file = %name, bytes = bytes.len(), "stored upload");
        Ok(name)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(name)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io(e),
        })
    }
}
