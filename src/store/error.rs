//! Visit Store Errors
//!
//! Error types for snapshot persistence.

use std::path::PathBuf;

/// Errors that can occur while loading or saving the visit snapshot
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Snapshot exists but could not be read
    #[error("Failed to read visit snapshot '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be written or moved into place
    #[error("Failed to write visit snapshot '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Corrupt snapshot could not be moved aside
    #[error("Failed to quarantine corrupt visit snapshot '{}': {source}", .path.display())]
    Quarantine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Path of the file the failed operation touched, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            StoreError::Read { path, .. }
            | StoreError::Write { path, .. }
            | StoreError::Quarantine { path, .. } => Some(path),
            StoreError::Serialization(_) => None,
        }
    }
}
