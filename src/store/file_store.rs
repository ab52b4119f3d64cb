//! JSON file snapshot store

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::aggregate::VisitAggregate;

use super::StoreError;

/// Visit Store
///
/// Holds only the snapshot path. The aggregate itself is owned by the
/// engine and passed in on every save.
#[derive(Debug, Clone)]
pub struct VisitStore {
    path: PathBuf,
}

impl VisitStore {
    /// Create a store bound to a snapshot path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot path
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // load
    // =========================================================================

    /// Load the snapshot
    ///
    /// A missing or blank file is a first run. A file that does not parse is
    /// moved aside and replaced by an empty aggregate. Any other read failure
    /// is returned, since defaulting would overwrite history on the next save.
    pub async fn load(&self) -> Result<VisitAggregate, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No visit snapshot found, starting fresh");
                return Ok(VisitAggregate::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::info!(path = %self.path.display(), "Visit snapshot is empty, starting fresh");
            return Ok(VisitAggregate::new());
        }

        match serde_json::from_slice::<VisitAggregate>(&bytes) {
            Ok(aggregate) => {
                tracing::debug!(
                    path = %self.path.display(),
                    total = aggregate.total(),
                    unique = aggregate.unique_total().len(),
                    "Visit snapshot loaded"
                );
                Ok(aggregate)
            }
            Err(e) => {
                let moved_to = self.quarantine().await?;
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %moved_to.display(),
                    error = %e,
                    "Visit snapshot is corrupt, starting fresh"
                );
                Ok(VisitAggregate::new())
            }
        }
    }

    /// Move an unparseable snapshot out of the way so it is not overwritten
    async fn quarantine(&self) -> Result<PathBuf, StoreError> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "visits.json".to_string());
        let target = self.path.with_file_name(format!(
            "{}.corrupt-{}",
            file_name,
            Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
        ));

        fs::rename(&self.path, &target)
            .await
            .map_err(|source| StoreError::Quarantine {
                path: self.path.clone(),
                source,
            })?;

        Ok(target)
    }

    // =========================================================================
    // save
    // =========================================================================

    /// Save the full snapshot, replacing prior content
    ///
    /// Written to a temporary file in the same directory and renamed over
    /// the target, so readers only ever see the old or the new snapshot.
    pub async fn save(&self, aggregate: &VisitAggregate) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(aggregate)?;
        self.atomic_write(&payload).await?;

        tracing::debug!(
            path = %self.path.display(),
            bytes = payload.len(),
            total = aggregate.total(),
            "Visit snapshot saved"
        );

        Ok(())
    }

    async fn atomic_write(&self, payload: &[u8]) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(payload).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await?;

            // The rename is only durable once the directory entry is synced
            #[cfg(unix)]
            {
                let dir = self
                    .path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                fs::File::open(dir).await?.sync_all().await?;
            }

            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(source) = written {
            // Leftover temp file is harmless, but don't litter the directory
            let _ = fs::remove_file(&temp_path).await;
            return Err(write_err(source));
        }

        Ok(())
    }
}
