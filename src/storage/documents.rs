//! Document store
//!
//! Plain-text documents addressed by name, stored flat as `<root>/<name>.txt`.

use log::{error, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;

use crate::error::StoreError;
use crate::storage::filesystem::{WriteMode, file_exists, read_text, write_atomic};
use crate::storage::results::{DocumentEntry, epoch_millis};
use crate::storage::validation::{is_valid_document_name, with_extension_once};

/// Extension appended to every document file
pub const DOCUMENT_EXTENSION: &str = ".txt";

const DELETE_RETRIES: u32 = 3;

/// Name-addressed text documents confined to one directory
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate `name` and map it to its file. No filesystem access.
    fn document_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_document_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self
            .root
            .join(with_extension_once(name, DOCUMENT_EXTENSION)))
    }

    /// Store `content` under `name`, returning what was stored.
    ///
    /// Without `overwrite` an existing document is left untouched and
    /// `AlreadyExists` is returned.
    pub async fn put(
        &self,
        name: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<String, StoreError> {
        let path = self.document_path(name)?;

        if !overwrite && file_exists(&path).await? {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }

        let mode = if overwrite {
            WriteMode::Replace
        } else {
            WriteMode::CreateNew
        };

        match write_atomic(&path, content.as_bytes(), mode).await {
            Ok(()) => {
                info!("Saved document {} ({} bytes)", path.display(), content.len());
                Ok(content.to_string())
            }
            // Another writer created it between the check and the publish
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(name.to_string()))
            }
            Err(e) => {
                error!("Failed to save document {}: {}", path.display(), e);
                Err(StoreError::Storage(e))
            }
        }
    }

    /// Read the full content of a document
    pub async fn get(&self, name: &str) -> Result<String, StoreError> {
        let path = self.document_path(name)?;

        match read_text(&path).await? {
            Some(content) => Ok(content),
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    /// Delete a document
    pub async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.document_path(name)?;

        // Retry briefly on permission errors, e.g. a file held open elsewhere
        for attempt in 1..=DELETE_RETRIES {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    info!("Deleted document {}", path.display());
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(StoreError::NotFound(name.to_string()));
                }
                Err(e)
                    if attempt < DELETE_RETRIES
                        && e.kind() == io::ErrorKind::PermissionDenied =>
                {
                    warn!(
                        "Delete of {} denied (attempt {}/{}), retrying",
                        path.display(),
                        attempt,
                        DELETE_RETRIES
                    );
                    tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                }
                Err(e) => {
                    error!("Failed to delete document {}: {}", path.display(), e);
                    return Err(StoreError::Storage(e));
                }
            }
        }

        Err(StoreError::Storage(io::Error::new(
            io::ErrorKind::Other,
            "Failed to delete document after retries",
        )))
    }

    /// List all documents, most recently modified first
    pub async fn list(&self) -> Result<Vec<DocumentEntry>, StoreError> {
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            error!("Failed to list {}: {}", self.root.display(), e);
            StoreError::Storage(e)
        })?;

        let mut found: Vec<(SystemTime, String)> = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            // Hidden entries include in-flight temp files
            if file_name.starts_with('.') {
                continue;
            }
            let Some(name) = file_name.strip_suffix(DOCUMENT_EXTENSION) else {
                continue;
            };

            let metadata = match fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                // Deleted while listing
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::Storage(e)),
            };
            if !metadata.is_file() {
                continue;
            }

            found.push((metadata.modified()?, name.to_string()));
        }

        found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        info!("Listed {} documents in {}", found.len(), self.root.display());

        Ok(found
            .into_iter()
            .map(|(modified, name)| DocumentEntry {
                name,
                modified_millis: epoch_millis(modified),
            })
            .collect())
    }
}
