//! Dictionary data source
//!
//! Read-only access to caller-named files under the dictionaries root. Sources
//! are free-form paths, so every read goes through
//! [`resolve_dictionary_path`] first.

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::storage::filesystem::read_text;
use crate::storage::validation::resolve_dictionary_path;

/// The only supported source type
pub const FILE_SOURCE_TYPE: &str = "file";

#[derive(Debug, Clone)]
pub struct DictionaryStore {
    root: PathBuf,
}

impl DictionaryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the text of `source`, which must resolve inside the root
    pub async fn fetch(&self, source_type: &str, source: &str) -> Result<String, StoreError> {
        if source_type != FILE_SOURCE_TYPE {
            return Err(StoreError::UnsupportedType(source_type.to_string()));
        }

        if source.is_empty() {
            return Err(StoreError::MissingParameter("source"));
        }

        let Some(path) = resolve_dictionary_path(source, &self.root).await else {
            warn!("Denied dictionary access to '{}'", source);
            return Err(StoreError::AccessDenied(source.to_string()));
        };

        match read_text(&path).await? {
            Some(data) => {
                info!("Served dictionary {} ({} bytes)", path.display(), data.len());
                Ok(data)
            }
            None => Err(StoreError::NotFound(source.to_string())),
        }
    }
}
