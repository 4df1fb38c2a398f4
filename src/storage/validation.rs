//! Name and path validation
//!
//! Decides which caller-supplied identifiers may become filenames, and confines
//! free-form dictionary paths to their root directory.

use log::warn;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Maximum length of a document name, in characters
pub const MAX_DOCUMENT_NAME_LENGTH: usize = 64;

/// Characters that may never appear in a document name
const FORBIDDEN_NAME_CHARS: &[char] = &['/', '\\', ':', '<', '>', '"', '|', '?', '*'];

/// Rules shared by document names and settings keys
fn has_dot_hazard(s: &str) -> bool {
    s.starts_with('.') || s.ends_with('.') || s.contains("..")
}

/// Validate a document name.
///
/// Accepts 1-64 characters with no leading/trailing dot, no `..` and none of
/// `/ \ : < > " | ? *`. Non-ASCII characters are allowed.
pub fn is_valid_document_name(name: &str) -> bool {
    if name.is_empty() || name.chars().count() > MAX_DOCUMENT_NAME_LENGTH {
        return false;
    }

    if has_dot_hazard(name) {
        return false;
    }

    !name.contains(FORBIDDEN_NAME_CHARS)
}

/// Validate a settings key or level.
///
/// The whole string must consist of `[a-zA-Z0-9._-]`, with the same dot rules as
/// document names. Keys end up in `<level>.<key>.json`, so the alphabet is strict.
pub fn is_valid_key(key: &str) -> bool {
    if key.is_empty() || has_dot_hazard(key) {
        return false;
    }

    key.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Append `extension` (including its dot) unless the name already carries it
pub fn with_extension_once(name: &str, extension: &str) -> String {
    if name.ends_with(extension) {
        name.to_string()
    } else {
        format!("{}{}", name, extension)
    }
}

/// Resolve a path through the filesystem, tolerating a missing tail.
///
/// Each prefix that exists is canonicalized (following symlinks), so `..` always
/// applies to the real parent. Components that do not exist yet are kept as-is.
async fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => {
                resolved.push(part);
                match fs::canonicalize(&resolved).await {
                    Ok(canonical) => resolved = canonical,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
        }
    }

    Ok(resolved)
}

/// Resolve `source` against `root` and confirm it stays inside.
///
/// Relative sources are joined to the root; absolute ones are taken as-is. Returns
/// `None` when resolution fails or the resolved path is not the root or below it.
pub async fn resolve_dictionary_path(source: &str, root: &Path) -> Option<PathBuf> {
    let root_canonical = match fs::canonicalize(root).await {
        Ok(path) => path,
        Err(e) => {
            warn!("Cannot resolve dictionary root {}: {}", root.display(), e);
            return None;
        }
    };

    let requested = Path::new(source);
    let candidate = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root_canonical.join(requested)
    };

    let resolved = match resolve_lenient(&candidate).await {
        Ok(path) => path,
        Err(e) => {
            warn!("Cannot resolve dictionary source '{}': {}", source, e);
            return None;
        }
    };

    // Component-wise containment, not a string prefix test
    if resolved.starts_with(&root_canonical) {
        Some(resolved)
    } else {
        warn!(
            "Rejected dictionary source '{}' resolving outside {}",
            source,
            root_canonical.display()
        );
        None
    }
}
