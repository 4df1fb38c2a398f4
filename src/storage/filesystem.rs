//! File system operations
//!
//! Atomic writes and small read helpers shared by the stores.

use log::{debug, error};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// How an atomic write publishes the finished temp file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace whatever is at the target
    Replace,
    /// Fail with `AlreadyExists` if the target is present
    CreateNew,
}

/// Build a hidden, per-write temp path next to `target`.
///
/// The leading dot keeps it out of document listings and makes it an invalid
/// document name, so it can never collide with a stored file. The name is
/// short and independent of the target's, so any target that fits the
/// filename limit also has a temp file that fits.
fn temp_path_for(target: &Path) -> PathBuf {
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    target.with_file_name(format!(".tmp-{}-{}", std::process::id(), seq))
}

async fn write_temp(temp_path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

/// Write `content` to `target` atomically.
///
/// Data lands in a temp file which is synced and then moved into place, so
/// readers see either the old bytes or the new bytes. On any failure the temp file
/// is removed and the error returned.
pub async fn write_atomic(target: &Path, content: &[u8], mode: WriteMode) -> io::Result<()> {
    let temp_path = temp_path_for(target);

    if let Err(e) = write_temp(&temp_path, content).await {
        error!("Failed to write temporary file {}: {}", temp_path.display(), e);
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    let published = match mode {
        WriteMode::Replace => fs::rename(&temp_path, target).await,
        // A hard link never clobbers an existing target
        WriteMode::CreateNew => {
            let linked = fs::hard_link(&temp_path, target).await;
            if linked.is_ok() {
                if let Err(e) = fs::remove_file(&temp_path).await {
                    debug!("Leftover temp file {}: {}", temp_path.display(), e);
                }
            }
            linked
        }
    };

    if let Err(e) = published {
        if e.kind() != io::ErrorKind::AlreadyExists {
            error!(
                "Failed to move {} to {}: {}",
                temp_path.display(),
                target.display(),
                e
            );
        }
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    debug!("Wrote {} bytes to {}", content.len(), target.display());
    Ok(())
}

/// Check if a regular file exists
pub async fn file_exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Read a text file, mapping absence to `None`
pub async fn read_text(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Create a directory and its parents
pub async fn create_directory(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await
}
