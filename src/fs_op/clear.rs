use std::fs;
use std::path::Path;

use tracing::trace;

use crate::fs_op::error::FsOpError;

/// Remove every immediate entry of `target` without removing `target`
/// itself. Directory entries are deleted together with their whole subtree;
/// file entries are removed singly.
///
/// Removal is not atomic across entries: when one removal fails the error
/// propagates immediately and the directory is left with a mix of removed
/// and surviving entries. Callers verify write access before invoking this.
pub fn clear_dir(target: &Path) -> Result<(), FsOpError> {
    let entries =
        fs::read_dir(target).map_err(|e| FsOpError::path("read directory", target, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FsOpError::path("read directory", target, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| FsOpError::path("stat", &path, e))?;
        trace!(path = %path.display(), "removing entry");
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| FsOpError::path("remove directory", &path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| FsOpError::path("remove file", &path, e))?;
        }
    }
    Ok(())
}
