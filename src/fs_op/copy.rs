use std::fs;
use std::path::Path;

use tracing::trace;

use crate::fs_op::error::FsOpError;
use crate::fs_op::helpers::atomic_copy_file;

/// Recursively copy the contents of `source` into `target`.
///
/// Files are copied one at a time through `atomic_copy_file`, so a partially
/// written file is never visible under its final name; an existing same-named
/// file is replaced wholesale. Directory entries are created (or reused)
/// under `target` and recursed into. Entries present at `target` but absent
/// at `source` are left alone: this is a merge/overwrite copy, not a mirror.
///
/// Enumeration order is whatever the platform yields; since sibling entries
/// are disjoint by name the outcome does not depend on it. A failed read or
/// write aborts the branch being copied and propagates; already-copied
/// files stay where they are, so the target may hold a partial subtree after
/// an error. That limitation is accepted; callers report the failure instead
/// of rolling back.
pub fn copy_dir(source: &Path, target: &Path) -> Result<(), FsOpError> {
    fs::create_dir_all(target).map_err(|e| FsOpError::path("create directory", target, e))?;

    let entries =
        fs::read_dir(source).map_err(|e| FsOpError::path("read directory", source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FsOpError::path("read directory", source, e))?;
        let child = entry.path();
        let dest = target.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| FsOpError::path("stat", &child, e))?;
        if file_type.is_dir() {
            copy_dir(&child, &dest)?;
        } else {
            trace!(from = %child.display(), to = %dest.display(), "copying file");
            atomic_copy_file(&child, &dest)
                .map_err(|e| FsOpError::path("copy file", &child, e))?;
        }
    }
    Ok(())
}
