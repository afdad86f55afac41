use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use fs_extra::file::{copy as fs_extra_copy, CopyOptions};

/// Buffer size for file copies (64 KiB), balancing throughput and memory.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Build a unique temporary path in the same directory as `target`.
///
/// The suffix combines the process id, a nanosecond timestamp and a global
/// sequence counter so rapid or concurrent operations never collide on the
/// temp name without pulling in a randomness dependency.
fn temp_sibling(target: &Path, prefix: &str) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};
    static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let pid = std::process::id();
    let seq = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
    let name = format!("{prefix}.{pid:x}{nanos:x}{seq:x}");
    match target.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Write `data` to `target` atomically by writing to a temporary file in the
/// same directory and then renaming into place. This avoids partial writes
/// being observed by other processes.
pub fn atomic_write(target: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = temp_sibling(target, ".tmp_atomic_write");
    if let Err(e) = fs::write(&tmp, data) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    match fs::rename(&tmp, target) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

/// Copy a single file atomically: copy into a temp file in the destination
/// directory then rename into place. An existing file at `dst` is replaced
/// wholesale; a failure leaves any previous `dst` intact and cleans up the
/// temp file.
pub fn atomic_copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    if let Some(dir) = dst.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = temp_sibling(dst, ".tmp_atomic_copy");
    let mut options = CopyOptions::new();
    options.buffer_size = COPY_BUFFER_SIZE;
    let written = match fs_extra_copy(src, &tmp, &options) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(io::Error::other(e));
        }
    };
    match fs::rename(&tmp, dst) {
        Ok(()) => Ok(written),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}
