//! Directory capabilities and the permission gate.
//!
//! A [`DirHandle`] is an opaque, revocable reference to a directory on the
//! user's machine. Access rights are not a property of the path: they are
//! granted per session through [`verify_permission`], which queries the
//! handle's standing grants and falls back to asking the user via a
//! [`ConsentPrompt`]. Handles rebuilt from the persisted role store start
//! with no grants, so every new session re-acquires consent before the
//! first mutation.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Access mode requested from the permission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    ReadWrite,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Point-in-time outcome of a permission exchange.
///
/// `Denied` is an explicit refusal; `Cancelled` means the prompt was
/// dismissed without an answer. Neither is an error; only a capability
/// failure (the handle no longer naming a directory) raises one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    Denied,
    Cancelled,
}

impl Authorization {
    pub fn is_granted(self) -> bool {
        self == Authorization::Granted
    }
}

/// Session-scoped grants recorded on a handle. Read-write covers read.
#[derive(Debug, Clone, Copy, Default)]
struct Grants {
    read: bool,
    write: bool,
}

impl Grants {
    fn covers(self, mode: AccessMode) -> bool {
        match mode {
            AccessMode::Read => self.read || self.write,
            AccessMode::ReadWrite => self.write,
        }
    }

    fn record(&mut self, mode: AccessMode) {
        match mode {
            AccessMode::Read => self.read = true,
            AccessMode::ReadWrite => self.write = true,
        }
    }
}

/// Opaque, revocable capability naming a directory.
///
/// Clones share the same grant state, mirroring how several references to
/// the same underlying directory carry one permission standing. Grants live
/// only in memory; nothing about them is persisted.
#[derive(Debug, Clone)]
pub struct DirHandle {
    path: PathBuf,
    grants: Arc<Mutex<Grants>>,
}

impl DirHandle {
    /// Create an ungranted handle for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DirHandle {
            path: path.into(),
            grants: Arc::new(Mutex::new(Grants::default())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn covers(&self, mode: AccessMode) -> bool {
        self.grants.lock().expect("grants lock").covers(mode)
    }

    fn record(&self, mode: AccessMode) {
        self.grants.lock().expect("grants lock").record(mode);
    }
}

/// Source of user consent for elevating access on a directory.
///
/// Returns `Some(true)` for approval, `Some(false)` for explicit refusal
/// and `None` when the prompt was dismissed. Implementations may block on
/// user interaction indefinitely.
pub trait ConsentPrompt {
    fn request(&self, path: &Path, mode: AccessMode) -> io::Result<Option<bool>>;
}

impl ConsentPrompt for Box<dyn ConsentPrompt> {
    fn request(&self, path: &Path, mode: AccessMode) -> io::Result<Option<bool>> {
        (**self).request(path, mode)
    }
}

/// Consent source that approves every request. Used for `--yes` runs and
/// scripted environments where no terminal is attached.
pub struct AutoApprove;

impl ConsentPrompt for AutoApprove {
    fn request(&self, _path: &Path, _mode: AccessMode) -> io::Result<Option<bool>> {
        Ok(Some(true))
    }
}

/// Verify (or acquire) `mode` access on `handle`.
///
/// Queries the handle's standing grants first and returns
/// [`Authorization::Granted`] without user interaction when they already
/// cover `mode`. Otherwise the consent prompt is consulted once; approval
/// records the grant for the rest of the session. Denial and dismissal are
/// reported as values, never as errors.
///
/// Errors only when the capability itself has failed: the path no longer
/// exists or is not a directory. The check is idempotent and non-retrying;
/// callers re-invoke it for every operation requiring access rather than
/// trusting a prior result.
pub fn verify_permission<P: ConsentPrompt>(
    handle: &DirHandle,
    mode: AccessMode,
    prompt: &P,
) -> io::Result<Authorization> {
    let meta = fs::metadata(handle.path())?;
    if !meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a directory: {}", handle.path().display()),
        ));
    }

    if handle.covers(mode) {
        debug!(path = %handle.path().display(), %mode, "permission already granted");
        return Ok(Authorization::Granted);
    }

    match prompt.request(handle.path(), mode)? {
        Some(true) => {
            handle.record(mode);
            debug!(path = %handle.path().display(), %mode, "permission granted");
            Ok(Authorization::Granted)
        }
        Some(false) => {
            debug!(path = %handle.path().display(), %mode, "permission denied");
            Ok(Authorization::Denied)
        }
        None => {
            debug!(path = %handle.path().display(), %mode, "permission prompt dismissed");
            Ok(Authorization::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tempfile::tempdir;

    /// Replays a fixed sequence of prompt answers and panics when consulted
    /// more often than scripted.
    struct Scripted(Mutex<VecDeque<Option<bool>>>);

    impl Scripted {
        fn new(answers: Vec<Option<bool>>) -> Self {
            Scripted(Mutex::new(answers.into()))
        }
    }

    impl ConsentPrompt for Scripted {
        fn request(&self, _path: &Path, _mode: AccessMode) -> io::Result<Option<bool>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .pop_front()
                .expect("prompt consulted more often than scripted"))
        }
    }

    #[test]
    fn approval_grants_and_is_remembered_within_the_session() {
        let td = tempdir().unwrap();
        let handle = DirHandle::new(td.path());
        let prompt = Scripted::new(vec![Some(true)]);

        let first = verify_permission(&handle, AccessMode::ReadWrite, &prompt).unwrap();
        assert!(first.is_granted());

        // Second check must succeed without touching the (now empty) script.
        let second = verify_permission(&handle, AccessMode::ReadWrite, &prompt).unwrap();
        assert!(second.is_granted());
    }

    #[test]
    fn read_write_grant_covers_read() {
        let td = tempdir().unwrap();
        let handle = DirHandle::new(td.path());
        let prompt = Scripted::new(vec![Some(true)]);

        verify_permission(&handle, AccessMode::ReadWrite, &prompt).unwrap();
        let read = verify_permission(&handle, AccessMode::Read, &prompt).unwrap();
        assert!(read.is_granted());
    }

    #[test]
    fn read_grant_does_not_cover_read_write() {
        let td = tempdir().unwrap();
        let handle = DirHandle::new(td.path());
        let prompt = Scripted::new(vec![Some(true), Some(false)]);

        verify_permission(&handle, AccessMode::Read, &prompt).unwrap();
        let write = verify_permission(&handle, AccessMode::ReadWrite, &prompt).unwrap();
        assert_eq!(write, Authorization::Denied);
    }

    #[test]
    fn refusal_and_dismissal_are_values_not_errors() {
        let td = tempdir().unwrap();
        let handle = DirHandle::new(td.path());

        let denied = Scripted::new(vec![Some(false)]);
        assert_eq!(
            verify_permission(&handle, AccessMode::Read, &denied).unwrap(),
            Authorization::Denied
        );

        let dismissed = Scripted::new(vec![None]);
        assert_eq!(
            verify_permission(&handle, AccessMode::Read, &dismissed).unwrap(),
            Authorization::Cancelled
        );
    }

    #[test]
    fn clones_share_grant_state() {
        let td = tempdir().unwrap();
        let handle = DirHandle::new(td.path());
        let clone = handle.clone();
        let prompt = Scripted::new(vec![Some(true)]);

        verify_permission(&handle, AccessMode::ReadWrite, &prompt).unwrap();
        assert!(verify_permission(&clone, AccessMode::ReadWrite, &prompt)
            .unwrap()
            .is_granted());
    }

    #[test]
    fn revoked_handle_is_an_error() {
        let td = tempdir().unwrap();
        let gone = td.path().join("vanished");
        let handle = DirHandle::new(&gone);
        assert!(verify_permission(&handle, AccessMode::Read, &AutoApprove).is_err());
    }

    #[test]
    fn handle_to_a_file_is_an_error() {
        let td = tempdir().unwrap();
        let file = td.path().join("not_a_dir.txt");
        fs::write(&file, b"x").unwrap();
        let handle = DirHandle::new(&file);
        assert!(verify_permission(&handle, AccessMode::Read, &AutoApprove).is_err());
    }
}
