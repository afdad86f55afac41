//! Workflow orchestration.
//!
//! Composes the permission gate, the copy/clear engines and the backup
//! catalog into the operations a frontend exposes: create a backup, restore
//! one, refresh the catalog. Every mutating workflow re-verifies permission
//! before the first filesystem touch; each call returns a terminal
//! human-readable status message (or a [`WorkflowError`] that renders one).

use std::fmt;
use std::fs;
use std::io;

use tracing::info;

use crate::catalog::{self, BackupRecord};
use crate::errors::WorkflowError;
use crate::fs_op::{clear_dir, copy_dir, FsOpError};
use crate::handle::{verify_permission, AccessMode, ConsentPrompt, DirHandle};

/// The two directory roles a session tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The live, restorable data set.
    Source,
    /// The directory holding backup snapshots.
    Vault,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => write!(f, "source"),
            Role::Vault => write!(f, "vault"),
        }
    }
}

/// Capability that lets the user choose a directory for a role.
///
/// `Ok(None)` is the distinguished cancelled outcome: the picker was
/// dismissed. Callers absorb it silently rather than reporting a failure.
pub trait DirectoryPicker {
    fn pick(&self, role: Role) -> io::Result<Option<DirHandle>>;
}

/// Holds the session's role handles and drives the workflows.
///
/// The mutating workflows take `&mut self`, so one orchestrator can never
/// run a backup and a restore concurrently; the serialization the engines
/// require comes from the borrow checker rather than a lock.
pub struct Orchestrator<P> {
    source: Option<DirHandle>,
    vault: Option<DirHandle>,
    prompt: P,
}

impl<P: ConsentPrompt> Orchestrator<P> {
    pub fn new(prompt: P) -> Self {
        Orchestrator {
            source: None,
            vault: None,
            prompt,
        }
    }

    /// Install (or replace) the handle for `role`.
    pub fn set_role(&mut self, role: Role, handle: DirHandle) {
        match role {
            Role::Source => self.source = Some(handle),
            Role::Vault => self.vault = Some(handle),
        }
    }

    pub fn role(&self, role: Role) -> Option<&DirHandle> {
        match role {
            Role::Source => self.source.as_ref(),
            Role::Vault => self.vault.as_ref(),
        }
    }

    fn require(&self, role: Role) -> Result<&DirHandle, WorkflowError> {
        self.role(role).ok_or(WorkflowError::RoleUnassigned(role))
    }

    /// Gate an engine call: verify `mode` on `role`'s handle, mapping
    /// anything but an explicit grant to `PermissionDenied`.
    fn authorize(&self, role: Role, mode: AccessMode) -> Result<(), WorkflowError> {
        let handle = self.require(role)?;
        let auth = verify_permission(handle, mode, &self.prompt).map_err(FsOpError::from)?;
        if auth.is_granted() {
            Ok(())
        } else {
            Err(WorkflowError::PermissionDenied(role))
        }
    }

    /// Snapshot the source folder into a new backup under the vault.
    ///
    /// The backup folder name comes from `label` when it is non-empty after
    /// trimming, otherwise from the current time (see
    /// [`catalog::backup_folder_name`]). An existing folder with the same
    /// name is merged into, per the copy engine's semantics.
    pub fn create_backup(&mut self, label: Option<&str>) -> Result<String, WorkflowError> {
        self.authorize(Role::Source, AccessMode::Read)?;
        self.authorize(Role::Vault, AccessMode::ReadWrite)?;
        let source = self.require(Role::Source)?;
        let vault = self.require(Role::Vault)?;

        let name = catalog::backup_folder_name(label);
        info!(name = %name, "creating backup");
        let dest = vault.path().join(&name);
        fs::create_dir_all(&dest).map_err(|e| FsOpError::path("create directory", &dest, e))?;
        copy_dir(source.path(), &dest)?;
        info!(name = %name, "backup complete");
        Ok(format!("Backup `{name}` created."))
    }

    /// Replace the source folder's contents with the named backup.
    ///
    /// Clear-then-copy, not a merge: after a successful restore the source
    /// holds exactly the backup's tree. The backup is looked up in a fresh
    /// catalog pass; a name that is no longer present fails before anything
    /// is mutated.
    pub fn restore_backup(&mut self, name: &str) -> Result<String, WorkflowError> {
        self.authorize(Role::Vault, AccessMode::Read)?;
        self.authorize(Role::Source, AccessMode::ReadWrite)?;
        let vault = self.require(Role::Vault)?;
        let source = self.require(Role::Source)?;

        let record = catalog::list_backups(vault)?
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| WorkflowError::NotFound(name.to_string()))?;

        info!(name = %record.name, "restoring backup");
        clear_dir(source.path())?;
        copy_dir(record.handle.path(), source.path())?;
        info!(name = %record.name, "restore complete");
        Ok(format!("Backup `{}` restored.", record.name))
    }

    /// List the vault's backups, newest first.
    pub fn refresh_catalog(&self) -> Result<Vec<BackupRecord>, WorkflowError> {
        self.authorize(Role::Vault, AccessMode::Read)?;
        let vault = self.require(Role::Vault)?;
        Ok(catalog::list_backups(vault)?)
    }
}
