//! Persistence of the two role paths across sessions.
//!
//! A small key-value store with two fixed keys, `sourcePath` and
//! `backupPath`, written as a TOML document under the user's config
//! directory. Only the paths survive a restart: handles rebuilt from the
//! store carry no session grants, so permission is re-verified before the
//! first use in every session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fs_op::helpers::atomic_write;
use crate::handle::DirHandle;
use crate::workflow::Role;

/// Errors from loading or saving the role store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not parse role store: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not encode role store: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredRoles {
    #[serde(rename = "sourcePath", skip_serializing_if = "Option::is_none")]
    source_path: Option<PathBuf>,
    #[serde(rename = "backupPath", skip_serializing_if = "Option::is_none")]
    backup_path: Option<PathBuf>,
}

/// File-backed store mapping role name to directory path.
#[derive(Debug)]
pub struct HandleStore {
    path: PathBuf,
    roles: StoredRoles,
}

impl HandleStore {
    /// Default store location under the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "savevault").map(|dirs| dirs.config_dir().join("roles.toml"))
    }

    /// Load the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let roles = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoredRoles::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(HandleStore { path, roles })
    }

    /// Rebuild the handle stored for `role`, if any. The returned handle is
    /// ungranted; callers must verify permission before using it.
    pub fn get(&self, role: Role) -> Option<DirHandle> {
        self.slot(role).as_deref().map(DirHandle::new)
    }

    /// Record `dir` as the path for `role` and persist immediately.
    pub fn put(&mut self, role: Role, dir: &Path) -> Result<(), StoreError> {
        match role {
            Role::Source => self.roles.source_path = Some(dir.to_path_buf()),
            Role::Vault => self.roles.backup_path = Some(dir.to_path_buf()),
        }
        self.save()
    }

    fn slot(&self, role: Role) -> &Option<PathBuf> {
        match role {
            Role::Source => &self.roles.source_path,
            Role::Vault => &self.roles.backup_path,
        }
    }

    fn save(&self) -> Result<(), StoreError> {
        let text = toml::to_string_pretty(&self.roles)?;
        atomic_write(&self.path, text.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{verify_permission, AccessMode, Authorization, ConsentPrompt};
    use tempfile::tempdir;

    #[test]
    fn put_then_reload_round_trips_both_roles() {
        let td = tempdir().expect("tempdir");
        let store_file = td.path().join("roles.toml");
        let source = td.path().join("saves");
        let vault = td.path().join("backups");

        let mut store = HandleStore::load(&store_file).expect("load");
        store.put(Role::Source, &source).expect("put source");
        store.put(Role::Vault, &vault).expect("put vault");

        let reloaded = HandleStore::load(&store_file).expect("reload");
        assert_eq!(reloaded.get(Role::Source).expect("source").path(), source);
        assert_eq!(reloaded.get(Role::Vault).expect("vault").path(), vault);
    }

    #[test]
    fn file_uses_the_fixed_role_keys() {
        let td = tempdir().expect("tempdir");
        let store_file = td.path().join("roles.toml");
        let mut store = HandleStore::load(&store_file).expect("load");
        store.put(Role::Source, Path::new("/tmp/saves")).expect("put");
        store.put(Role::Vault, Path::new("/tmp/vault")).expect("put");

        let text = fs::read_to_string(&store_file).expect("read");
        assert!(text.contains("sourcePath"), "got: {text}");
        assert!(text.contains("backupPath"), "got: {text}");
    }

    #[test]
    fn missing_file_loads_as_empty_store() {
        let td = tempdir().expect("tempdir");
        let store = HandleStore::load(td.path().join("absent.toml")).expect("load");
        assert!(store.get(Role::Source).is_none());
        assert!(store.get(Role::Vault).is_none());
    }

    #[test]
    fn rehydrated_handles_carry_no_grants() {
        struct DenyAll;
        impl ConsentPrompt for DenyAll {
            fn request(
                &self,
                _path: &Path,
                _mode: AccessMode,
            ) -> io::Result<Option<bool>> {
                Ok(Some(false))
            }
        }

        let td = tempdir().expect("tempdir");
        let store_file = td.path().join("roles.toml");
        let dir = td.path().join("saves");
        fs::create_dir_all(&dir).expect("mkdir");

        let mut store = HandleStore::load(&store_file).expect("load");
        store.put(Role::Source, &dir).expect("put");

        // A freshly rebuilt handle must go back through the prompt.
        let handle = HandleStore::load(&store_file)
            .expect("reload")
            .get(Role::Source)
            .expect("handle");
        let auth = verify_permission(&handle, AccessMode::Read, &DenyAll).expect("verify");
        assert_eq!(auth, Authorization::Denied);
    }
}
