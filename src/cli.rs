//! Command-line surface consuming the workflow layer.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Confirm, Input};

use crate::fs_op::path::{resolve_dir, PathError};
use crate::handle::{AccessMode, AutoApprove, ConsentPrompt, DirHandle};
use crate::store::HandleStore;
use crate::workflow::{DirectoryPicker, Orchestrator, Role};

#[derive(Debug, Parser)]
#[command(
    name = "savevault",
    version,
    about = "Snapshot and restore save-game folders"
)]
pub struct Cli {
    /// Use an alternate roles file instead of the default config location.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Approve every permission prompt without asking (non-interactive runs).
    #[arg(long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Choose the folder for a role, from an argument or interactively.
    Pick {
        role: RoleArg,
        /// Folder path; prompts when omitted.
        path: Option<String>,
    },
    /// Snapshot the source folder into a new backup inside the vault.
    Backup {
        /// Name the backup instead of using a generated timestamp.
        #[arg(long)]
        label: Option<String>,
    },
    /// Replace the source folder's contents with a backup.
    Restore {
        /// Backup folder name as shown by `list`.
        name: String,
    },
    /// List the vault's backups, newest first.
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Source,
    Vault,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Role {
        match arg {
            RoleArg::Source => Role::Source,
            RoleArg::Vault => Role::Vault,
        }
    }
}

/// Terminal consent prompt for the permission gate. Esc maps to the
/// dismissed outcome, matching the gate's `Cancelled` authorization.
pub struct InteractivePrompt;

impl ConsentPrompt for InteractivePrompt {
    fn request(&self, path: &Path, mode: AccessMode) -> io::Result<Option<bool>> {
        let verb = match mode {
            AccessMode::Read => "read",
            AccessMode::ReadWrite => "read and modify",
        };
        Confirm::new()
            .with_prompt(format!("Allow savevault to {verb} `{}`?", path.display()))
            .default(false)
            .interact_opt()
            .map_err(io::Error::other)
    }
}

/// Terminal directory picker: asks for a path and validates it. An empty
/// answer cancels the selection.
struct InteractivePicker;

impl DirectoryPicker for InteractivePicker {
    fn pick(&self, role: Role) -> io::Result<Option<DirHandle>> {
        let input: String = Input::new()
            .with_prompt(format!("Path to the {role} folder (empty to cancel)"))
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)?;
        let base = env::current_dir()?;
        match resolve_dir(&input, &base) {
            Ok(dir) => Ok(Some(DirHandle::new(dir))),
            Err(PathError::Empty) => Ok(None),
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string())),
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let store_path = match cli.config.clone() {
        Some(path) => path,
        None => HandleStore::default_path().context("could not determine a config directory")?,
    };
    let mut store = HandleStore::load(store_path)?;

    match cli.command {
        Command::Pick { role, path } => {
            let role = Role::from(role);
            let picked = match path {
                Some(input) => {
                    let base = env::current_dir()?;
                    match resolve_dir(&input, &base) {
                        Ok(dir) => Some(DirHandle::new(dir)),
                        Err(PathError::Empty) => None,
                        Err(e) => anyhow::bail!(e),
                    }
                }
                None => InteractivePicker.pick(role)?,
            };
            // A dismissed picker is not a failure; nothing changes.
            let Some(handle) = picked else { return Ok(()) };
            store.put(role, handle.path())?;
            println!("The {role} folder is now {}", handle.path().display());
        }
        Command::Backup { label } => {
            let mut orch = orchestrator(&store, consent(cli.yes));
            println!("{}", orch.create_backup(label.as_deref())?);
        }
        Command::Restore { name } => {
            let mut orch = orchestrator(&store, consent(cli.yes));
            println!("{}", orch.restore_backup(&name)?);
        }
        Command::List => {
            let orch = orchestrator(&store, consent(cli.yes));
            let records = orch.refresh_catalog()?;
            if records.is_empty() {
                println!("No backups in the vault.");
            } else {
                for record in records {
                    println!("{}  {}", format_timestamp(record.timestamp), record.name);
                }
            }
        }
    }
    Ok(())
}

fn consent(auto_approve: bool) -> Box<dyn ConsentPrompt> {
    if auto_approve {
        Box::new(AutoApprove)
    } else {
        Box::new(InteractivePrompt)
    }
}

fn orchestrator(
    store: &HandleStore,
    prompt: Box<dyn ConsentPrompt>,
) -> Orchestrator<Box<dyn ConsentPrompt>> {
    let mut orch = Orchestrator::new(prompt);
    for role in [Role::Source, Role::Vault] {
        if let Some(handle) = store.get(role) {
            orch.set_role(role, handle);
        }
    }
    orch
}

fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}
