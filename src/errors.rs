use thiserror::Error;

use crate::fs_op::FsOpError;
use crate::workflow::Role;

/// Failure taxonomy for the backup and restore workflows.
///
/// Engines raise into this; nothing is retried automatically. Retry is a
/// user-initiated re-invocation of the whole workflow. Every variant renders
/// as the terminal status line for the workflow that produced it.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The user declined or dismissed an access prompt. Recoverable: the
    /// user re-runs the workflow.
    #[error("access to the {0} folder was not granted")]
    PermissionDenied(Role),

    /// The selected backup was no longer present in the vault when the
    /// restore started; nothing was mutated.
    #[error("backup `{0}` was not found in the vault")]
    NotFound(String),

    /// A workflow was invoked before its folder was picked.
    #[error("no {0} folder has been selected")]
    RoleUnassigned(Role),

    /// A read, write or enumerate call failed. The workflow aborted;
    /// partial mutation may remain on disk.
    #[error(transparent)]
    Io(#[from] FsOpError),
}
