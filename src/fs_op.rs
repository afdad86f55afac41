//! Filesystem engines used by the backup workflows.
//!
//! The destructive primitives live here, kept apart from the orchestration
//! layer so they can be tested on bare directories: recursive
//! merge/overwrite copy (`copy`), destructive clearing (`clear`), the
//! atomic temp-file helpers both build on (`helpers`), and resolution of
//! user-supplied paths (`path`).

pub mod clear;
pub mod copy;
pub mod error;
pub mod helpers;
pub mod path;

pub use clear::clear_dir;
pub use copy::copy_dir;
pub use error::FsOpError;
