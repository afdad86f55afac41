//! Backup enumeration and naming.
//!
//! Every immediate subdirectory of the vault is a candidate backup. A
//! timestamp is derived from the folder name when it embeds the canonical
//! `YYYY-MM-DD_HH-MM-SS` pattern; anything else (foreign folders, custom
//! labels) falls back to the moment of the listing pass, which makes such
//! folders sort as the most recent. That quirk is long-standing behaviour
//! the rest of the tool relies on, so it is kept as-is.

use std::fs;

use chrono::{Local, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::fs_op::error::FsOpError;
use crate::handle::DirHandle;

static EMBEDDED_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})-(\d{2})-(\d{2})_(\d{2})-(\d{2})-(\d{2})").expect("timestamp pattern")
});

/// One backup as seen during a listing pass. Rebuilt on every enumeration,
/// never persisted.
#[derive(Debug, Clone)]
pub struct BackupRecord {
    /// The vault subdirectory's own name.
    pub name: String,
    /// Capability for the backup's directory.
    pub handle: DirHandle,
    /// Milliseconds since the epoch; derived from `name` when possible,
    /// otherwise the listing pass's "now". Fallback values are provisional
    /// and only meaningful for ordering within the pass that produced them.
    pub timestamp: i64,
}

/// Enumerate the vault's backups, newest first.
///
/// File entries are ignored; every subdirectory is a candidate, malformed
/// names included. Ties keep their enumeration order.
pub fn list_backups(vault: &DirHandle) -> Result<Vec<BackupRecord>, FsOpError> {
    // One shared fallback instant per pass, so pattern-less folders compare
    // equal to each other and stay in enumeration order.
    let now = Local::now().timestamp_millis();

    let entries = fs::read_dir(vault.path())
        .map_err(|e| FsOpError::path("read directory", vault.path(), e))?;
    let mut records = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| FsOpError::path("read directory", vault.path(), e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| FsOpError::path("stat", entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let timestamp = embedded_timestamp(&name).unwrap_or(now);
        records.push(BackupRecord {
            name,
            handle: DirHandle::new(entry.path()),
            timestamp,
        });
    }

    sort_newest_first(&mut records);
    Ok(records)
}

/// Descending stable sort; equal timestamps keep their existing order.
fn sort_newest_first(records: &mut [BackupRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Extract an epoch-millisecond timestamp from a backup folder name.
///
/// Any substring matching `YYYY-MM-DD_HH-MM-SS` counts; the components are
/// interpreted as a local calendar time. Returns `None` when there is no
/// match or the matched components do not form a valid local time (month 13,
/// a nonexistent DST instant, and so on).
pub fn embedded_timestamp(name: &str) -> Option<i64> {
    let caps = EMBEDDED_TIMESTAMP.captures(name)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    let second: u32 = caps[6].parse().ok()?;
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Derive the folder name for a new backup.
///
/// A label that is non-empty after trimming is taken verbatim. Otherwise the
/// name is `Backup_` followed by the current UTC time in the canonical
/// pattern (the ISO-8601 instant with its separators normalized and the
/// fractional seconds and zone suffix dropped), so generated names always
/// carry a parseable timestamp.
pub fn backup_folder_name(label: Option<&str>) -> String {
    if let Some(label) = label {
        let trimmed = label.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    format!("Backup_{}", Utc::now().format("%Y-%m-%d_%H-%M-%S"))
}
