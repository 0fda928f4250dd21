//! Timestamped backup copies of the configuration file.
//!
//! The backup sits next to the original as `<path>.<YYYY-MM-DD@HH:MM:SS~>`.
//! Two backups within the same second share a name and the later one wins.

use std::ffi::OsString;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info};

use crate::error::{PwqualityError, Result};

/// strftime format of the backup suffix, in local time
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d@%H:%M:%S~";

/// Backup path for `path` taken at `timestamp`.
pub fn backup_path_for<Tz>(path: &Path, timestamp: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(timestamp.format(BACKUP_TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

/// Copy `path` to a timestamped sibling and return the backup path.
///
/// Content and permission bits are copied; access and modification times are
/// carried over when the platform allows it.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let backup_path = backup_path_for(path, &Local::now());

    fs::copy(path, &backup_path).map_err(|e| PwqualityError::backup_failure(&backup_path, e))?;

    if let Err(e) = copy_times(path, &backup_path) {
        debug!("Could not preserve timestamps on {}: {}", backup_path.display(), e);
    }

    info!("Backed up {} to {}", path.display(), backup_path.display());
    Ok(backup_path)
}

fn copy_times(from: &Path, to: &Path) -> std::io::Result<()> {
    let metadata = fs::metadata(from)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    File::options().write(true).open(to)?.set_times(times)
}
