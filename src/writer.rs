//! Line-level rewrite and atomic replacement of the configuration file.
//!
//! # Rewrite rules
//!
//! - Comment, blank and pass-through lines are copied byte for byte.
//! - A setting whose key is in the change set becomes `key = value`, keeping
//!   the original line terminator. Every physical line carrying that key is
//!   rewritten, so duplicated keys stay consistent with each other.
//! - Keys never seen in the file are appended in change-set order.
//!
//! # Atomicity
//!
//! [`write_atomic`] writes into a temporary file next to the target and renames
//! it over the original. A failure at any point leaves the original intact.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PwqualityError, Result};
use crate::parser::ConfigLine;
use crate::reconcile::ChangeSet;

/// Canonical form of a rewritten or appended setting (no terminator)
pub fn format_setting(key: &str, value: &str) -> String {
    format!("{} = {}", key, value)
}

/// Produce the new file text from the original lines and a change set.
pub fn rewrite(lines: &[ConfigLine], changes: &ChangeSet) -> String {
    let mut out = String::new();
    let mut satisfied: HashSet<&str> = HashSet::new();

    for line in lines {
        let replacement = line
            .key()
            .and_then(|key| changes.get(key).map(|value| (key, value)));

        match replacement {
            Some((key, value)) => {
                out.push_str(&format_setting(key, value));
                out.push_str(line.line_ending());
                satisfied.insert(key);
            }
            None => out.push_str(line.raw()),
        }
    }

    let pending: Vec<(&String, &String)> = changes
        .iter()
        .filter(|(key, _)| !satisfied.contains(key.as_str()))
        .collect();

    if !pending.is_empty() && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for (key, value) in pending {
        out.push_str(&format_setting(key, value));
        out.push('\n');
    }

    out
}

/// Replace `path` with `contents` via a same-directory temp file and rename.
///
/// Symlinks are followed so the link itself survives. Permission bits and,
/// where permitted, ownership of the original are carried over.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let fail = |e: std::io::Error| PwqualityError::write_failure(path, e);

    let target = fs::canonicalize(path).map_err(fail)?;
    let metadata = fs::metadata(&target).map_err(fail)?;
    let parent = target.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(parent).map_err(fail)?;
    temp_file.write_all(contents.as_bytes()).map_err(fail)?;
    temp_file
        .as_file()
        .set_permissions(metadata.permissions())
        .map_err(fail)?;

    if let Err(e) = std::os::unix::fs::fchown(
        temp_file.as_file(),
        Some(metadata.uid()),
        Some(metadata.gid()),
    ) {
        debug!("Could not preserve ownership of {}: {}", target.display(), e);
    }

    temp_file.as_file().sync_all().map_err(fail)?;
    temp_file
        .persist(&target)
        .map_err(|e| PwqualityError::write_failure(path, e.error))?;

    debug!("Replaced {} ({} bytes)", target.display(), contents.len());
    Ok(())
}
