//! Reconciliation pass over one configuration file.
//!
//! A pass moves through these states:
//!
//! ```text
//! Unparsed -> Parsed -> Diffed -> NoChange
//!                              -> [BackedUp ->] Written
//! ```
//!
//! Any error ends the pass in `Failed`. [`plan`] covers everything up to
//! `Diffed` and never touches the file; [`Plan::apply`] performs the side
//! effects. Backup always completes before the write starts, and a failed
//! backup means no write.
//!
//! Concurrent passes against the same file are not coordinated. Running two
//! at once is a filesystem race; the later rename wins.

use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::Display;
use tracing::{debug, info};

use crate::backup::create_backup;
use crate::error::{PwqualityError, Result};
use crate::params::DesiredParameters;
use crate::parser::{CurrentConfig, ParsedConfig, read_config};
use crate::reconcile::{ChangeSet, reconcile};
use crate::writer::{rewrite, write_atomic};

/// Location of the pam_pwquality configuration
pub const DEFAULT_CONFIG_PATH: &str = "/etc/security/pwquality.conf";

/// States of a reconciliation pass, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PassState {
    Unparsed,
    Parsed,
    Diffed,
    NoChange,
    BackedUp,
    Written,
    Failed,
}

/// Side-effecting options for [`Plan::apply`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Copy the file to a timestamped sibling before writing
    pub backup: bool,
}

/// Outcome reported to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "ChangeSet::is_empty")]
    pub changes: ChangeSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_file: Option<PathBuf>,
}

/// A computed diff, ready to be applied or previewed
#[derive(Debug, Clone)]
pub struct Plan {
    path: PathBuf,
    parsed: ParsedConfig,
    changes: ChangeSet,
}

impl Plan {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings as they are in the file right now
    pub fn current(&self) -> &CurrentConfig {
        &self.parsed.current
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// File text after applying the changes
    pub fn render(&self) -> String {
        rewrite(&self.parsed.lines, &self.changes)
    }

    /// The result `apply` would report, without backing up or writing.
    pub fn preview(&self) -> ReconciliationResult {
        ReconciliationResult {
            changed: !self.is_empty(),
            changes: self.changes.clone(),
            backup_file: None,
        }
    }

    /// Back up (if requested) and write the changes.
    ///
    /// With an empty change set this does nothing: no backup, no write.
    pub fn apply(self, options: ApplyOptions) -> Result<ReconciliationResult> {
        if self.is_empty() {
            debug!(path = %self.path.display(), state = %PassState::NoChange, "Nothing to change");
            return Ok(ReconciliationResult::default());
        }

        let backup_file = if options.backup {
            let backup_path = create_backup(&self.path).inspect_err(log_failure)?;
            debug!(path = %self.path.display(), state = %PassState::BackedUp, "Backup created");
            Some(backup_path)
        } else {
            None
        };

        write_atomic(&self.path, &self.render()).inspect_err(log_failure)?;
        info!(
            path = %self.path.display(),
            state = %PassState::Written,
            "Updated {} setting(s)",
            self.changes.len()
        );

        Ok(ReconciliationResult {
            changed: true,
            changes: self.changes,
            backup_file,
        })
    }
}

fn log_failure(err: &PwqualityError) {
    match err.path() {
        Some(path) => {
            debug!(path = %path.display(), state = %PassState::Failed, kind = %err.kind(), "{}", err)
        }
        None => debug!(state = %PassState::Failed, kind = %err.kind(), "{}", err),
    }
}

/// Fail with `ConfigFileMissing` if `path` does not exist, or `ReadFailure`
/// if its existence cannot be determined.
pub fn ensure_exists(path: &Path) -> Result<()> {
    match path.try_exists() {
        Ok(true) => Ok(()),
        Ok(false) => Err(PwqualityError::config_file_missing(path)),
        Err(e) => Err(PwqualityError::read_failure(path, e)),
    }
}

/// Read `path` and diff it against `desired`. Does not modify anything.
///
/// Fails with `InvalidValue` if a desired value would span more than one
/// line, and with `ConfigFileMissing` before any read if the file is absent;
/// the file is never created.
pub fn plan(path: &Path, desired: &DesiredParameters) -> Result<Plan> {
    debug!(path = %path.display(), state = %PassState::Unparsed, "Starting reconciliation");

    desired.validate().inspect_err(log_failure)?;
    ensure_exists(path).inspect_err(log_failure)?;

    let parsed = read_config(path).inspect_err(log_failure)?;
    debug!(path = %path.display(), state = %PassState::Parsed, "{} current setting(s)", parsed.current.len());

    let changes = reconcile(&parsed.current, desired);
    debug!(path = %path.display(), state = %PassState::Diffed, "{} change(s)", changes.len());

    Ok(Plan {
        path: path.to_path_buf(),
        parsed,
        changes,
    })
}

/// Full pass: [`plan`] followed by [`Plan::apply`].
pub fn reconcile_file(
    path: &Path,
    desired: &DesiredParameters,
    options: ApplyOptions,
) -> Result<ReconciliationResult> {
    plan(path, desired)?.apply(options)
}
