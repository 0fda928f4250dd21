//! Format-preserving reader for pwquality.conf.
//!
//! The file is a flat list of `key = value` lines, `#` comments and blank
//! lines. Parsing produces two views of the same text:
//! - [`CurrentConfig`]: the effective key → value map used for diffing
//! - a sequence of [`ConfigLine`]s that keep the exact original bytes so the
//!   writer can reproduce every untouched line verbatim
//!
//! Lines that are neither comments nor contain `=` are kept as pass-through
//! text rather than rejected.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{PwqualityError, Result};

/// Classification of one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Comment, blank, or a line without `=`; copied through unchanged
    Passthrough,
    /// `key = value`, split on the first `=` and trimmed
    Setting { key: String, value: String },
}

/// One physical line of the file, including its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    raw: String,
    kind: LineKind,
}

impl ConfigLine {
    /// Classify a single raw line (terminator included, if any).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        let kind = if trimmed.is_empty() || trimmed.starts_with('#') {
            LineKind::Passthrough
        } else if let Some((key, value)) = trimmed.split_once('=') {
            LineKind::Setting {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            }
        } else {
            LineKind::Passthrough
        };

        Self {
            raw: raw.to_string(),
            kind,
        }
    }

    /// Original text, byte for byte
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    pub fn is_setting(&self) -> bool {
        matches!(self.kind, LineKind::Setting { .. })
    }

    pub fn key(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Setting { key, .. } => Some(key),
            LineKind::Passthrough => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Setting { value, .. } => Some(value),
            LineKind::Passthrough => None,
        }
    }

    /// Line terminator: `"\r\n"`, `"\n"`, or `""` for a final unterminated line
    pub fn line_ending(&self) -> &str {
        if self.raw.ends_with("\r\n") {
            "\r\n"
        } else if self.raw.ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }
}

/// Effective settings of the file. When a key repeats, the last line wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CurrentConfig(BTreeMap<String, String>);

impl CurrentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CurrentConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Both views produced by [`parse`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub current: CurrentConfig,
    pub lines: Vec<ConfigLine>,
}

impl ParsedConfig {
    /// Concatenation of every raw line; identical to the parsed input
    pub fn to_text(&self) -> String {
        self.lines.iter().map(ConfigLine::raw).collect()
    }
}

/// Parse file contents into the effective map and the annotated line sequence.
pub fn parse(contents: &str) -> ParsedConfig {
    let mut current = CurrentConfig::new();
    let mut lines = Vec::new();

    for raw in contents.split_inclusive('\n') {
        let line = ConfigLine::parse(raw);
        if let LineKind::Setting { key, value } = line.kind() {
            current.insert(key.clone(), value.clone());
        }
        lines.push(line);
    }

    ParsedConfig { current, lines }
}

/// Read and parse a configuration file.
///
/// Missing files, permission problems and non-UTF-8 content are all reported
/// as [`PwqualityError::ReadFailure`].
pub fn read_config(path: &Path) -> Result<ParsedConfig> {
    let contents =
        fs::read_to_string(path).map_err(|e| PwqualityError::read_failure(path, e))?;
    let parsed = parse(&contents);

    debug!(
        "Parsed {}: {} lines, {} settings",
        path.display(),
        parsed.lines.len(),
        parsed.current.len()
    );

    Ok(parsed)
}
