//! Desired parameter values and their translation to pwquality.conf terms.
//!
//! Callers describe what they want as a map of parameter name to typed value.
//! This module owns the two rules that turn that into file terms:
//! - coercion of typed values into the file's string representation
//! - remapping of caller-facing names to file-facing keys
//!
//! It also carries the table of parameter names pam_pwquality understands, which
//! the CLI uses for flags and help output. The engine itself does not validate
//! against that table: unknown names are reconciled like any other.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{PwqualityError, Result};

/// Caller-facing names whose file key differs (or is spelled out for clarity).
/// Names not listed map to themselves.
pub const NAME_REMAP: &[(&str, &str)] = &[
    ("enforce_for_root", "enforcing_for_root"),
    ("local_users_only", "local_users_only"),
];

/// Control parameters that steer a pass and are never written to the file.
pub const CONTROL_PARAMS: &[&str] = &["backup"];

/// Translate a caller-facing parameter name to its pwquality.conf key.
pub fn remap_name(name: &str) -> &str {
    NAME_REMAP
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Returns true for names like `backup` that are not configuration settings.
pub fn is_control_param(name: &str) -> bool {
    CONTROL_PARAMS.contains(&name)
}

/// Value type a recognized parameter expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Int,
    Bool,
    Str,
    List,
}

/// A parameter pam_pwquality understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Caller-facing name
    pub name: &'static str,
    pub kind: ValueKind,
    pub description: &'static str,
}

impl ParameterSpec {
    /// Key written to pwquality.conf
    pub fn file_key(&self) -> &'static str {
        remap_name(self.name)
    }
}

const fn spec(name: &'static str, kind: ValueKind, description: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        kind,
        description,
    }
}

/// Every parameter recognized by pam_pwquality, in pwquality.conf(5) order.
pub const KNOWN_PARAMETERS: &[ParameterSpec] = &[
    spec(
        "difok",
        ValueKind::Int,
        "Characters in the new password that must not be present in the old password",
    ),
    spec("minlen", ValueKind::Int, "Minimum acceptable size for the new password"),
    spec("dcredit", ValueKind::Int, "Maximum credit for digits (negative: minimum count)"),
    spec("ucredit", ValueKind::Int, "Maximum credit for uppercase characters (negative: minimum count)"),
    spec("lcredit", ValueKind::Int, "Maximum credit for lowercase characters (negative: minimum count)"),
    spec("ocredit", ValueKind::Int, "Maximum credit for other characters (negative: minimum count)"),
    spec("minclass", ValueKind::Int, "Minimum number of required character classes"),
    spec("maxrepeat", ValueKind::Int, "Maximum number of allowed same consecutive characters"),
    spec(
        "maxclassrepeat",
        ValueKind::Int,
        "Maximum number of consecutive characters of the same class",
    ),
    spec("maxsequence", ValueKind::Int, "Maximum length of monotonic character sequences"),
    spec("gecoscheck", ValueKind::Int, "Check for words from the passwd GECOS field"),
    spec("dictcheck", ValueKind::Bool, "Check the password against a dictionary"),
    spec("usercheck", ValueKind::Bool, "Check whether the password contains the user name"),
    spec("badwords", ValueKind::List, "Words that must not be contained in the password"),
    spec("dictpath", ValueKind::Str, "Path to the cracklib dictionaries"),
    spec("usersubstr", ValueKind::Int, "Length of user name substrings to check for"),
    spec("enforcing", ValueKind::Int, "Reject passwords that fail the checks (0 only warns)"),
    spec("retry", ValueKind::Int, "Number of prompts before returning an error"),
    spec("enforce_for_root", ValueKind::Bool, "Enforce the checks for the root user"),
    spec("local_users_only", ValueKind::Bool, "Skip the checks for users not in /etc/passwd"),
];

/// Look up a recognized parameter by its caller-facing name.
pub fn known_parameter(name: &str) -> Option<&'static ParameterSpec> {
    KNOWN_PARAMETERS.iter().find(|p| p.name == name)
}

/// One desired value, as supplied by the caller.
///
/// Deserializes untagged from JSON: `true` is a `Bool`, `5` an `Int`,
/// `"x"` a `Str`, `["a", "b"]` a `List`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl ParamValue {
    /// String form as written to pwquality.conf.
    ///
    /// Booleans become `1`/`0`, lists are comma-joined without escaping.
    /// Surrounding whitespace is dropped, since the parser trims it on read.
    pub fn to_file_value(&self) -> String {
        match self {
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => "0".to_string(),
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s.trim().to_string(),
            Self::List(items) => items.join(",").trim().to_string(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Str(_) => ValueKind::Str,
            Self::List(_) => ValueKind::List,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Mapping of caller-facing parameter name to desired value.
///
/// `None` means the parameter is unset and will never be considered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesiredParameters(BTreeMap<String, Option<ParamValue>>);

impl DesiredParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn set(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), Some(value.into()));
        self
    }

    /// Builder-style explicit unset
    pub fn unset(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), None);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<ParamValue>) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Option<ParamValue>> {
        self.0.iter()
    }

    /// Number of parameters that carry a value (unset entries excluded)
    pub fn count_set(&self) -> usize {
        self.0.values().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count_set() == 0
    }

    /// Check that every set parameter fits on one `key = value` line.
    ///
    /// A line break in a name or coerced value, or an `=` in a name, would
    /// write settings nobody asked for.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.iter() {
            let Some(value) = value else { continue };
            if is_control_param(name) {
                continue;
            }
            let reason = if has_line_break(name) {
                "name contains a line break"
            } else if name.contains('=') {
                "name contains '='"
            } else if has_line_break(&value.to_file_value()) {
                "value contains a line break"
            } else {
                continue;
            };
            return Err(PwqualityError::invalid_value(name.escape_debug().to_string(), reason));
        }
        Ok(())
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

impl<'a> IntoIterator for &'a DesiredParameters {
    type Item = (&'a String, &'a Option<ParamValue>);
    type IntoIter = btree_map::Iter<'a, String, Option<ParamValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<ParamValue>)> for DesiredParameters {
    fn from_iter<I: IntoIterator<Item = (K, Option<ParamValue>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Typed view of every recognized parameter plus the `backup` control flag.
///
/// This is the shape a params file takes on disk:
///
/// ```
/// use pwquality_conf::params::PwqualityParams;
///
/// let params: PwqualityParams =
///     serde_json::from_str(r#"{"minlen": 14, "dictcheck": true, "backup": true}"#).unwrap();
///
/// let desired = params.to_desired();
/// assert_eq!(desired.count_set(), 2);
/// assert!(params.backup);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PwqualityParams {
    pub difok: Option<i64>,
    pub minlen: Option<i64>,
    pub dcredit: Option<i64>,
    pub ucredit: Option<i64>,
    pub lcredit: Option<i64>,
    pub ocredit: Option<i64>,
    pub minclass: Option<i64>,
    pub maxrepeat: Option<i64>,
    pub maxclassrepeat: Option<i64>,
    pub maxsequence: Option<i64>,
    pub gecoscheck: Option<i64>,
    pub dictcheck: Option<bool>,
    pub usercheck: Option<bool>,
    pub badwords: Option<Vec<String>>,
    pub dictpath: Option<String>,
    pub usersubstr: Option<i64>,
    pub enforcing: Option<i64>,
    pub retry: Option<i64>,
    pub enforce_for_root: Option<bool>,
    pub local_users_only: Option<bool>,
    /// Back up the file before modifying it
    #[serde(default)]
    pub backup: bool,
}

impl PwqualityParams {
    /// Convert to the engine's name → value map. `backup` is not included.
    pub fn to_desired(&self) -> DesiredParameters {
        let mut desired = DesiredParameters::new();

        let ints = [
            ("difok", self.difok),
            ("minlen", self.minlen),
            ("dcredit", self.dcredit),
            ("ucredit", self.ucredit),
            ("lcredit", self.lcredit),
            ("ocredit", self.ocredit),
            ("minclass", self.minclass),
            ("maxrepeat", self.maxrepeat),
            ("maxclassrepeat", self.maxclassrepeat),
            ("maxsequence", self.maxsequence),
            ("gecoscheck", self.gecoscheck),
            ("usersubstr", self.usersubstr),
            ("enforcing", self.enforcing),
            ("retry", self.retry),
        ];
        for (name, value) in ints {
            desired.insert(name, value.map(ParamValue::Int));
        }

        let bools = [
            ("dictcheck", self.dictcheck),
            ("usercheck", self.usercheck),
            ("enforce_for_root", self.enforce_for_root),
            ("local_users_only", self.local_users_only),
        ];
        for (name, value) in bools {
            desired.insert(name, value.map(ParamValue::Bool));
        }

        desired.insert("badwords", self.badwords.clone().map(ParamValue::List));
        desired.insert("dictpath", self.dictpath.clone().map(ParamValue::Str));

        desired
    }

    /// Layer `top` over `self`: any value set in `top` wins.
    pub fn overlay(self, top: PwqualityParams) -> PwqualityParams {
        PwqualityParams {
            difok: top.difok.or(self.difok),
            minlen: top.minlen.or(self.minlen),
            dcredit: top.dcredit.or(self.dcredit),
            ucredit: top.ucredit.or(self.ucredit),
            lcredit: top.lcredit.or(self.lcredit),
            ocredit: top.ocredit.or(self.ocredit),
            minclass: top.minclass.or(self.minclass),
            maxrepeat: top.maxrepeat.or(self.maxrepeat),
            maxclassrepeat: top.maxclassrepeat.or(self.maxclassrepeat),
            maxsequence: top.maxsequence.or(self.maxsequence),
            gecoscheck: top.gecoscheck.or(self.gecoscheck),
            dictcheck: top.dictcheck.or(self.dictcheck),
            usercheck: top.usercheck.or(self.usercheck),
            badwords: top.badwords.or(self.badwords),
            dictpath: top.dictpath.or(self.dictpath),
            usersubstr: top.usersubstr.or(self.usersubstr),
            enforcing: top.enforcing.or(self.enforcing),
            retry: top.retry.or(self.retry),
            enforce_for_root: top.enforce_for_root.or(self.enforce_for_root),
            local_users_only: top.local_users_only.or(self.local_users_only),
            backup: top.backup || self.backup,
        }
    }
}
