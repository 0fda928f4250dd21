//! Diff of desired parameters against the current file state.
//!
//! [`reconcile`] is pure: it reads nothing and writes nothing. For each set
//! parameter it coerces the value to file form, remaps the name to its file
//! key and keeps the pair only if the file does not already hold exactly that
//! string.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;
use tracing::{debug, warn};

use crate::params::{DesiredParameters, is_control_param, known_parameter, remap_name};
use crate::parser::CurrentConfig;

/// File key → new value for every setting that must change.
///
/// Iterates in key order, which fixes the order of appended lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(BTreeMap<String, String>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
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

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Compute the minimal set of changes that brings `current` to `desired`.
///
/// Comparison is exact string equality after coercion, so `Int(5)` matches a
/// file value of `5` but not `05`.
///
/// When two names land on the same file key (`enforce_for_root` and
/// `enforcing_for_root`), the one spelled like the key wins.
pub fn reconcile(current: &CurrentConfig, desired: &DesiredParameters) -> ChangeSet {
    let mut targets: BTreeMap<&str, (&str, String)> = BTreeMap::new();

    for (name, value) in desired {
        if is_control_param(name) {
            continue;
        }
        let Some(value) = value else {
            continue;
        };

        match known_parameter(name) {
            Some(spec) if spec.kind != value.kind() => {
                debug!(
                    "Parameter {} given as {}, expected {}; coercing anyway",
                    name,
                    value.kind(),
                    spec.kind
                );
            }
            None => warn!("Unrecognized pwquality parameter: {}", name),
            _ => {}
        }

        let key = remap_name(name);
        let wanted = value.to_file_value();

        match targets.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert((name.as_str(), wanted));
            }
            btree_map::Entry::Occupied(mut slot) => {
                let previous = slot.get().0;
                let winner = if name == key { name.as_str() } else { previous };
                warn!(
                    "Parameters {} and {} both set {}; using {}",
                    previous, name, key, winner
                );
                if winner == name {
                    slot.insert((name.as_str(), wanted));
                }
            }
        }
    }

    let mut changes = ChangeSet::new();
    for (key, (_, wanted)) in targets {
        match current.get(key) {
            Some(existing) if existing == wanted => {
                debug!("{} already set to {:?}", key, wanted);
            }
            existing => {
                debug!("{}: {:?} -> {:?}", key, existing, wanted);
                changes.insert(key, wanted);
            }
        }
    }

    changes
}
