//! Property-based tests for the parse/reconcile/rewrite pipeline
//!
//! These tests verify:
//! - Parsing then rewriting with no changes is byte-identical
//! - Applying a change set twice converges (second diff is empty)
//! - Every changed key ends up in the output with its new value
//! - Untouched lines survive a rewrite verbatim

use proptest::prelude::*;

use pwquality_conf::params::{DesiredParameters, ParamValue};
use pwquality_conf::{ChangeSet, parse, reconcile, rewrite};

// =============================================================================
// Strategies
// =============================================================================

fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("minlen".to_string()),
        Just("dcredit".to_string()),
        Just("ucredit".to_string()),
        Just("maxrepeat".to_string()),
        Just("badwords".to_string()),
        "[a-z][a-z_]{0,10}",
    ]
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["-?[0-9]{1,3}", "[a-z/,]{0,12}"]
}

/// One raw line with assorted spacing, comments, blanks and junk
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (key_strategy(), value_strategy(), "[ \t]{0,2}", "[ \t]{0,2}")
            .prop_map(|(k, v, a, b)| format!("{k}{a}={b}{v}")),
        "# [ -~]{0,30}",
        "[ \t]{0,3}",
        "[a-z ]{1,12}",
    ]
}

fn file_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(line_strategy(), 0..12),
        prop_oneof![Just("\n"), Just("\r\n")],
        any::<bool>(),
    )
        .prop_map(|(lines, eol, trailing)| {
            let mut text = lines.join(eol);
            if trailing && !text.is_empty() {
                text.push_str(eol);
            }
            text
        })
}

fn param_value_strategy() -> impl Strategy<Value = ParamValue> {
    prop_oneof![
        any::<bool>().prop_map(ParamValue::Bool),
        (-50i64..50).prop_map(ParamValue::Int),
        "[ \t]{0,2}[a-z/]{1,10}[ \t]{0,2}".prop_map(ParamValue::Str),
        prop::collection::vec(" ?[a-z]{1,6} ?", 1..4).prop_map(ParamValue::List),
    ]
}

fn desired_strategy() -> impl Strategy<Value = DesiredParameters> {
    prop::collection::btree_map(key_strategy(), param_value_strategy(), 0..6)
        .prop_map(|map| map.into_iter().map(|(k, v)| (k, Some(v))).collect())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Parse → rewrite with an empty change set is the identity
    #[test]
    fn empty_change_set_round_trips(text in file_strategy()) {
        let parsed = parse(&text);
        prop_assert_eq!(rewrite(&parsed.lines, &ChangeSet::new()), text);
    }

    /// Reconciling against the rewritten file yields no further changes
    #[test]
    fn reconcile_is_idempotent(text in file_strategy(), desired in desired_strategy()) {
        let parsed = parse(&text);
        let changes = reconcile(&parsed.current, &desired);
        let rewritten = rewrite(&parsed.lines, &changes);

        let again = parse(&rewritten);
        prop_assert!(reconcile(&again.current, &desired).is_empty());
    }

    /// Every changed key is present with its new value after rewrite
    #[test]
    fn changes_are_applied(text in file_strategy(), desired in desired_strategy()) {
        let parsed = parse(&text);
        let changes = reconcile(&parsed.current, &desired);
        let rewritten = parse(&rewrite(&parsed.lines, &changes));

        for (key, value) in changes.iter() {
            prop_assert_eq!(rewritten.current.get(key), Some(value.as_str()));
        }
    }

    /// Lines whose key is not being changed are copied byte for byte
    #[test]
    fn untouched_lines_survive(text in file_strategy(), desired in desired_strategy()) {
        let parsed = parse(&text);
        let changes = reconcile(&parsed.current, &desired);
        let rewritten = parse(&rewrite(&parsed.lines, &changes));

        prop_assert!(rewritten.lines.len() >= parsed.lines.len());
        for (before, after) in parsed.lines.iter().zip(rewritten.lines.iter()) {
            let touched = before.key().is_some_and(|k| changes.contains_key(k));
            if !touched && !before.line_ending().is_empty() {
                prop_assert_eq!(before.raw(), after.raw());
            }
        }
    }
}
