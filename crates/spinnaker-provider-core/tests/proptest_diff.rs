// crates/spinnaker-provider-core/tests/proptest_diff.rs
// ============================================================================
// Module: Drift Comparator Property-Based Tests
// Description: Property tests for reflexivity and superset consistency.
// Purpose: Detect panics and invariant breaks across arbitrary documents.
// ============================================================================

//! Property-based tests for drift comparator invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use spinnaker_provider_core::ConfigTree;
use spinnaker_provider_core::runtime::compare;
use spinnaker_provider_core::runtime::is_consistent;

fn json_value_strategy(max_depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        any::<f64>()
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(|v| serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ];

    leaf.prop_recursive(max_depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn json_object_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,6}", json_value_strategy(3), 0..5)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
}

proptest! {
    #[test]
    fn compare_is_reflexive(value in json_value_strategy(4)) {
        let tree = ConfigTree::from(value);
        prop_assert!(compare(&tree, &tree, "desired", "observed").is_ok());
    }

    #[test]
    fn extra_keys_are_one_way_consistent(value in json_object_strategy(), extra in json_value_strategy(2)) {
        let desired = ConfigTree::from(value);
        let observed = desired.with_entry("_managed", ConfigTree::from(extra));
        prop_assert!(is_consistent(&desired, &observed));
        let err = compare(&observed, &desired, "desired", "observed").unwrap_err();
        prop_assert_eq!(err.path_desired, "desired._managed");
    }

    #[test]
    fn list_length_changes_are_drift(items in prop::collection::vec(json_value_strategy(2), 0..4)) {
        let desired = ConfigTree::from(Value::Array(items.clone()));
        let mut longer = items;
        longer.push(Value::Null);
        prop_assert!(!is_consistent(&desired, &ConfigTree::from(Value::Array(longer))));
    }
}
