// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for argument normalization.

use proptest::prelude::*;
use rpcerr_normalize::{
    Arg, MetadataMap, MetadataValue, RawMetadata, SourceError, Slots, create, normalize,
};
use serde_json::Value;

/// Strategy: lower-case metadata keys.
fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,9}"
}

/// Strategy: printable, non-empty values.
fn value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,12}"
}

fn raw_map() -> impl Strategy<Value = RawMetadata> {
    prop::collection::btree_map(key(), value().prop_map(Value::String), 1..6)
}

fn expected_view(raw: &RawMetadata) -> MetadataMap {
    raw.iter()
        .map(|(k, v)| {
            (
                k.clone(),
                MetadataValue::from(v.as_str().unwrap_or_default()),
            )
        })
        .collect()
}

/// Strategy: any argument shape except source errors.
fn plain_arg() -> impl Strategy<Value = Arg> {
    prop_oneof![
        Just(Arg::Absent),
        Just(Arg::Null),
        any::<bool>().prop_map(Arg::Bool),
        any::<i64>().prop_map(Arg::Int),
        (-1e6f64..1e6).prop_map(Arg::Float),
        "[ -~]{0,8}".prop_map(Arg::Str),
        raw_map().prop_map(Arg::Map),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn message_only_yields_message(m in "[ -~]{0,32}") {
        let err = create(m.as_str(), Arg::Absent, Arg::Absent);
        prop_assert_eq!(err.message, m);
        prop_assert!(err.code.is_none());
        prop_assert!(err.metadata.is_none());
    }

    #[test]
    fn message_and_code(m in "[ -~]{0,32}", c in any::<i64>()) {
        let err = create(m.as_str(), c, Arg::Absent);
        prop_assert_eq!(err.message, m);
        prop_assert_eq!(err.code, Some(c));
    }

    #[test]
    fn message_code_metadata(m in "[ -~]{0,32}", c in any::<i64>(), raw in raw_map()) {
        let expected = expected_view(&raw);
        let err = create(m.as_str(), c, raw);
        prop_assert_eq!(err.code, Some(c));
        prop_assert_eq!(err.metadata_map(), expected);
    }

    #[test]
    fn metadata_in_code_position(m in "[ -~]{0,32}", raw in raw_map()) {
        let expected = expected_view(&raw);
        let err = create(m.as_str(), raw, Arg::Absent);
        prop_assert!(err.code.is_none());
        prop_assert_eq!(err.metadata_map(), expected);
    }

    #[test]
    fn numeric_string_never_sets_code(m in "[ -~]{0,16}", c in any::<i64>()) {
        let err = create(m.as_str(), c.to_string(), Arg::Absent);
        prop_assert!(err.code.is_none());
    }

    #[test]
    fn merge_prefers_new_values(old in raw_map(), new in raw_map()) {
        let mut expected = expected_view(&old);
        expected.extend(expected_view(&new));
        let source = SourceError::new("Boom").with_code(1000).with_metadata(old);
        let err = create(source, Arg::Absent, new);
        prop_assert_eq!(&err.message, "Boom");
        prop_assert_eq!(err.code, Some(1000));
        prop_assert_eq!(err.metadata_map(), expected);
    }

    #[test]
    fn code_set_only_by_integer_slot(a in plain_arg(), b in plain_arg(), c in plain_arg()) {
        let slots = Slots::classify(a.clone(), b.clone(), c.clone());
        let err = create(a, b, c);
        match slots.code {
            Arg::Int(n) => prop_assert_eq!(err.code, Some(n)),
            _ => prop_assert!(err.code.is_none()),
        }
    }

    #[test]
    fn metadata_is_always_built(a in plain_arg(), b in plain_arg(), c in plain_arg()) {
        let err = create(a, b, c);
        if let Some(md) = err.metadata {
            for k in md.keys() {
                prop_assert_eq!(k.to_string(), k.to_ascii_lowercase());
            }
        }
    }

    #[test]
    fn non_error_targets_are_rejected(t in plain_arg()) {
        prop_assert!(normalize(t, "m", Arg::Absent, Arg::Absent).is_err());
    }
}
