// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests spanning the metadata, normalize and config crates.

use proptest::prelude::*;
use rpcerr_config::NormalizerConfig;
use rpcerr_metadata::{MetadataOptions, RawMetadata, build_metadata, read_metadata};
use rpcerr_normalize::{Arg, Normalizer, RpcError, RpcErrorDto, create, normalize};
use serde_json::Value;

fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_.-]{0,9}".prop_filter("binary suffix", |k| {
        !k.to_ascii_lowercase().ends_with("-bin")
    })
}

/// Raw values, including control-character strings the builder drops.
fn raw_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[ -~]{0,12}".prop_map(Value::String),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
        "[\\x00-\\x1f]{1,3}".prop_map(Value::String),
    ]
}

fn raw_map() -> impl Strategy<Value = RawMetadata> {
    prop::collection::btree_map(key(), raw_value(), 1..6)
}

fn options() -> impl Strategy<Value = MetadataOptions> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(idempotent_request, wait_for_ready, cacheable_request, corked)| MetadataOptions {
            idempotent_request,
            wait_for_ready,
            cacheable_request,
            corked,
        },
    )
}

// ── 1. create() stores exactly what the builder would build ─────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn created_metadata_matches_builder_view(raw in raw_map()) {
        let expected = read_metadata(&build_metadata(raw.clone()));
        let err = create("m", Arg::Absent, raw);
        prop_assert_eq!(err.metadata_map(), expected);
    }
}

// ── 2. read(build(read(h))) == read(h) through the DTO ──────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn dto_round_trip_preserves_metadata_view(raw in raw_map(), code in any::<i64>()) {
        let err = create("m", code, raw);
        let dto = RpcErrorDto::from(&err);
        let json = serde_json::to_string(&dto).unwrap();
        let back = RpcError::from(serde_json::from_str::<RpcErrorDto>(&json).unwrap());
        prop_assert_eq!(back.metadata_map(), err.metadata_map());
        prop_assert_eq!(back.code, Some(code));
    }
}

// ── 3. Merge keeps old keys and lets new keys win ───────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn normalize_merge_is_overlay(old in raw_map(), new in raw_map()) {
        let target = create("m", Arg::Absent, old.clone());
        let out = normalize(target, Arg::Absent, Arg::Absent, new.clone()).unwrap();

        let mut expected = read_metadata(&build_metadata(old));
        expected.extend(read_metadata(&build_metadata(new)));
        prop_assert_eq!(out.metadata_map(), expected);
        prop_assert_eq!(out.message, "m");
    }
}

// ── 4. Configured options reach every built handle ──────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]
    #[test]
    fn configured_options_are_stamped(raw in raw_map(), opts in options()) {
        let config = NormalizerConfig { metadata: opts, ..Default::default() };
        let err = Normalizer::from_config(&config).create("m", Arg::Absent, raw);
        if let Some(md) = err.metadata {
            prop_assert_eq!(md.options(), opts);
        }
    }
}
