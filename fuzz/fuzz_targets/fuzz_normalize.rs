// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz `create` and `normalize` with arbitrary JSON argument triples.
//!
//! Verifies:
//! 1. Normalization never panics on any argument shape.
//! 2. A code is set only when the resolved code slot is an integer.
//! 3. Built metadata keys are always lower-case.
//! 4. Non-error targets are always rejected.
#![no_main]
use libfuzzer_sys::fuzz_target;
use rpcerr_normalize::{Arg, RpcErrorDto, SourceError, Slots, create, normalize};
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(Value::Array(items)) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let mut args: Vec<Arg> = items.into_iter().take(3).map(Arg::from).collect();
    args.resize(3, Arg::Absent);

    // Optionally wrap the first argument's shape as a source error.
    if data.len() % 2 == 0
        && let Arg::Str(ref message) = args[0]
    {
        args[0] = SourceError::new(message.clone())
            .with_code(args[1].clone())
            .into();
    }

    let [a, b, c]: [Arg; 3] = args.try_into().expect("exactly three args");

    // --- Property 1 & 2 ---
    let slots = Slots::classify(a.clone(), b.clone(), c.clone());
    let seeded = a.is_error();
    let err = create(a, b, c);
    if !seeded && !matches!(slots.code, Arg::Int(_)) {
        assert!(err.code.is_none());
    }

    // --- Property 3 ---
    if let Some(md) = &err.metadata {
        for k in md.keys() {
            assert_eq!(k, k.to_ascii_lowercase());
        }
    }

    // DTO must serialize.
    let dto = RpcErrorDto::from(&err);
    let _ = serde_json::to_string(&dto).expect("dto must serialize");

    // --- Property 4 ---
    assert!(normalize(Arg::Null, "m", Arg::Absent, Arg::Absent).is_err());
    assert!(normalize(err, "m", Arg::Absent, Arg::Absent).is_ok());
});
