// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz metadata building from arbitrary JSON objects.
#![no_main]
use libfuzzer_sys::fuzz_target;
use rpcerr_metadata::{RawMetadata, build_metadata, read_metadata};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<RawMetadata>(data) else {
        return;
    };
    // Building is total and rebuilding from the view is idempotent.
    let handle = build_metadata(raw);
    let view = read_metadata(&handle);
    assert_eq!(read_metadata(&build_metadata(view.clone())), view);
});
