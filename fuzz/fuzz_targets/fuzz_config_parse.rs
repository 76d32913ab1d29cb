// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz config parsing with arbitrary TOML-like strings.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parsing and validation must never panic.
        if let Ok(cfg) = rpcerr_config::parse_toml(s) {
            let _ = rpcerr_config::validate_config(&cfg);
            let merged = rpcerr_config::merge_configs(cfg.clone(), cfg.clone());
            assert_eq!(merged, cfg);
        }

        // Attempt to parse as generic TOML value then re-serialize as JSON.
        if let Ok(val) = toml::from_str::<toml::Value>(s) {
            let _ = serde_json::to_string(&val);
        }
    }
});
