// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for rpcerr.
//!
//! [`NormalizerConfig`] holds the settings a normalizer is built from:
//! the log level the host should run at and the call options stamped on
//! every metadata handle built from a mapping.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use rpcerr_metadata::MetadataOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file could not be read.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// A call option is enabled that is unusual on error metadata.
    UnusualCallOption {
        /// Name of the option.
        option: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::UnusualCallOption { option } => {
                write!(f, "call option '{option}' is enabled on error metadata")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level normalizer configuration.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Level for the `rpcerr.*` tracing targets (e.g. `"debug"`, `"info"`).
    /// See [`NormalizerConfig::filter_directive`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Call options stamped on metadata built from raw mappings.
    #[serde(default)]
    pub metadata: MetadataOptions,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".into()),
            metadata: MetadataOptions::default(),
        }
    }
}

impl NormalizerConfig {
    /// Filter directive enabling every `rpcerr.*` tracing target at the
    /// configured level, e.g. `rpcerr=debug`. Falls back to `info`.
    ///
    /// Hosts pass this to `tracing_subscriber::EnvFilter::new`.
    pub fn filter_directive(&self) -> String {
        format!("rpcerr={}", self.log_level.as_deref().unwrap_or("info"))
    }
}

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`NormalizerConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`NormalizerConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<NormalizerConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => NormalizerConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`NormalizerConfig`].
pub fn parse_toml(content: &str) -> Result<NormalizerConfig, ConfigError> {
    toml::from_str::<NormalizerConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `RPCERR_LOG_LEVEL`
/// - `RPCERR_IDEMPOTENT_REQUEST`
/// - `RPCERR_WAIT_FOR_READY`
/// - `RPCERR_CACHEABLE_REQUEST`
/// - `RPCERR_CORKED`
///
/// Flag variables accept `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`
/// (case-insensitive); anything else is ignored.
pub fn apply_env_overrides(config: &mut NormalizerConfig) {
    if let Ok(val) = std::env::var("RPCERR_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    let flags: [(&str, &mut bool); 4] = [
        (
            "RPCERR_IDEMPOTENT_REQUEST",
            &mut config.metadata.idempotent_request,
        ),
        ("RPCERR_WAIT_FOR_READY", &mut config.metadata.wait_for_ready),
        (
            "RPCERR_CACHEABLE_REQUEST",
            &mut config.metadata.cacheable_request,
        ),
        ("RPCERR_CORKED", &mut config.metadata.corked),
    ];
    for (var, slot) in flags {
        if let Some(flag) = std::env::var(var).ok().as_deref().and_then(parse_flag) {
            *slot = flag;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Unknown log levels are a [`ConfigError::ValidationError`]; soft issues
/// come back as warnings.
pub fn validate_config(config: &NormalizerConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    match config.log_level {
        Some(ref level) if !VALID_LOG_LEVELS.contains(&level.as_str()) => {
            errors.push(format!("invalid log_level '{level}'"));
        }
        Some(_) => {}
        None => warnings.push(ConfigWarning::MissingOptionalField {
            field: "log_level".into(),
            hint: "the host's default filter applies".into(),
        }),
    }

    if config.metadata.corked {
        warnings.push(ConfigWarning::UnusualCallOption {
            option: "corked".into(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations. Values in `overlay` take precedence over `base`.
///
/// Call options are combined flag by flag: a flag is set when either side
/// sets it.
pub fn merge_configs(base: NormalizerConfig, overlay: NormalizerConfig) -> NormalizerConfig {
    NormalizerConfig {
        log_level: overlay.log_level.or(base.log_level),
        metadata: MetadataOptions {
            idempotent_request: overlay.metadata.idempotent_request
                || base.metadata.idempotent_request,
            wait_for_ready: overlay.metadata.wait_for_ready || base.metadata.wait_for_ready,
            cacheable_request: overlay.metadata.cacheable_request
                || base.metadata.cacheable_request,
            corked: overlay.metadata.corked || base.metadata.corked,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
