// SPDX-License-Identifier: MIT OR Apache-2.0
//! The normalized error value and its serialisable snapshot.

use crate::arg::{Arg, ErrorCapable, SourceError};
use rpcerr_metadata::{Metadata, MetadataMap, MetadataValue, build_metadata};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// NormalizeError
// ---------------------------------------------------------------------------

/// Failure to normalize onto a target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// The target to update is not an error value. Nothing was changed.
    #[error("target must be an error value, got {found}")]
    InvalidTargetKind {
        /// Shape of the rejected target.
        found: &'static str,
    },
}

impl NormalizeError {
    /// Stable tag for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTargetKind { .. } => "INVALID_TARGET_KIND",
        }
    }
}

// ---------------------------------------------------------------------------
// RpcError
// ---------------------------------------------------------------------------

/// An RPC-compatible error: message, optional code, optional metadata.
///
/// Usually produced by [`create`](crate::create) or
/// [`normalize`](crate::normalize), but it can also be assembled directly:
///
/// ```
/// use rpcerr_normalize::RpcError;
///
/// let err = RpcError::new("token expired")
///     .with_code(16)
///     .with_metadata("error_code", "INVALID_TOKEN");
/// assert_eq!(err.to_string(), r#"[16] token expired {"error_code":"INVALID_TOKEN"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcError {
    /// Human-readable description; may be empty.
    pub message: String,
    /// Numeric status code.
    pub code: Option<i64>,
    /// Attached metadata handle.
    pub metadata: Option<Metadata>,
}

impl RpcError {
    /// Error with a message, no code, and no metadata.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            metadata: None,
        }
    }

    /// Set the status code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// Set one metadata entry, creating the handle if needed.
    ///
    /// Entries the handle rejects (illegal key, non-printable value) are
    /// silently skipped and leave the error unchanged.
    pub fn with_metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        match self.metadata.as_mut() {
            Some(md) => {
                let _ = md.set(key, value);
            }
            None => {
                let mut md = Metadata::new();
                if md.set(key, value).is_ok() {
                    self.metadata = Some(md);
                }
            }
        }
        self
    }

    /// Replace the metadata handle.
    pub fn with_metadata_handle(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Flat view of the metadata, empty when there is none.
    pub fn metadata_map(&self) -> MetadataMap {
        self.metadata
            .as_ref()
            .map(Metadata::to_map)
            .unwrap_or_default()
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "[{code}] ")?;
        }
        f.write_str(&self.message)?;
        let map = self.metadata_map();
        if !map.is_empty()
            && let Ok(md) = serde_json::to_string(&map)
        {
            write!(f, " {md}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcError {}

impl ErrorCapable for RpcError {
    fn error_message(&self) -> String {
        self.message.clone()
    }

    fn error_code(&self) -> Arg {
        self.code.map_or(Arg::Absent, Arg::Int)
    }

    fn error_metadata(&self) -> Arg {
        self.metadata.clone().map_or(Arg::Absent, Arg::Metadata)
    }
}

impl From<RpcError> for Arg {
    fn from(err: RpcError) -> Self {
        Arg::error(&err)
    }
}

impl From<&RpcError> for Arg {
    fn from(err: &RpcError) -> Self {
        Arg::error(err)
    }
}

impl From<&RpcError> for SourceError {
    fn from(err: &RpcError) -> Self {
        SourceError::capture(err)
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of an [`RpcError`].
///
/// Metadata is flattened to one value per key; call options are not kept.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RpcErrorDto {
    /// Human-readable message.
    pub message: String,
    /// Status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Flattened metadata.
    #[serde(default, skip_serializing_if = "MetadataMap::is_empty")]
    pub metadata: MetadataMap,
}

impl From<&RpcError> for RpcErrorDto {
    fn from(err: &RpcError) -> Self {
        Self {
            message: err.message.clone(),
            code: err.code,
            metadata: err.metadata_map(),
        }
    }
}

impl From<RpcErrorDto> for RpcError {
    fn from(dto: RpcErrorDto) -> Self {
        Self {
            message: dto.message,
            code: dto.code,
            metadata: (!dto.metadata.is_empty()).then(|| build_metadata(dto.metadata)),
        }
    }
}
