// SPDX-License-Identifier: MIT OR Apache-2.0
//! rpcerr-metadata
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Key/value metadata attached to RPC errors.
//!
//! [`Metadata`] is the built handle: keys are lower-cased and validated, keys
//! ending in `-bin` carry binary values, every other key carries printable
//! ASCII. Handles are produced from raw mappings or other handles through
//! [`build_metadata`] (or a configured [`MetadataBuilder`]) and read back with
//! [`read_metadata`].

mod builder;

pub use builder::{MetadataBuilder, MetadataSource, RawMetadata, build_metadata, read_metadata};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Suffix marking a key whose values are binary.
pub const BINARY_KEY_SUFFIX: &str = "-bin";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a key or value is rejected by [`Metadata`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// Key is empty or contains characters outside `0-9 a-z _ . -`.
    #[error("metadata key {key:?} contains illegal characters")]
    InvalidKey {
        /// Offending key, already lower-cased.
        key: String,
    },

    /// ASCII value contains non-printable characters.
    #[error("metadata value for key {key:?} contains illegal characters")]
    InvalidValue {
        /// Key the value was destined for.
        key: String,
    },

    /// A `-bin` key was given an ASCII value.
    #[error("metadata key {key:?} ends with '-bin' and requires a binary value")]
    BinaryValueRequired {
        /// Offending key.
        key: String,
    },

    /// A non-`-bin` key was given a binary value.
    #[error("metadata key {key:?} does not end with '-bin' and requires a string value")]
    AsciiValueRequired {
        /// Offending key.
        key: String,
    },
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Printable ASCII text.
    Ascii(String),
    /// Raw bytes, only legal under `-bin` keys.
    Binary(Vec<u8>),
}

impl MetadataValue {
    /// Returns the text if this is an ASCII value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Ascii(s) => Some(s),
            Self::Binary(_) => None,
        }
    }

    /// Returns the bytes if this is a binary value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Ascii(_) => None,
            Self::Binary(b) => Some(b),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascii(s) => f.write_str(s),
            Self::Binary(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Ascii(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Ascii(s)
    }
}

impl From<Vec<u8>> for MetadataValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(b)
    }
}

impl From<&[u8]> for MetadataValue {
    fn from(b: &[u8]) -> Self {
        Self::Binary(b.to_vec())
    }
}

/// Flat key/value view of a handle: one value per key.
pub type MetadataMap = BTreeMap<String, MetadataValue>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Call flags that travel with a metadata handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct MetadataOptions {
    /// Signal that the call is idempotent.
    #[serde(default)]
    pub idempotent_request: bool,
    /// Wait for the channel to become ready instead of failing fast.
    #[serde(default)]
    pub wait_for_ready: bool,
    /// Signal that the call is cacheable.
    #[serde(default)]
    pub cacheable_request: bool,
    /// Hold sending until the first message is written.
    #[serde(default)]
    pub corked: bool,
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Built metadata handle.
///
/// Keys are stored lower-cased and may carry several values, in insertion
/// order. Equality compares entries and options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, Vec<MetadataValue>>,
    options: MetadataOptions,
}

impl Metadata {
    /// Empty handle with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty handle carrying `options`.
    pub fn with_options(options: MetadataOptions) -> Self {
        Self {
            entries: BTreeMap::new(),
            options,
        }
    }

    /// Replace every value stored under `key` with `value`.
    pub fn set(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<MetadataValue>,
    ) -> Result<(), MetadataError> {
        let (key, value) = validate(key.as_ref(), value.into())?;
        self.entries.insert(key, vec![value]);
        Ok(())
    }

    /// Append `value` to the values stored under `key`.
    pub fn add(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<MetadataValue>,
    ) -> Result<(), MetadataError> {
        let (key, value) = validate(key.as_ref(), value.into())?;
        self.entries.entry(key).or_default().push(value);
        Ok(())
    }

    /// Drop every value stored under `key`.
    pub fn remove(&mut self, key: impl AsRef<str>) {
        self.entries.remove(&key.as_ref().to_ascii_lowercase());
    }

    /// All values stored under `key`, oldest first.
    pub fn get(&self, key: impl AsRef<str>) -> &[MetadataValue] {
        self.entries
            .get(&key.as_ref().to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value stored under `key`.
    pub fn get_first(&self, key: impl AsRef<str>) -> Option<&MetadataValue> {
        self.get(key).first()
    }

    /// Flat view keeping the first value of each key.
    pub fn to_map(&self) -> MetadataMap {
        self.entries
            .iter()
            .filter_map(|(k, vs)| vs.first().map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Append every value of `other` to this handle. Options are kept.
    pub fn merge(&mut self, other: &Metadata) {
        for (key, values) in &other.entries {
            self.entries
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no key is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every `(key, value)` pair, including repeated keys.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v)))
    }

    /// Call flags carried by this handle.
    pub fn options(&self) -> MetadataOptions {
        self.options
    }

    /// Replace the call flags.
    pub fn set_options(&mut self, options: MetadataOptions) {
        self.options = options;
    }
}

fn is_legal_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase() || matches!(b, b'_' | b'.' | b'-'))
}

fn is_legal_ascii_value(value: &str) -> bool {
    value.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

fn validate(key: &str, value: MetadataValue) -> Result<(String, MetadataValue), MetadataError> {
    let key = key.to_ascii_lowercase();
    if !is_legal_key(&key) {
        return Err(MetadataError::InvalidKey { key });
    }
    match (&value, key.ends_with(BINARY_KEY_SUFFIX)) {
        (MetadataValue::Ascii(_), true) => return Err(MetadataError::BinaryValueRequired { key }),
        (MetadataValue::Binary(_), false) => return Err(MetadataError::AsciiValueRequired { key }),
        (MetadataValue::Ascii(s), false) if !is_legal_ascii_value(s) => {
            return Err(MetadataError::InvalidValue { key });
        }
        _ => {}
    }
    Ok((key, value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
