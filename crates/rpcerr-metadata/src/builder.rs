// SPDX-License-Identifier: MIT OR Apache-2.0
//! Building handles from raw mappings, flat views, or other handles.

use crate::{BINARY_KEY_SUFFIX, Metadata, MetadataMap, MetadataOptions, MetadataValue};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Plain key/value mapping as a caller would write it, before validation.
pub type RawMetadata = BTreeMap<String, Value>;

/// Anything a handle can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataSource {
    /// Unvalidated mapping; values are coerced to text where possible.
    Raw(RawMetadata),
    /// Flat key/value view such as one returned by [`read_metadata`].
    Entries(MetadataMap),
    /// An already-built handle.
    Handle(Metadata),
}

impl From<RawMetadata> for MetadataSource {
    fn from(raw: RawMetadata) -> Self {
        Self::Raw(raw)
    }
}

impl From<MetadataMap> for MetadataSource {
    fn from(map: MetadataMap) -> Self {
        Self::Entries(map)
    }
}

impl From<Metadata> for MetadataSource {
    fn from(md: Metadata) -> Self {
        Self::Handle(md)
    }
}

impl From<&Metadata> for MetadataSource {
    fn from(md: &Metadata) -> Self {
        Self::Handle(md.clone())
    }
}

/// Builds [`Metadata`] handles carrying a fixed set of call options.
///
/// Building never fails: entries the container rejects are dropped and
/// reported through `tracing` under the `rpcerr.metadata` target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataBuilder {
    options: MetadataOptions,
}

impl MetadataBuilder {
    /// Builder stamping `options` on every handle built from a mapping.
    pub fn new(options: MetadataOptions) -> Self {
        Self { options }
    }

    /// Options applied to handles built from mappings.
    pub fn options(&self) -> MetadataOptions {
        self.options
    }

    /// Build a handle from `source`.
    ///
    /// A [`MetadataSource::Handle`] is returned unchanged, options included.
    pub fn build(&self, source: impl Into<MetadataSource>) -> Metadata {
        match source.into() {
            MetadataSource::Handle(md) => md,
            MetadataSource::Entries(map) => {
                let mut md = Metadata::with_options(self.options);
                for (key, value) in map {
                    if let Err(err) = md.set(&key, value) {
                        warn!(target: "rpcerr.metadata", %key, %err, "dropping metadata entry");
                    }
                }
                md
            }
            MetadataSource::Raw(raw) => {
                let mut md = Metadata::with_options(self.options);
                for (key, value) in &raw {
                    let Some(value) = coerce_raw(key, value) else {
                        continue;
                    };
                    if let Err(err) = md.set(key, value) {
                        warn!(target: "rpcerr.metadata", %key, %err, "dropping metadata entry");
                    }
                }
                md
            }
        }
    }
}

/// Build a handle with default options. See [`MetadataBuilder::build`].
pub fn build_metadata(source: impl Into<MetadataSource>) -> Metadata {
    MetadataBuilder::default().build(source)
}

/// Flat key/value view of `handle`, first value per key.
pub fn read_metadata(handle: &Metadata) -> MetadataMap {
    handle.to_map()
}

// Null and empty strings carry nothing. Scalars are stringified, compound
// values become compact JSON. A `-bin` key accepts an array of bytes.
fn coerce_raw(key: &str, value: &Value) -> Option<MetadataValue> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(MetadataValue::Ascii(s.clone())),
        Value::Bool(b) => Some(MetadataValue::Ascii(b.to_string())),
        Value::Number(n) => Some(MetadataValue::Ascii(n.to_string())),
        Value::Array(items) if key.to_ascii_lowercase().ends_with(BINARY_KEY_SUFFIX) => {
            let bytes = items
                .iter()
                .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>();
            if bytes.is_none() {
                warn!(target: "rpcerr.metadata", %key, "binary metadata value is not a byte array");
            }
            bytes.map(MetadataValue::Binary)
        }
        other => Some(MetadataValue::Ascii(other.to_string())),
    }
}
