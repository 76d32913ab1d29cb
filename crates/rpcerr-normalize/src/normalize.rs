// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot resolution and application.

use crate::arg::{Arg, SourceError};
use crate::value::{NormalizeError, RpcError};
use rpcerr_config::NormalizerConfig;
use rpcerr_metadata::MetadataBuilder;
use tracing::debug;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Where each positional argument ended up after classification.
///
/// Produced by [`Slots::classify`] and consumed by [`Slots::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Slots {
    /// Candidate for the message; applied only if it is [`Arg::Str`].
    pub message: Arg,
    /// Candidate for the code; applied only if it is [`Arg::Int`].
    pub code: Arg,
    /// Candidate for the metadata; applied only if it is object-like.
    pub metadata: Arg,
}

impl Slots {
    /// Route three positional arguments into slots.
    ///
    /// Rules run in this order and each sees the result of the previous one:
    ///
    /// 1. a non-error object in first position becomes the metadata; the
    ///    message becomes `""` and the code null, discarding both other
    ///    arguments;
    /// 2. a number in first position becomes the code, the second argument
    ///    becomes the metadata, and the message becomes `""`;
    /// 3. an object in code position moves to metadata and the code is
    ///    cleared;
    /// 4. falsy metadata becomes null.
    ///
    /// A source error in first position stays where it is; seeding from it is
    /// the caller's job.
    pub fn classify(message: Arg, code: Arg, metadata: Arg) -> Self {
        let (mut message, mut code, mut metadata) = (message, code, metadata);

        if message.is_object() && !message.is_error() {
            metadata = std::mem::replace(&mut message, Arg::Str(String::new()));
            code = Arg::Null;
        }

        if message.is_numeric() {
            metadata = code;
            code = std::mem::replace(&mut message, Arg::Str(String::new()));
        }

        if code.is_object() {
            metadata = std::mem::replace(&mut code, Arg::Null);
        }

        if !metadata.is_truthy() {
            metadata = Arg::Null;
        }

        Self {
            message,
            code,
            metadata,
        }
    }

    /// Write the slots onto `target`.
    ///
    /// A string message always overwrites, the empty string included. A code
    /// overwrites only when it is an integer. New metadata is unioned with any
    /// metadata already on the target; new keys win.
    pub fn apply(self, mut target: RpcError, builder: &MetadataBuilder) -> RpcError {
        if let Arg::Str(message) = self.message {
            target.message = message;
        }
        if let Arg::Int(code) = self.code {
            target.code = Some(code);
        }
        if let Some(source) = self.metadata.metadata_source() {
            let merged = match target.metadata.take() {
                Some(existing) => {
                    let mut union = existing.to_map();
                    union.extend(builder.build(source).to_map());
                    builder.build(union)
                }
                None => builder.build(source),
            };
            target.metadata = Some(merged);
        }
        target
    }
}

/// Copy a source error's fields onto `target`.
///
/// The code is copied only if it is an integer and the metadata only if it is
/// object-like; otherwise the target keeps what it had.
fn seed(mut target: RpcError, source: &SourceError, builder: &MetadataBuilder) -> RpcError {
    target.message = source.message.clone();
    if let Arg::Int(code) = source.code {
        target.code = Some(code);
    }
    if let Some(md) = source.metadata.metadata_source() {
        target.metadata = Some(builder.build(md));
    }
    target
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Normalizes argument triples into [`RpcError`]s.
///
/// Holds the [`MetadataBuilder`] every handle is built with. The free
/// functions [`create`] and [`normalize`] use a default instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    builder: MetadataBuilder,
}

impl Normalizer {
    /// Normalizer building metadata with `builder`.
    pub fn new(builder: MetadataBuilder) -> Self {
        Self { builder }
    }

    /// Normalizer configured from a [`NormalizerConfig`].
    pub fn from_config(config: &NormalizerConfig) -> Self {
        Self::new(MetadataBuilder::new(config.metadata))
    }

    /// Builder used for every metadata handle.
    pub fn builder(&self) -> &MetadataBuilder {
        &self.builder
    }

    /// Apply the arguments onto an existing error and return the result.
    pub fn apply(
        &self,
        target: RpcError,
        message: impl Into<Arg>,
        code: impl Into<Arg>,
        metadata: impl Into<Arg>,
    ) -> RpcError {
        let message = message.into();
        let target = match &message {
            Arg::Error(source) => seed(target, source, &self.builder),
            _ => target,
        };
        let seeded = message.is_error();
        let slots = Slots::classify(message, code.into(), metadata.into());
        debug!(
            target: "rpcerr.normalize",
            seeded,
            message_slot = %slots.message.kind(),
            code_slot = %slots.code.kind(),
            metadata_slot = %slots.metadata.kind(),
            "resolved argument slots"
        );
        slots.apply(target, &self.builder)
    }

    /// Apply the arguments onto `target`, which must be an error value.
    ///
    /// Fails with [`NormalizeError::InvalidTargetKind`] for any other shape.
    pub fn normalize(
        &self,
        target: impl Into<Arg>,
        message: impl Into<Arg>,
        code: impl Into<Arg>,
        metadata: impl Into<Arg>,
    ) -> Result<RpcError, NormalizeError> {
        let target = match target.into() {
            Arg::Error(source) => seed(RpcError::default(), &source, &self.builder),
            other => {
                debug!(target: "rpcerr.normalize", found = other.type_name(), "rejected target");
                return Err(NormalizeError::InvalidTargetKind {
                    found: other.type_name(),
                });
            }
        };
        Ok(self.apply(target, message, code, metadata))
    }

    /// Build a fresh error from the arguments.
    pub fn create(
        &self,
        message: impl Into<Arg>,
        code: impl Into<Arg>,
        metadata: impl Into<Arg>,
    ) -> RpcError {
        self.apply(RpcError::default(), message, code, metadata)
    }
}

/// Build a fresh error from up to three loosely-shaped arguments.
///
/// Pass [`Arg::Absent`] for arguments you would omit, or use
/// [`rpc_error!`](crate::rpc_error).
pub fn create(
    message: impl Into<Arg>,
    code: impl Into<Arg>,
    metadata: impl Into<Arg>,
) -> RpcError {
    Normalizer::default().create(message, code, metadata)
}

/// Apply the arguments onto an existing error value.
///
/// `target` must convert to [`Arg::Error`]; anything else is rejected with
/// [`NormalizeError::InvalidTargetKind`].
pub fn normalize(
    target: impl Into<Arg>,
    message: impl Into<Arg>,
    code: impl Into<Arg>,
    metadata: impl Into<Arg>,
) -> Result<RpcError, NormalizeError> {
    Normalizer::default().normalize(target, message, code, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcerr_metadata::{Metadata, MetadataMap, MetadataOptions, MetadataValue};
    use serde_json::json;

    fn md_map(pairs: &[(&str, &str)]) -> MetadataMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), MetadataValue::from(*v)))
            .collect()
    }

    #[test]
    fn classify_plain_string_triple() {
        let slots = Slots::classify("Boom".into(), 3.into(), Arg::Absent);
        assert_eq!(slots.message, Arg::from("Boom"));
        assert_eq!(slots.code, Arg::Int(3));
        assert_eq!(slots.metadata, Arg::Null);
    }

    #[test]
    fn classify_object_first_discards_other_args() {
        let slots = Slots::classify(json!({ "foo": "bar" }).into(), 5.into(), json!({ "x": "y" }).into());
        assert_eq!(slots.message, Arg::from(""));
        assert_eq!(slots.code, Arg::Null);
        assert_eq!(slots.metadata, Arg::from(json!({ "foo": "bar" })));
    }

    #[test]
    fn classify_numeric_first_shifts_right() {
        let slots = Slots::classify(14.into(), json!({ "a": "b" }).into(), json!({ "c": "d" }).into());
        assert_eq!(slots.message, Arg::from(""));
        assert_eq!(slots.code, Arg::Int(14));
        assert_eq!(slots.metadata, Arg::from(json!({ "a": "b" })));
    }

    #[test]
    fn classify_object_code_moves_to_metadata() {
        let slots = Slots::classify("m".into(), json!({ "a": "b" }).into(), json!({ "c": "d" }).into());
        assert_eq!(slots.code, Arg::Null);
        assert_eq!(slots.metadata, Arg::from(json!({ "a": "b" })));
    }

    #[test]
    fn classify_falsy_metadata_becomes_null() {
        for falsy in [Arg::from(""), Arg::from(0), Arg::from(false), Arg::Absent] {
            let slots = Slots::classify("m".into(), Arg::Absent, falsy);
            assert_eq!(slots.metadata, Arg::Null);
        }
    }

    #[test]
    fn classify_leaves_source_error_in_place() {
        let source = Arg::from(SourceError::new("Boom"));
        let slots = Slots::classify(source.clone(), 1.into(), Arg::Absent);
        assert_eq!(slots.message, source);
        assert_eq!(slots.code, Arg::Int(1));
    }

    #[test]
    fn apply_merges_with_new_keys_winning() {
        let target = RpcError::new("x")
            .with_metadata("foo", "old")
            .with_metadata("keep", "1");
        let slots = Slots::classify(Arg::Absent, Arg::Absent, json!({ "FOO": "new" }).into());
        let out = slots.apply(target, &MetadataBuilder::default());
        assert_eq!(out.metadata_map(), md_map(&[("foo", "new"), ("keep", "1")]));
    }

    #[test]
    fn seed_ignores_non_integer_code_and_non_object_metadata() {
        let target = RpcError::new("t").with_code(9).with_metadata("a", "b");
        let source = SourceError::new("s").with_code("10").with_metadata("nope");
        let out = seed(target, &source, &MetadataBuilder::default());
        assert_eq!(out.message, "s");
        assert_eq!(out.code, Some(9));
        assert_eq!(out.metadata_map(), md_map(&[("a", "b")]));
    }

    #[test]
    fn normalize_rejects_non_error_target() {
        let err = normalize("not an error", "m", Arg::Absent, Arg::Absent).unwrap_err();
        assert_eq!(err, NormalizeError::InvalidTargetKind { found: "string" });
        let err = normalize(json!({ "a": "b" }), "m", Arg::Absent, Arg::Absent).unwrap_err();
        assert_eq!(err, NormalizeError::InvalidTargetKind { found: "mapping" });
    }

    #[test]
    fn normalize_updates_existing_error() {
        let target = RpcError::new("old").with_code(1).with_metadata("a", "1");
        let out = normalize(target, "new", Arg::Absent, json!({ "b": "2" })).unwrap();
        assert_eq!(out.message, "new");
        assert_eq!(out.code, Some(1));
        assert_eq!(out.metadata_map(), md_map(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn configured_builder_stamps_options() {
        let config = NormalizerConfig {
            metadata: MetadataOptions {
                wait_for_ready: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let normalizer = Normalizer::from_config(&config);
        let err = normalizer.create("m", Arg::Absent, json!({ "a": "b" }));
        assert!(err.metadata.unwrap().options().wait_for_ready);
    }

    #[test]
    fn public_types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Arg>();
        assert_send_sync::<Slots>();
        assert_send_sync::<Normalizer>();
        assert_send_sync::<RpcError>();
        assert_send_sync::<NormalizeError>();
    }

    #[test]
    fn handle_metadata_kept_verbatim_without_existing() {
        let mut md = Metadata::new();
        md.add("multi", "1").unwrap();
        md.add("multi", "2").unwrap();
        let err = create("m", Arg::Absent, md.clone());
        assert_eq!(err.metadata, Some(md));
    }
}
