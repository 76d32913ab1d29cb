// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loosely-shaped positional arguments and their classification.

use rpcerr_metadata::{Metadata, MetadataMap, MetadataSource, RawMetadata};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Arg
// ---------------------------------------------------------------------------

/// One positional argument as a caller passed it.
///
/// Every shape a call site can produce has a variant, so no input is ever
/// rejected; the normalizer decides what each one means from its position
/// and its [`ArgKind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Arg {
    /// Argument not supplied.
    #[default]
    Absent,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer; the only shape that can populate a code.
    Int(i64),
    /// Non-integer number.
    Float(f64),
    /// Text, including numeric-looking text.
    Str(String),
    /// Plain key/value mapping.
    Map(RawMetadata),
    /// Built metadata handle.
    Metadata(Metadata),
    /// An existing error to seed from.
    Error(Box<SourceError>),
}

/// Classification of an [`Arg`], evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Error-capable value.
    SourceError,
    /// Object-like value usable as metadata.
    Metadata,
    /// Numeric value.
    Code,
    /// Text.
    Message,
    /// Absent, null, or boolean.
    Empty,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SourceError => "source_error",
            Self::Metadata => "metadata",
            Self::Code => "code",
            Self::Message => "message",
            Self::Empty => "empty",
        };
        f.write_str(s)
    }
}

impl Arg {
    /// Wrap any error-capable value as a source error argument.
    pub fn error(err: &impl ErrorCapable) -> Self {
        Self::Error(Box::new(SourceError::capture(err)))
    }

    /// `true` for [`Arg::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// `true` for mappings, handles, and errors.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Map(_) | Self::Metadata(_) | Self::Error(_))
    }

    /// `true` for integers and floats.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Truthiness: absent, null, `false`, zero, NaN, and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Absent | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::Map(_) | Self::Metadata(_) | Self::Error(_) => true,
        }
    }

    /// Classify this argument.
    pub fn kind(&self) -> ArgKind {
        if self.is_error() {
            ArgKind::SourceError
        } else if self.is_object() {
            ArgKind::Metadata
        } else if self.is_numeric() {
            ArgKind::Code
        } else if matches!(self, Self::Str(_)) {
            ArgKind::Message
        } else {
            ArgKind::Empty
        }
    }

    /// Short name of the shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Map(_) => "mapping",
            Self::Metadata(_) => "metadata",
            Self::Error(_) => "error",
        }
    }

    /// What a handle would be built from, if this is object-like.
    ///
    /// An error in metadata position contributes its own metadata, or nothing.
    pub fn metadata_source(&self) -> Option<MetadataSource> {
        match self {
            Self::Map(raw) => Some(MetadataSource::Raw(raw.clone())),
            Self::Metadata(md) => Some(MetadataSource::Handle(md.clone())),
            Self::Error(err) => Some(
                err.metadata
                    .metadata_source()
                    .unwrap_or_else(|| MetadataSource::Entries(MetadataMap::new())),
            ),
            _ => None,
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

macro_rules! int_arg {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(n: $t) -> Self {
                Self::Int(i64::from(n))
            }
        })*
    };
}

int_arg!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Arg {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Arg {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<RawMetadata> for Arg {
    fn from(raw: RawMetadata) -> Self {
        Self::Map(raw)
    }
}

impl From<Metadata> for Arg {
    fn from(md: Metadata) -> Self {
        Self::Metadata(md)
    }
}

impl From<SourceError> for Arg {
    fn from(err: SourceError) -> Self {
        Self::Error(Box::new(err))
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Absent, Into::into)
    }
}

/// JSON arrays become mappings keyed by index.
impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Str(s),
            Value::Object(map) => Self::Map(map.into_iter().collect()),
            Value::Array(items) => Self::Map(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Anything that can act as an error to seed from.
pub trait ErrorCapable {
    /// Human-readable message.
    fn error_message(&self) -> String;

    /// Code attribute, in whatever shape the error stores it.
    fn error_code(&self) -> Arg {
        Arg::Absent
    }

    /// Metadata attribute, in whatever shape the error stores it.
    fn error_metadata(&self) -> Arg {
        Arg::Absent
    }
}

/// Snapshot of an existing error's message, code, and metadata.
///
/// `code` and `metadata` keep their raw shapes: a string code is carried
/// as-is and ignored when seeding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceError {
    /// Message to copy.
    pub message: String,
    /// Code attribute; copied only when it is [`Arg::Int`].
    pub code: Arg,
    /// Metadata attribute; copied only when it is object-like.
    pub metadata: Arg,
}

impl SourceError {
    /// Error with a message and nothing else.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the code attribute.
    pub fn with_code(mut self, code: impl Into<Arg>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the metadata attribute.
    pub fn with_metadata(mut self, metadata: impl Into<Arg>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Snapshot any error-capable value.
    pub fn capture(err: &impl ErrorCapable) -> Self {
        Self {
            message: err.error_message(),
            code: err.error_code(),
            metadata: err.error_metadata(),
        }
    }

    /// Snapshot a standard error: its display string becomes the message.
    pub fn from_std(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(err.to_string())
    }
}

impl ErrorCapable for SourceError {
    fn error_message(&self) -> String {
        self.message.clone()
    }

    fn error_code(&self) -> Arg {
        self.code.clone()
    }

    fn error_metadata(&self) -> Arg {
        self.metadata.clone()
    }
}
