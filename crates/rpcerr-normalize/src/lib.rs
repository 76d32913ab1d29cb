// SPDX-License-Identifier: MIT OR Apache-2.0
//! Build RPC-compatible errors from loosely-shaped arguments.
//!
//! Call sites pass up to three positional arguments in whatever shape is at
//! hand: a message, a message and a code, a message and metadata, metadata
//! alone, a code followed by metadata, or an existing error to copy and
//! extend. [`create`] decides which argument is which and returns a single
//! [`RpcError`] with a message, an optional integer code and an optional
//! [`Metadata`] handle.
//!
//! ```
//! use rpcerr_normalize::{RpcError, rpc_error};
//! use serde_json::json;
//!
//! let err = rpc_error!("Boom", 2000, json!({ "ERROR_CODE": "INVALID_TOKEN" }));
//! assert_eq!(err.message, "Boom");
//! assert_eq!(err.code, Some(2000));
//! assert_eq!(err.metadata_map()["error_code"].as_str(), Some("INVALID_TOKEN"));
//!
//! // Seed from an existing error, override the code, merge metadata.
//! let existing = RpcError::new("Boom").with_code(1000).with_metadata("foo", "bar");
//! let err = rpc_error!(existing, 2000, json!({ "ERROR_CODE": "X" }));
//! assert_eq!(err.code, Some(2000));
//! assert_eq!(err.metadata_map().len(), 2);
//! ```
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod arg;
mod normalize;
mod value;

pub use arg::{Arg, ArgKind, ErrorCapable, SourceError};
pub use normalize::{Normalizer, Slots, create, normalize};
pub use value::{NormalizeError, RpcError, RpcErrorDto};

pub use rpcerr_metadata::{
    Metadata, MetadataBuilder, MetadataMap, MetadataOptions, MetadataValue, RawMetadata,
    build_metadata, read_metadata,
};

/// [`create`] with trailing arguments optional.
///
/// ```
/// use rpcerr_normalize::rpc_error;
///
/// let err = rpc_error!("Boom");
/// assert_eq!(err.message, "Boom");
/// assert!(err.code.is_none());
///
/// let err = rpc_error!(14);
/// assert_eq!(err.message, "");
/// assert_eq!(err.code, Some(14));
/// ```
#[macro_export]
macro_rules! rpc_error {
    ($message:expr $(,)?) => {
        $crate::create($message, $crate::Arg::Absent, $crate::Arg::Absent)
    };
    ($message:expr, $code:expr $(,)?) => {
        $crate::create($message, $code, $crate::Arg::Absent)
    };
    ($message:expr, $code:expr, $metadata:expr $(,)?) => {
        $crate::create($message, $code, $metadata)
    };
}
