//! Error types for decoding, encoding, envelopes and the tracker.

use thiserror::Error;

use crate::key::Path;

/// Errors raised while turning JSON input into a [`Value`](crate::Value).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The input at `path` is none of null, bool, integer, double, string,
    /// array or object.
    #[error("unrecognized JSON at {path}: {detail}")]
    UnrecognizedShape { path: Path, detail: String },

    /// Containers nested deeper than the configured limit.
    #[error("nesting deeper than {max_depth} at {path}")]
    DepthExceeded { path: Path, max_depth: usize },
}

impl DecodeError {
    /// Where in the input tree the failure occurred.
    pub fn path(&self) -> &Path {
        match self {
            DecodeError::UnrecognizedShape { path, .. } | DecodeError::DepthExceeded { path, .. } => {
                path
            }
        }
    }
}

/// Errors raised while turning a value into JSON.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// The value at `path` has no JSON representation (a byte blob, a NaN, an
    /// integer wider than 64 bits, a non-string map key, ...).
    #[error("cannot encode {kind} at {path}")]
    UnsupportedValue { path: Path, kind: String },

    /// Containers nested deeper than the configured limit.
    #[error("nesting deeper than {max_depth} at {path}")]
    DepthExceeded { path: Path, max_depth: usize },

    /// A `Serialize` implementation reported its own error.
    #[error("serialization failed at {path}: {message}")]
    Serialize { path: Path, message: String },
}

impl EncodeError {
    /// Where in the value tree the failure occurred.
    pub fn path(&self) -> &Path {
        match self {
            EncodeError::UnsupportedValue { path, .. }
            | EncodeError::DepthExceeded { path, .. }
            | EncodeError::Serialize { path, .. } => path,
        }
    }
}

/// Crate-level error for the envelope and tracker layers.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A value did not have the `{"schema": .., "data": ..}` shape, or the schema
    /// URI was malformed.
    #[error("invalid self-describing JSON: {0}")]
    Envelope(String),

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The emitter failed to write a payload.
    #[error("emitter failed: {0}")]
    Emit(#[from] std::io::Error),
}

/// Convenience alias used by the envelope and tracker layers.
pub type Result<T> = std::result::Result<T, Error>;
