// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for codec operations.

use crate::ser::SerError;
use std::fmt;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a value.
///
/// Variants fall in three groups:
/// - format errors (`Format`, `InvalidTag`): the stream is corrupt and the
///   cursor is abandoned,
/// - resolution errors (`UnknownType`): the peer sent a type this process
///   does not declare; the caller may degrade instead of failing the session,
/// - configuration mismatches (`MissingDecoder`, `NotLoadable`) and handler
///   failures (`Custom`, `Fallback`).
#[derive(Debug)]
pub enum CodecError {
    /// Truncated payload, bad length prefix, invalid UTF-8, ...
    Format(SerError),

    /// Tag byte outside the known ordinals.
    InvalidTag { offset: usize, tag: u8 },

    /// Type name on the wire is not declared in the local catalog.
    ///
    /// The whole value was consumed, so the cursor stays usable; the raw
    /// payload is handed back for callers that prefer to degrade.
    UnknownType {
        type_name: String,
        custom_encoded: bool,
        payload: Vec<u8>,
    },

    /// Payload was produced by a custom encoder but no decoder is registered
    /// for the type or any of its ancestors.
    MissingDecoder { type_name: String },

    /// Fallback payload names a type that cannot be instantiated
    /// (abstract class or interface).
    NotLoadable { type_name: String },

    /// A registered encoder or decoder failed.
    Custom { type_name: String, reason: String },

    /// Generic fallback (de)serialization failed.
    Fallback {
        type_name: String,
        source: serde_json::Error,
    },
}

impl CodecError {
    /// `true` for errors that leave the stream unreadable.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_) | Self::InvalidTag { .. })
    }

    /// `true` when the peer sent a type unknown to this process.
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, Self::UnknownType { .. })
    }

    /// Type name of the value that failed, if the error concerns an object.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Format(_) | Self::InvalidTag { .. } => None,
            Self::UnknownType { type_name, .. }
            | Self::MissingDecoder { type_name }
            | Self::NotLoadable { type_name }
            | Self::Custom { type_name, .. }
            | Self::Fallback { type_name, .. } => Some(type_name),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(e) => write!(f, "corrupt stream: {}", e),
            Self::InvalidTag { offset, tag } => {
                write!(f, "corrupt stream: unknown tag {} at offset {}", tag, offset)
            }
            Self::UnknownType { type_name, .. } => {
                write!(f, "unknown type on the wire: {}", type_name)
            }
            Self::MissingDecoder { type_name } => write!(
                f,
                "{} was written by a custom encoder but no decoder is registered",
                type_name
            ),
            Self::NotLoadable { type_name } => {
                write!(f, "type {} cannot be instantiated", type_name)
            }
            Self::Custom { type_name, reason } => {
                write!(f, "custom handler for {} failed: {}", type_name, reason)
            }
            Self::Fallback { type_name, source } => {
                write!(f, "fallback serialization of {} failed: {}", type_name, source)
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Format(e) => Some(e),
            Self::Fallback { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SerError> for CodecError {
    fn from(e: SerError) -> Self {
        Self::Format(e)
    }
}
