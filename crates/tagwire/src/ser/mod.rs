// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte cursors and low-level serialization errors.
//!
//! All multi-byte fields are big-endian (see [`crate::config`]).

pub mod cursor;

pub use cursor::{Cursor, CursorMut};

use std::fmt;

/// Serialization error raised by the cursors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerError {
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    InvalidData { offset: usize, reason: String },
    /// A previous read failed; the cursor must be abandoned.
    Poisoned { offset: usize },
}

impl SerError {
    /// Offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            SerError::WriteFailed { offset, .. }
            | SerError::ReadFailed { offset, .. }
            | SerError::InvalidData { offset, .. }
            | SerError::Poisoned { offset } => *offset,
        }
    }
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            SerError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            SerError::InvalidData { offset, reason } => {
                write!(f, "invalid data at offset {}: {}", offset, reason)
            }
            SerError::Poisoned { offset } => {
                write!(f, "cursor abandoned after failed read at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for SerError {}

pub type SerResult<T> = core::result::Result<T, SerError>;
