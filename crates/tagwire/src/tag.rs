// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire tags.
//!
//! The discriminant of each tag is its on-wire ordinal. Reordering the
//! variants breaks every peer built against the previous order.

use crate::value::Value;
use std::fmt;

/// Identifies the encoding of the bytes that follow it.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireTag {
    Null = 0,
    Bool = 1,
    Byte = 2,
    Short = 3,
    Int = 4,
    Long = 5,
    Float = 6,
    Double = 7,
    Char = 8,
    String = 9,
    Unknown = 10,
}

impl WireTag {
    pub const ALL: [WireTag; 11] = [
        WireTag::Null,
        WireTag::Bool,
        WireTag::Byte,
        WireTag::Short,
        WireTag::Int,
        WireTag::Long,
        WireTag::Float,
        WireTag::Double,
        WireTag::Char,
        WireTag::String,
        WireTag::Unknown,
    ];

    /// Tag for a value, by exact variant. Objects are always `Unknown`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => WireTag::Null,
            Value::Bool(_) => WireTag::Bool,
            Value::Byte(_) => WireTag::Byte,
            Value::Short(_) => WireTag::Short,
            Value::Int(_) => WireTag::Int,
            Value::Long(_) => WireTag::Long,
            Value::Float(_) => WireTag::Float,
            Value::Double(_) => WireTag::Double,
            Value::Char(_) => WireTag::Char,
            Value::String(_) => WireTag::String,
            Value::Object(_) => WireTag::Unknown,
        }
    }

    pub fn from_u8(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Size of the fixed-width payload, `None` for variable-size tags.
    pub fn fixed_payload_len(self) -> Option<usize> {
        match self {
            WireTag::Null => Some(0),
            WireTag::Bool | WireTag::Byte => Some(1),
            WireTag::Short => Some(2),
            WireTag::Char => Some(crate::config::CHAR_WIDTH),
            WireTag::Int | WireTag::Float => Some(4),
            WireTag::Long | WireTag::Double => Some(8),
            WireTag::String | WireTag::Unknown => None,
        }
    }
}

impl fmt::Display for WireTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireTag::Null => "NULL",
            WireTag::Bool => "BOOL",
            WireTag::Byte => "BYTE",
            WireTag::Short => "SHORT",
            WireTag::Int => "INT",
            WireTag::Long => "LONG",
            WireTag::Float => "FLOAT",
            WireTag::Double => "DOUBLE",
            WireTag::Char => "CHAR",
            WireTag::String => "STRING",
            WireTag::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}
