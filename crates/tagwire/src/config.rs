// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and codec configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: wire contract constants. Both ends of a deployment
//!   must agree on these; changing one is a wire-format break.
//! - **Level 2 (Dynamic)**: [`CodecConfig`] for per-codec policy (decode limits,
//!   configuration-mismatch handling).
//!
//! # Example
//!
//! ```
//! use tagwire::config::{CodecConfig, MissingDecoderPolicy};
//!
//! let config = CodecConfig::default()
//!     .with_missing_decoder(MissingDecoderPolicy::WarnAndPassThrough)
//!     .with_max_string_len(64 * 1024);
//! assert_eq!(config.max_string_len, 64 * 1024);
//! ```

use serde::Deserialize;
use std::fmt;

// =======================================================================
// Wire contract
// =======================================================================

/// Width of the `CHAR` payload: one UTF-16 code unit.
pub const CHAR_WIDTH: usize = 2;

/// Width of the `STRING` length prefix (UTF-8 byte count).
pub const STRING_PREFIX_WIDTH: usize = 4;

/// Width of the `UNKNOWN` type-name length prefix.
pub const TYPE_NAME_PREFIX_WIDTH: usize = 2;

/// Width of the `UNKNOWN` payload length prefix.
pub const PAYLOAD_PREFIX_WIDTH: usize = 4;

/// Name of the universal root type.
///
/// Every type implicitly descends from it; registering a handler under this
/// name makes it the last-resort candidate for every object.
pub const ROOT_TYPE: &str = "object";

// =======================================================================
// Runtime limits
// =======================================================================

/// Default upper bound for a decoded `STRING` (16 MiB).
pub const DEFAULT_MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Default upper bound for a decoded `UNKNOWN` payload (64 MiB).
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

/// Default number of retired slots a [`crate::ResultSlots`] table remembers
/// for late duplicate settles and late observers.
pub const DEFAULT_SETTLED_HISTORY: usize = 1024;

/// What the decoder does when the wire says a custom encoder produced the
/// payload but no decoder is registered locally for the type or any ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDecoderPolicy {
    /// Report [`crate::CodecError::MissingDecoder`].
    #[default]
    Fail,
    /// Log a warning and return the encoded text as `Value::String`.
    WarnAndPassThrough,
    /// Return the encoded text as `Value::String` without logging.
    PassThrough,
}

/// Per-codec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Largest `STRING` payload accepted by the decoder, in bytes.
    pub max_string_len: usize,
    /// Largest `UNKNOWN` payload accepted by the decoder, in bytes.
    pub max_payload_len: usize,
    /// Configuration-mismatch handling.
    pub missing_decoder: MissingDecoderPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            missing_decoder: MissingDecoderPolicy::default(),
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub fn with_max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }

    #[must_use]
    pub fn with_max_payload_len(mut self, len: usize) -> Self {
        self.max_payload_len = len;
        self
    }

    #[must_use]
    pub fn with_missing_decoder(mut self, policy: MissingDecoderPolicy) -> Self {
        self.missing_decoder = policy;
        self
    }

    /// Load a configuration from a YAML document.
    ///
    /// Missing keys keep their defaults.
    ///
    /// ```
    /// use tagwire::config::{CodecConfig, MissingDecoderPolicy};
    ///
    /// let config = CodecConfig::from_yaml_str("missing_decoder: pass_through\n").unwrap();
    /// assert_eq!(config.missing_decoder, MissingDecoderPolicy::PassThrough);
    /// ```
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every non-empty value undecodable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_string_len == 0 {
            return Err(ConfigError::Invalid("max_string_len must be > 0".into()));
        }
        if self.max_payload_len == 0 {
            return Err(ConfigError::Invalid("max_payload_len must be > 0".into()));
        }
        Ok(())
    }
}

/// Errors raised while loading or validating a [`CodecConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {}", msg),
            Self::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
