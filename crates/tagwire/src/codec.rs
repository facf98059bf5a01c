// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged wire codec for single values.
//!
//! # Wire format
//!
//! | Tag | Name    | Payload                                               |
//! |-----|---------|-------------------------------------------------------|
//! | 0   | NULL    | none                                                  |
//! | 1   | BOOL    | 1 byte, `0` or `1`                                    |
//! | 2   | BYTE    | 1 byte                                                |
//! | 3   | SHORT   | 2 bytes                                               |
//! | 4   | INT     | 4 bytes                                               |
//! | 5   | LONG    | 8 bytes                                               |
//! | 6   | FLOAT   | 4 bytes (IEEE 754)                                    |
//! | 7   | DOUBLE  | 8 bytes (IEEE 754)                                    |
//! | 8   | CHAR    | 2 bytes (UTF-16 code unit)                            |
//! | 9   | STRING  | u32 byte length + UTF-8                               |
//! | 10  | UNKNOWN | u16 length + UTF-8 type name, 1 flag byte, u32 length + payload |
//!
//! All integers are big-endian. For `UNKNOWN`, a flag of `1` means the
//! payload is the UTF-8 text of a custom encoder; `0` means it is the generic
//! fallback representation of the object.

use crate::catalog::TypeCatalog;
use crate::config::{CodecConfig, MissingDecoderPolicy};
use crate::dispatch::DispatchTable;
use crate::error::{CodecError, CodecResult};
use crate::resolver;
use crate::ser::{Cursor, CursorMut, SerError};
use crate::tag::WireTag;
use crate::value::{Object, TypeName, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// Encodes and decodes [`Value`]s.
///
/// The codec holds no per-call state: one instance can serve any number of
/// threads, each with its own cursor.
///
/// # Example
///
/// ```
/// use tagwire::{Value, WireCodec};
///
/// let codec = WireCodec::default();
/// let bytes = codec.to_bytes(&Value::Int(42)).unwrap();
/// assert_eq!(bytes, [4, 0, 0, 0, 42]);
/// assert_eq!(codec.from_bytes(&bytes).unwrap(), Value::Int(42));
/// ```
#[derive(Debug, Clone)]
pub struct WireCodec {
    catalog: Arc<TypeCatalog>,
    table: Arc<DispatchTable>,
    config: CodecConfig,
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new(
            Arc::new(TypeCatalog::empty()),
            Arc::new(DispatchTable::new()),
            CodecConfig::default(),
        )
    }
}

impl WireCodec {
    pub fn new(catalog: Arc<TypeCatalog>, table: Arc<DispatchTable>, config: CodecConfig) -> Self {
        Self {
            catalog,
            table,
            config,
        }
    }

    /// Codec over `catalog` with an empty dispatch table and default config.
    pub fn with_catalog(catalog: TypeCatalog) -> Self {
        Self::new(
            Arc::new(catalog),
            Arc::new(DispatchTable::new()),
            CodecConfig::default(),
        )
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// Handler registry consulted for every `UNKNOWN` value.
    pub fn table(&self) -> &Arc<DispatchTable> {
        &self.table
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Append `value` to `out`.
    ///
    /// On error nothing is left behind: `out` is rewound to where the value
    /// started.
    pub fn encode(&self, value: &Value, out: &mut CursorMut<'_>) -> CodecResult<()> {
        let mark = out.offset();
        let result = self.encode_value(value, out);
        if result.is_err() {
            out.rewind(mark);
        }
        result
    }

    fn encode_value(&self, value: &Value, out: &mut CursorMut<'_>) -> CodecResult<()> {
        out.write_u8(WireTag::of(value).as_u8());
        match value {
            Value::Null => {}
            Value::Bool(v) => out.write_bool(*v),
            Value::Byte(v) => out.write_i8(*v),
            Value::Short(v) => out.write_i16_be(*v),
            Value::Int(v) => out.write_i32_be(*v),
            Value::Long(v) => out.write_i64_be(*v),
            Value::Float(v) => out.write_f32_be(*v),
            Value::Double(v) => out.write_f64_be(*v),
            Value::Char(unit) => out.write_u16_be(*unit),
            Value::String(s) => out.write_str_u32(s)?,
            Value::Object(object) => self.encode_object(object, out)?,
        }
        Ok(())
    }

    fn encode_object(&self, object: &Object, out: &mut CursorMut<'_>) -> CodecResult<()> {
        let type_name = object.type_name_shared();
        out.write_str_u16(type_name)?;

        let lineage: Cow<'_, [TypeName]> = match self.catalog.lineage(type_name) {
            Some(lineage) => Cow::Borrowed(lineage),
            None => {
                log::debug!(
                    "[codec] encoding undeclared type '{}' without ancestry",
                    type_name
                );
                Cow::Owned(resolver::detached_lineage(type_name))
            }
        };

        let handlers = self.table.snapshot();
        match resolver::closest(&lineage, &*handlers) {
            Some((registered, handler)) => {
                let text = handler.encode(object).map_err(|e| CodecError::Custom {
                    type_name: registered.to_string(),
                    reason: e.to_string(),
                })?;
                log::trace!(
                    "[codec] {} encoded by handler for {} ({} bytes)",
                    type_name,
                    registered,
                    text.len()
                );
                out.write_bool(true);
                out.write_bytes_u32(text.as_bytes())?;
            }
            None => {
                let bytes = object.to_fallback().map_err(|source| CodecError::Fallback {
                    type_name: type_name.to_string(),
                    source,
                })?;
                out.write_bool(false);
                out.write_bytes_u32(&bytes)?;
            }
        }
        Ok(())
    }

    /// Read one value from `input`.
    ///
    /// Format errors abandon the cursor (every later read fails). Resolution
    /// and handler errors are reported after the whole value was consumed, so
    /// the next value can still be read.
    pub fn decode(&self, input: &mut Cursor<'_>) -> CodecResult<Value> {
        let at = input.offset();
        let raw = input.read_u8()?;
        let Some(tag) = WireTag::from_u8(raw) else {
            input.fail(SerError::InvalidData {
                offset: at,
                reason: format!("unknown tag {}", raw),
            });
            return Err(CodecError::InvalidTag { offset: at, tag: raw });
        };

        let value = match tag {
            WireTag::Null => Value::Null,
            WireTag::Bool => Value::Bool(input.read_bool()?),
            WireTag::Byte => Value::Byte(input.read_i8()?),
            WireTag::Short => Value::Short(input.read_i16_be()?),
            WireTag::Int => Value::Int(input.read_i32_be()?),
            WireTag::Long => Value::Long(input.read_i64_be()?),
            WireTag::Float => Value::Float(input.read_f32_be()?),
            WireTag::Double => Value::Double(input.read_f64_be()?),
            WireTag::Char => Value::Char(input.read_u16_be()?),
            WireTag::String => Value::String(input.read_str_u32(self.config.max_string_len)?),
            WireTag::Unknown => self.decode_object(input)?,
        };
        Ok(value)
    }

    fn decode_object(&self, input: &mut Cursor<'_>) -> CodecResult<Value> {
        let type_name = input.read_str_u16()?;
        let custom_encoded = input.read_bool()?;
        let payload_at = input.offset();
        let payload = input.read_bytes_u32(self.config.max_payload_len)?;

        let Some(entry) = self.catalog.get(&type_name) else {
            log::debug!("[codec] unknown type '{}' on the wire", type_name);
            return Err(CodecError::UnknownType {
                type_name,
                custom_encoded,
                payload: payload.to_vec(),
            });
        };

        let handlers = self.table.snapshot();
        let handler = resolver::closest(entry.lineage(), &*handlers);

        if !custom_encoded {
            if let Some((registered, _)) = handler {
                log::debug!(
                    "[codec] {} sent without custom encoding; ignoring decoder for {}",
                    type_name,
                    registered
                );
            }
            return match entry.load(payload) {
                Some(Ok(object)) => Ok(Value::Object(object)),
                Some(Err(source)) => Err(CodecError::Fallback { type_name, source }),
                None => Err(CodecError::NotLoadable { type_name }),
            };
        }

        let text = match std::str::from_utf8(payload) {
            Ok(text) => text,
            Err(e) => {
                return Err(CodecError::Format(input.fail(SerError::InvalidData {
                    offset: payload_at,
                    reason: format!("custom payload of {} is not UTF-8: {}", type_name, e),
                })));
            }
        };

        match handler {
            Some((registered, handler)) => handler.decode(text).map_err(|e| CodecError::Custom {
                type_name: registered.to_string(),
                reason: e.to_string(),
            }),
            None => match self.config.missing_decoder {
                MissingDecoderPolicy::Fail => Err(CodecError::MissingDecoder { type_name }),
                MissingDecoderPolicy::WarnAndPassThrough => {
                    log::warn!(
                        "[codec] {} was custom-encoded but no decoder is registered; \
                         passing the raw text through",
                        type_name
                    );
                    Ok(Value::String(text.to_owned()))
                }
                MissingDecoderPolicy::PassThrough => Ok(Value::String(text.to_owned())),
            },
        }
    }

    /// Encode a single value into a fresh buffer.
    pub fn to_bytes(&self, value: &Value) -> CodecResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.encode(value, &mut CursorMut::new(&mut buffer))?;
        Ok(buffer)
    }

    /// Decode exactly one value; trailing bytes are a format error.
    pub fn from_bytes(&self, bytes: &[u8]) -> CodecResult<Value> {
        self.decode_to_end(&mut Cursor::new(bytes))
    }

    /// Decode one value that must end the input. Leftover bytes poison the
    /// cursor like any other format error.
    pub fn decode_to_end(&self, input: &mut Cursor<'_>) -> CodecResult<Value> {
        let value = self.decode(input)?;
        if !input.is_eof() {
            let trailing = SerError::InvalidData {
                offset: input.offset(),
                reason: format!("{} trailing bytes", input.remaining()),
            };
            return Err(CodecError::Format(input.fail(trailing)));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(codec: &WireCodec, value: Value) -> Value {
        let bytes = codec.to_bytes(&value).expect("encode");
        codec.from_bytes(&bytes).expect("decode")
    }

    #[test]
    fn test_int_scenario_bytes() {
        let codec = WireCodec::default();
        let bytes = codec.to_bytes(&Value::Int(42)).expect("encode");
        assert_eq!(bytes, vec![4, 0, 0, 0, 42]);
        assert_eq!(codec.from_bytes(&bytes).expect("decode"), Value::Int(42));
    }

    #[test]
    fn test_null_has_no_payload() {
        let codec = WireCodec::default();
        let bytes = codec.to_bytes(&Value::Null).expect("encode");
        assert_eq!(bytes, vec![0]);
        assert!(codec.from_bytes(&bytes).expect("decode").is_null());
    }

    #[test]
    fn test_integer_boundaries() {
        let codec = WireCodec::default();
        for value in [
            Value::Byte(i8::MIN),
            Value::Byte(i8::MAX),
            Value::Short(i16::MIN),
            Value::Short(i16::MAX),
            Value::Int(i32::MIN),
            Value::Int(i32::MAX),
            Value::Long(i64::MIN),
            Value::Long(i64::MAX),
            Value::Bool(false),
            Value::Bool(true),
            Value::Char(0),
            Value::Char(u16::MAX),
        ] {
            assert_eq!(round_trip(&codec, value.clone()), value);
        }
    }

    #[test]
    fn test_float_specials() {
        let codec = WireCodec::default();
        assert!(round_trip(&codec, Value::Float(f32::NAN))
            .as_f32()
            .expect("float")
            .is_nan());
        assert!(round_trip(&codec, Value::Double(f64::NAN))
            .as_f64()
            .expect("double")
            .is_nan());
        for value in [
            Value::Float(f32::INFINITY),
            Value::Float(f32::NEG_INFINITY),
            Value::Float(f32::MIN_POSITIVE),
            Value::Double(f64::INFINITY),
            Value::Double(f64::NEG_INFINITY),
            Value::Double(f64::MAX),
        ] {
            assert_eq!(round_trip(&codec, value.clone()), value);
        }
    }

    #[test]
    fn test_strings() {
        let codec = WireCodec::default();
        let bytes = codec.to_bytes(&Value::from("")).expect("encode");
        assert_eq!(bytes, vec![9, 0, 0, 0, 0]);

        let text = "gr\u{fc}\u{df} \u{1F980} \u{4E16}\u{754C}";
        assert_eq!(round_trip(&codec, Value::from(text)), Value::from(text));
    }

    #[test]
    fn test_invalid_tag_poisons_cursor() {
        let codec = WireCodec::default();
        let bytes = [11u8, 4, 0, 0, 0, 1];
        let mut cursor = Cursor::new(&bytes);
        let err = codec.decode(&mut cursor).unwrap_err();
        assert!(matches!(err, CodecError::InvalidTag { offset: 0, tag: 11 }));

        // The INT after the bad tag is never interpreted.
        let err = codec.decode(&mut cursor).unwrap_err();
        assert!(matches!(err, CodecError::Format(SerError::Poisoned { .. })));
    }

    #[test]
    fn test_truncated_payload() {
        let codec = WireCodec::default();
        let err = codec.from_bytes(&[5, 0, 0, 0]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_string_limit() {
        let config = CodecConfig::default().with_max_string_len(4);
        let codec = WireCodec::new(
            Arc::new(TypeCatalog::empty()),
            Arc::new(DispatchTable::new()),
            config,
        );
        let bytes = codec.to_bytes(&Value::from("too long")).expect("encode");
        assert!(codec.from_bytes(&bytes).unwrap_err().is_format_error());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let codec = WireCodec::default();
        let err = codec.from_bytes(&[0, 0]).unwrap_err();
        assert!(err.is_format_error());

        let mut input = Cursor::new(&[4, 0, 0, 0, 1, 9, 9]);
        let err = codec.decode_to_end(&mut input).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Format(SerError::InvalidData { offset: 5, .. })
        ));
        assert!(input.is_poisoned());
        assert!(codec.decode(&mut input).unwrap_err().is_format_error());
    }

    #[test]
    fn test_sequential_values_share_cursor() {
        let codec = WireCodec::default();
        let mut buffer = Vec::new();
        {
            let mut out = CursorMut::new(&mut buffer);
            codec.encode(&Value::Short(-2), &mut out).expect("short");
            codec.encode(&Value::Null, &mut out).expect("null");
            codec.encode(&Value::from("x"), &mut out).expect("string");
        }
        let mut input = Cursor::new(&buffer);
        assert_eq!(codec.decode(&mut input).expect("short"), Value::Short(-2));
        assert_eq!(codec.decode(&mut input).expect("null"), Value::Null);
        assert_eq!(codec.decode(&mut input).expect("string"), Value::from("x"));
        assert!(input.is_eof());
    }
}
