// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message bodies built from codec values.
//!
//! Framing (message type, sequence number, session) belongs to the remoting
//! layer; these types only cover the bodies that are sequences of values.
//!
//! - [`InvokeArguments`]: `i32` argument count, then each argument.
//! - [`AsyncCompletion`]: thrown value (or `NULL`), then the return value.
//! - [`PendingRef`]: stands in for an asynchronous return value that is not
//!   complete yet; the outcome follows later as an [`AsyncCompletion`]
//!   carrying the same id.

use crate::codec::WireCodec;
use crate::error::{CodecError, CodecResult};
use crate::ser::{Cursor, CursorMut, SerError};
use crate::slots::{ResultSlots, Settlement, SlotId};
use crate::value::{Object, Remotable, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arguments of a remote method invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeArguments {
    pub args: Vec<Value>,
}

impl InvokeArguments {
    pub fn new(args: Vec<Value>) -> Self {
        Self { args }
    }

    pub fn encode(&self, codec: &WireCodec, out: &mut CursorMut<'_>) -> CodecResult<()> {
        let count = i32::try_from(self.args.len()).map_err(|_| {
            CodecError::Format(SerError::WriteFailed {
                offset: out.offset(),
                reason: format!("{} arguments exceed i32 count", self.args.len()),
            })
        })?;

        let mark = out.offset();
        out.write_i32_be(count);
        for arg in &self.args {
            if let Err(e) = codec.encode(arg, out) {
                out.rewind(mark);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Decode the argument list.
    ///
    /// Every argument is consumed even when one fails to resolve; the first
    /// resolution error is returned once the whole body was read.
    pub fn decode(codec: &WireCodec, input: &mut Cursor<'_>) -> CodecResult<Self> {
        let at = input.offset();
        let count = input.read_i32_be()?;
        // Each value takes at least its tag byte.
        let count = usize::try_from(count)
            .ok()
            .filter(|&n| n <= input.remaining())
            .ok_or_else(|| {
                CodecError::Format(input.fail(SerError::InvalidData {
                    offset: at,
                    reason: format!("invalid argument count {}", count),
                }))
            })?;

        let mut args = Vec::with_capacity(count);
        let mut deferred: Option<CodecError> = None;
        for _ in 0..count {
            match codec.decode(input) {
                Ok(value) => args.push(value),
                Err(e) if e.is_format_error() => return Err(e),
                Err(e) => {
                    log::debug!("[message] argument {} unresolved: {}", args.len(), e);
                    deferred.get_or_insert(e);
                    args.push(Value::Null);
                }
            }
        }
        match deferred {
            Some(e) => Err(e),
            None => Ok(Self { args }),
        }
    }
}

/// Failure side of an asynchronous outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteFault {
    /// The remote computation failed with this error object.
    Thrown(Object),
    /// The peer reported a failure value that is not an object.
    NotAnError(Value),
    /// The completion carried an object this process cannot rebuild.
    Unresolved { type_name: String },
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thrown(object) => write!(f, "remote computation failed: {:?}", object),
            Self::NotAnError(value) => {
                write!(f, "remote failure is not an error object: {:?}", value)
            }
            Self::Unresolved { type_name } => {
                write!(f, "remote outcome carries unresolvable type {}", type_name)
            }
        }
    }
}

impl std::error::Error for RemoteFault {}

/// Body of an "asynchronous computation finished" message.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncCompletion {
    /// Outstanding id announced earlier through a [`PendingRef`].
    pub id: SlotId,
    pub thrown: Value,
    pub return_value: Value,
    /// Type name of a thrown or returned object that did not decode here.
    pub unresolved: Option<String>,
}

impl AsyncCompletion {
    pub fn success(id: SlotId, value: Value) -> Self {
        Self {
            id,
            thrown: Value::Null,
            return_value: value,
            unresolved: None,
        }
    }

    pub fn failure(id: SlotId, error: Object) -> Self {
        Self {
            id,
            thrown: Value::Object(error),
            return_value: Value::Null,
            unresolved: None,
        }
    }

    pub fn encode(&self, codec: &WireCodec, out: &mut CursorMut<'_>) -> CodecResult<()> {
        let mark = out.offset();
        codec.encode(&self.thrown, out)?;
        if let Err(e) = codec.encode(&self.return_value, out) {
            out.rewind(mark);
            return Err(e);
        }
        Ok(())
    }

    /// Decode a body whose id was carried by the message frame.
    ///
    /// Both values are always consumed. A value that fails to resolve is
    /// replaced by `NULL` and its type name kept in
    /// [`unresolved`](Self::unresolved), so the completion still settles its
    /// slot. Only format errors are returned.
    pub fn decode(codec: &WireCodec, id: SlotId, input: &mut Cursor<'_>) -> CodecResult<Self> {
        let mut unresolved = None;
        let mut next = |input: &mut Cursor<'_>| match codec.decode(input) {
            Ok(value) => Ok(value),
            Err(e) => match e.type_name() {
                Some(type_name) => {
                    log::debug!("[message] completion {} value unresolved: {}", id, e);
                    unresolved.get_or_insert_with(|| type_name.to_string());
                    Ok(Value::Null)
                }
                None => Err(e),
            },
        };
        let thrown = next(input)?;
        let return_value = next(input)?;
        Ok(Self {
            id,
            thrown,
            return_value,
            unresolved,
        })
    }

    pub fn into_outcome(self) -> Result<Value, RemoteFault> {
        if let Some(type_name) = self.unresolved {
            log::warn!(
                "[message] completion {} carries unresolvable type {}",
                self.id,
                type_name
            );
            return Err(RemoteFault::Unresolved { type_name });
        }
        match self.thrown {
            Value::Null => Ok(self.return_value),
            Value::Object(error) => Err(RemoteFault::Thrown(error)),
            other => {
                log::warn!(
                    "[message] completion {} reports a non-object failure: {:?}",
                    self.id,
                    other
                );
                Err(RemoteFault::NotAnError(other))
            }
        }
    }
}

/// Placeholder for an asynchronous return value.
///
/// Declare it in the catalog (`.concrete::<PendingRef>()`) on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRef {
    pub outstanding_id: SlotId,
}

impl Remotable for PendingRef {
    const TYPE_NAME: &'static str = "tagwire.PendingRef";
}

impl PendingRef {
    pub fn new(outstanding_id: SlotId) -> Self {
        Self { outstanding_id }
    }

    /// Consumer handle for the outcome this placeholder stands for.
    pub fn resolve(&self, slots: &ResultSlots<Value, RemoteFault>) -> Settlement<Value, RemoteFault> {
        slots.await_or_create(self.outstanding_id)
    }
}

impl ResultSlots<Value, RemoteFault> {
    /// Settle the slot named by `completion`. Returns `false` if it was
    /// already settled.
    pub fn publish(&self, completion: AsyncCompletion) -> bool {
        let id = completion.id;
        self.settle(id, completion.into_outcome())
    }
}
