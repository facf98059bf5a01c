// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values shipped across the remoting boundary.
//!
//! A [`Value`] is either one of the primitive kinds the wire encodes directly
//! or an [`Object`]: a type-erased application value carrying its runtime type
//! identity.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Stable, process-independent name of a type (its runtime type identity).
pub type TypeName = Arc<str>;

/// An application type that can travel as an `UNKNOWN` value.
///
/// `TYPE_NAME` is written on the wire and must name the same type on both
/// ends. The serde bounds provide the generic fallback representation used
/// when no custom encoder is registered for the type or its ancestors.
pub trait Remotable:
    Any + fmt::Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned
{
    const TYPE_NAME: &'static str;
}

trait ErasedObject: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_erased(&self, other: &dyn ErasedObject) -> bool;
    fn to_fallback(&self) -> Result<Vec<u8>, serde_json::Error>;
    fn to_json(&self) -> Result<String, serde_json::Error>;
}

impl<T: Remotable> ErasedObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_erased(&self, other: &dyn ErasedObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn to_fallback(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Type-erased application value.
///
/// Cloning is an `Arc` increment; two objects compare equal when they hold
/// equal values of the same concrete type.
#[derive(Clone)]
pub struct Object {
    type_name: TypeName,
    inner: Arc<dyn ErasedObject>,
}

impl Object {
    pub fn new<T: Remotable>(value: T) -> Self {
        Self {
            type_name: Arc::from(T::TYPE_NAME),
            inner: Arc::new(value),
        }
    }

    /// Runtime type identity of the held value.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn type_name_shared(&self) -> &TypeName {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_any().is::<T>()
    }

    /// Generic fallback representation (a serde_json document).
    pub fn to_fallback(&self) -> Result<Vec<u8>, serde_json::Error> {
        self.inner.to_fallback()
    }

    /// Fallback representation as text, handy for custom text encoders.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.inner.to_json()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.type_name, self.inner)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.inner.eq_erased(other.inner.as_ref())
    }
}

/// A value that can be written by the wire codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// One UTF-16 code unit.
    Char(u16),
    String(String),
    Object(Object),
}

impl Value {
    /// Wrap an application value.
    pub fn object<T: Remotable>(value: T) -> Self {
        Self::Object(Object::new(value))
    }

    /// `CHAR` value for a character of the Basic Multilingual Plane.
    ///
    /// Returns `None` for characters that need a surrogate pair.
    pub fn try_char(c: char) -> Option<Self> {
        u16::try_from(u32::from(c)).ok().map(Self::Char)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Self::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Self::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// The character, unless the code unit is a lone surrogate.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(unit) => char::from_u32(u32::from(*unit)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the application value if this is an object of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object().and_then(Object::downcast_ref::<T>)
    }
}

// Conversion traits
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
