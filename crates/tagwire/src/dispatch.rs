// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type dispatch table: custom text encoders/decoders keyed by type name.
//!
//! Handlers are registered per *declared* type. An object whose runtime type
//! is a subtype or implementor of a registered type is routed to that handler
//! by the hierarchy resolver.
//!
//! # Concurrency
//!
//! The table is an immutable map behind `ArcSwap`. `register` and `clear`
//! publish a new map (copy-on-write); an encode or decode in flight keeps the
//! snapshot it loaded and sees either the old or the new entry, never a torn
//! one. Re-registering a name overwrites the previous handler (last write wins).

use crate::value::{Object, Remotable, TypeName, Value};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Failure reported by a user-supplied encoder or decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Object -> text.
pub type Encoder = Arc<dyn Fn(&Object) -> Result<String, HandlerError> + Send + Sync>;

/// Text -> value.
pub type Decoder = Arc<dyn Fn(&str) -> Result<Value, HandlerError> + Send + Sync>;

/// Encoder/decoder pair as one object.
pub trait TextSerializer: Send + Sync + 'static {
    fn serialize(&self, object: &Object) -> Result<String, HandlerError>;
    fn deserialize(&self, text: &str) -> Result<Value, HandlerError>;
}

/// A registered encoder/decoder pair.
#[derive(Clone)]
pub struct Handler {
    encoder: Encoder,
    decoder: Decoder,
}

impl Handler {
    pub fn new(encoder: Encoder, decoder: Decoder) -> Self {
        Self { encoder, decoder }
    }

    pub fn encode(&self, object: &Object) -> Result<String, HandlerError> {
        (self.encoder)(object)
    }

    pub fn decode(&self, text: &str) -> Result<Value, HandlerError> {
        (self.decoder)(text)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// Snapshot of the table at one point in time.
pub type HandlerMap = HashMap<TypeName, Arc<Handler>>;

/// Registry of custom handlers, owned by a codec (or shared by several).
pub struct DispatchTable {
    handlers: ArcSwap<HandlerMap>,
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            handlers: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Register `encoder`/`decoder` for `type_name`, replacing any previous pair.
    pub fn register<E, D>(&self, type_name: impl AsRef<str>, encoder: E, decoder: D)
    where
        E: Fn(&Object) -> Result<String, HandlerError> + Send + Sync + 'static,
        D: Fn(&str) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.insert(
            Arc::from(type_name.as_ref()),
            Handler::new(Arc::new(encoder), Arc::new(decoder)),
        );
    }

    /// Register a [`TextSerializer`] for `type_name`.
    pub fn register_serializer<S: TextSerializer>(&self, type_name: impl AsRef<str>, serializer: S) {
        let serializer = Arc::new(serializer);
        let for_decode = serializer.clone();
        self.register(
            type_name,
            move |object: &Object| serializer.serialize(object),
            move |text: &str| for_decode.deserialize(text),
        );
    }

    /// Register typed handlers for exactly `T`.
    ///
    /// The encoder is only applicable to objects whose runtime type is `T`;
    /// other objects routed here (subtypes) fail with a [`HandlerError`].
    pub fn register_typed<T, E, D>(&self, encoder: E, decoder: D)
    where
        T: Remotable,
        E: Fn(&T) -> Result<String, HandlerError> + Send + Sync + 'static,
        D: Fn(&str) -> Result<T, HandlerError> + Send + Sync + 'static,
    {
        self.register(
            T::TYPE_NAME,
            move |object: &Object| match object.downcast_ref::<T>() {
                Some(value) => encoder(value),
                None => Err(HandlerError::new(format!(
                    "encoder for {} cannot encode {}",
                    T::TYPE_NAME,
                    object.type_name()
                ))),
            },
            move |text: &str| decoder(text).map(Value::object),
        );
    }

    fn insert(&self, type_name: TypeName, handler: Handler) {
        let handler = Arc::new(handler);
        let previous = self.handlers.rcu(|current| {
            let mut next = HandlerMap::clone(current);
            next.insert(type_name.clone(), handler.clone());
            next
        });
        if previous.contains_key(&type_name) {
            log::debug!("[dispatch] replaced handler for '{}'", type_name);
        } else {
            log::debug!("[dispatch] registered handler for '{}'", type_name);
        }
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.handlers.store(Arc::new(HashMap::new()));
        log::debug!("[dispatch] cleared");
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.handlers.load().contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.handlers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.load().is_empty()
    }

    /// Current map. Later registrations do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<HandlerMap> {
        self.handlers.load_full()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.handlers.load();
        let mut names: Vec<&str> = snapshot.keys().map(|k| &**k).collect();
        names.sort_unstable();
        f.debug_struct("DispatchTable")
            .field("types", &names)
            .finish()
    }
}
