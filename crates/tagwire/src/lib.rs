// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # tagwire - tagged value codec for remote calls
//!
//! Ships values whose types are only known at run time across a remote
//! procedure call boundary, and hands asynchronous call outcomes from the
//! network thread to the call site.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use tagwire::{Remotable, TypeCatalog, TypeDecl, Value, WireCodec};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Point { x: i32, y: i32 }
//!
//! impl Remotable for Point {
//!     const TYPE_NAME: &'static str = "geo.Point";
//! }
//!
//! let catalog = TypeCatalog::builder()
//!     .declare(TypeDecl::interface("geo.Shape"))
//!     .declare(TypeDecl::of::<Point>().implements("geo.Shape"))
//!     .build()
//!     .unwrap();
//! let codec = WireCodec::with_catalog(catalog);
//!
//! // Custom text form for every geo.Shape.
//! codec.table().register(
//!     "geo.Shape",
//!     |o| {
//!         let p = o.downcast_ref::<Point>().ok_or("not a point")?;
//!         Ok(format!("{},{}", p.x, p.y))
//!     },
//!     |text| {
//!         let (x, y) = text.split_once(',').ok_or("no comma")?;
//!         let x = x.parse().map_err(|_| "bad x")?;
//!         let y = y.parse().map_err(|_| "bad y")?;
//!         Ok(Value::object(Point { x, y }))
//!     },
//! );
//!
//! let bytes = codec.to_bytes(&Value::object(Point { x: 1, y: 2 })).unwrap();
//! let back = codec.from_bytes(&bytes).unwrap();
//! assert_eq!(back.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                 remoting layer (not in this crate)          |
//! |    sockets | framing | proxies | call dispatch              |
//! +-------------------------------------------------------------+
//! |  message        InvokeArguments | AsyncCompletion | PendingRef
//! +-------------------------------------------------------------+
//! |  codec          WireCodec: tag byte + payload               |
//! |  dispatch       DispatchTable: type name -> encoder/decoder |
//! |  resolver       nearest registered ancestor                 |
//! |  catalog        declared types, precomputed lineages        |
//! +-------------------------------------------------------------+
//! |  ser            big-endian Cursor / CursorMut               |
//! +-------------------------------------------------------------+
//! |  slots          ResultSlots: settle / await_or_create       |
//! +-------------------------------------------------------------+
//! ```
//!
//! ## Features
//!
//! - `config-loaders` (default): [`CodecConfig::from_yaml_str`]
//! - `async`: [`Settlement::settled`] for tokio callers

/// Wire constants and codec configuration.
pub mod config;
/// Big-endian byte cursors.
pub mod ser;
/// Runtime values and type-erased objects.
pub mod value;
/// Wire tag set.
pub mod tag;
/// Declared type hierarchy.
pub mod catalog;
/// Ancestor search order and nearest-handler lookup.
pub mod resolver;
/// Custom encoder/decoder registry.
pub mod dispatch;
/// Codec error taxonomy.
pub mod error;
/// Value encoder/decoder.
pub mod codec;
/// Single-assignment outcome table.
pub mod slots;
/// Remote call message bodies.
pub mod message;

pub use catalog::{CatalogError, TypeCatalog, TypeCatalogBuilder, TypeDecl, TypeKind};
pub use codec::WireCodec;
pub use config::{CodecConfig, ConfigError, MissingDecoderPolicy, ROOT_TYPE};
pub use dispatch::{DispatchTable, HandlerError, TextSerializer};
pub use error::{CodecError, CodecResult};
pub use message::{AsyncCompletion, InvokeArguments, PendingRef, RemoteFault};
pub use ser::{Cursor, CursorMut, SerError, SerResult};
pub use slots::{ResultSlots, Settlement, SlotId};
pub use tag::WireTag;
pub use value::{Object, Remotable, TypeName, Value};

#[cfg(test)]
mod tests;
