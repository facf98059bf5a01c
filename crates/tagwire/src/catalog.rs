// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type catalog: declared type hierarchy and type-name resolution.
//!
//! The catalog answers two questions for the codec:
//!
//! - which types does a wire type name resolve to locally (a name missing
//!   from the catalog is a resolution error), and
//! - in which order must a type's ancestors be searched for a handler
//!   (the lineage, precomputed at [`TypeCatalogBuilder::build`]).
//!
//! Concrete types are declared from their Rust type and can be rebuilt from
//! the generic fallback representation. Abstract classes and interfaces are
//! declared by name only.
//!
//! # Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use tagwire::{Remotable, TypeCatalog, TypeDecl};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Leaf { id: u32 }
//!
//! impl Remotable for Leaf {
//!     const TYPE_NAME: &'static str = "tree.Leaf";
//! }
//!
//! let catalog = TypeCatalog::builder()
//!     .declare(TypeDecl::interface("tree.Visitable"))
//!     .declare(TypeDecl::class("tree.Node").implements("tree.Visitable"))
//!     .declare(TypeDecl::of::<Leaf>().extends("tree.Node"))
//!     .build()
//!     .unwrap();
//!
//! let lineage: Vec<&str> = catalog
//!     .lineage("tree.Leaf")
//!     .unwrap()
//!     .iter()
//!     .map(|n| &**n)
//!     .collect();
//! assert_eq!(lineage, ["tree.Leaf", "tree.Node", "object"]);
//! ```

use crate::config::ROOT_TYPE;
use crate::resolver;
use crate::value::{Object, Remotable, TypeName};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Rebuilds an object from its fallback representation.
pub type FallbackLoader = fn(&[u8]) -> Result<Object, serde_json::Error>;

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Instantiable type backed by a [`Remotable`] Rust type.
    Concrete,
    /// Class that is never instantiated directly (only through subtypes).
    Abstract,
    Interface,
}

/// Declaration of one type and its direct ancestors.
#[derive(Clone)]
pub struct TypeDecl {
    name: TypeName,
    kind: TypeKind,
    superclass: Option<TypeName>,
    interfaces: Vec<TypeName>,
    loader: Option<FallbackLoader>,
}

fn load_fallback<T: Remotable>(bytes: &[u8]) -> Result<Object, serde_json::Error> {
    serde_json::from_slice::<T>(bytes).map(Object::new)
}

impl TypeDecl {
    /// Concrete type backed by `T`.
    pub fn of<T: Remotable>() -> Self {
        Self {
            name: Arc::from(T::TYPE_NAME),
            kind: TypeKind::Concrete,
            superclass: None,
            interfaces: Vec::new(),
            loader: Some(load_fallback::<T>),
        }
    }

    /// Abstract class, known by name only.
    pub fn class(name: impl AsRef<str>) -> Self {
        Self::named(name, TypeKind::Abstract)
    }

    pub fn interface(name: impl AsRef<str>) -> Self {
        Self::named(name, TypeKind::Interface)
    }

    fn named(name: impl AsRef<str>, kind: TypeKind) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            loader: None,
        }
    }

    /// Set the direct superclass.
    #[must_use]
    pub fn extends(mut self, superclass: impl AsRef<str>) -> Self {
        self.superclass = Some(Arc::from(superclass.as_ref()));
        self
    }

    /// Append a directly implemented interface (order matters).
    ///
    /// For an interface, this declares a super-interface.
    #[must_use]
    pub fn implements(mut self, interface: impl AsRef<str>) -> Self {
        self.interfaces.push(Arc::from(interface.as_ref()));
        self
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn superclass(&self) -> Option<&TypeName> {
        self.superclass.as_ref()
    }

    pub fn interfaces(&self) -> &[TypeName] {
        &self.interfaces
    }
}

impl fmt::Debug for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDecl")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("superclass", &self.superclass)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

/// Errors raised while building a [`TypeCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The same name was declared twice.
    Duplicate { name: String },
    /// The universal root is implicit and cannot be declared.
    ReservedName { name: String },
    UndeclaredType { name: String, referenced_by: String },
    /// Superclass chain loops back on itself.
    Cycle { name: String },
    /// Superclass is an interface, or an interface declares a superclass.
    InvalidSuperclass { name: String, superclass: String },
    /// An interface lists a class among its super-interfaces.
    NotAnInterface { name: String, referenced_by: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate { name } => write!(f, "type '{}' declared twice", name),
            Self::ReservedName { name } => write!(f, "type name '{}' is reserved", name),
            Self::UndeclaredType {
                name,
                referenced_by,
            } => write!(
                f,
                "type '{}' referenced by '{}' is not declared",
                name, referenced_by
            ),
            Self::Cycle { name } => write!(f, "superclass cycle through '{}'", name),
            Self::InvalidSuperclass { name, superclass } => write!(
                f,
                "'{}' cannot have '{}' as superclass",
                name, superclass
            ),
            Self::NotAnInterface {
                name,
                referenced_by,
            } => write!(
                f,
                "'{}' is implemented by '{}' but is not an interface",
                name, referenced_by
            ),
        }
    }
}

impl std::error::Error for CatalogError {}

/// A declared type with its precomputed search order.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    decl: TypeDecl,
    lineage: Arc<[TypeName]>,
}

impl CatalogEntry {
    pub fn decl(&self) -> &TypeDecl {
        &self.decl
    }

    /// Self, superclasses, interfaces breadth-first, root.
    pub fn lineage(&self) -> &Arc<[TypeName]> {
        &self.lineage
    }

    /// Rebuild an instance from its fallback bytes.
    ///
    /// `None` for abstract classes and interfaces.
    pub fn load(&self, bytes: &[u8]) -> Option<Result<Object, serde_json::Error>> {
        self.decl.loader.map(|loader| loader(bytes))
    }
}

/// Immutable set of declared types, shared between codecs through `Arc`.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    entries: HashMap<TypeName, CatalogEntry>,
}

impl TypeCatalog {
    pub fn builder() -> TypeCatalogBuilder {
        TypeCatalogBuilder::default()
    }

    /// Catalog with no declared types.
    ///
    /// Objects can still be encoded; decoding any `UNKNOWN` value fails with
    /// an unknown-type error.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn lineage(&self, name: &str) -> Option<&[TypeName]> {
        self.entries.get(name).map(|e| &*e.lineage)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reopen the catalog to declare more types.
    pub fn to_builder(&self) -> TypeCatalogBuilder {
        TypeCatalogBuilder {
            decls: self
                .entries
                .values()
                .map(|entry| entry.decl.clone())
                .collect(),
        }
    }
}

/// Collects declarations; validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct TypeCatalogBuilder {
    decls: Vec<TypeDecl>,
}

impl TypeCatalogBuilder {
    #[must_use]
    pub fn declare(mut self, decl: TypeDecl) -> Self {
        self.decls.push(decl);
        self
    }

    /// Shorthand for a concrete type without declared ancestors.
    #[must_use]
    pub fn concrete<T: Remotable>(self) -> Self {
        self.declare(TypeDecl::of::<T>())
    }

    pub fn build(self) -> Result<TypeCatalog, CatalogError> {
        let mut decls: HashMap<TypeName, TypeDecl> = HashMap::with_capacity(self.decls.len());
        for decl in self.decls {
            if &*decl.name == ROOT_TYPE {
                return Err(CatalogError::ReservedName {
                    name: decl.name.to_string(),
                });
            }
            if decls.contains_key(&decl.name) {
                return Err(CatalogError::Duplicate {
                    name: decl.name.to_string(),
                });
            }
            decls.insert(decl.name.clone(), decl);
        }

        for decl in decls.values() {
            check_shape(decl, &decls)?;
        }

        let mut entries = HashMap::with_capacity(decls.len());
        for (name, decl) in &decls {
            let lineage = resolver::compute_lineage(name, &decls)?;
            entries.insert(
                name.clone(),
                CatalogEntry {
                    decl: decl.clone(),
                    lineage: Arc::from(lineage),
                },
            );
        }

        log::debug!("[catalog] built with {} types", entries.len());
        Ok(TypeCatalog { entries })
    }
}

/// Superclasses must be classes; interface lists must name interfaces.
fn check_shape(decl: &TypeDecl, decls: &HashMap<TypeName, TypeDecl>) -> Result<(), CatalogError> {
    if let Some(superclass) = &decl.superclass {
        let invalid = decl.kind == TypeKind::Interface
            || decls
                .get(superclass)
                .is_some_and(|s| s.kind == TypeKind::Interface);
        if invalid {
            return Err(CatalogError::InvalidSuperclass {
                name: decl.name.to_string(),
                superclass: superclass.to_string(),
            });
        }
    }
    for iface in &decl.interfaces {
        if decls
            .get(iface)
            .is_some_and(|i| i.kind != TypeKind::Interface)
        {
            return Err(CatalogError::NotAnInterface {
                name: iface.to_string(),
                referenced_by: decl.name.to_string(),
            });
        }
    }
    Ok(())
}
