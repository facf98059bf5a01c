// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hierarchy resolution: nearest registered ancestor of a type.
//!
//! Resolution is split in two steps so each can be tested in isolation:
//!
//! 1. [`compute_lineage`] flattens a type's ancestry into its search order.
//!    [`crate::TypeCatalog`] runs it once per type at build time.
//! 2. [`closest`] scans a lineage against a handler map and returns the first
//!    registered entry.
//!
//! # Search order
//!
//! ```text
//! Leaf -> Node -> Base          superclass chain, self first, root excluded
//!      -> Visitable, Shape      interfaces of Leaf (declaration order)
//!      -> Drawable              interfaces of those interfaces, level by level
//!      -> object                universal root, last resort
//! ```
//!
//! A superclass always beats an interface whatever the depth; among
//! interfaces, the shallower breadth-first level wins. Only the interfaces
//! declared by the type itself (and their super-interfaces) are walked,
//! not those declared by its superclasses.

use crate::catalog::{CatalogError, TypeDecl};
use crate::config::ROOT_TYPE;
use crate::value::TypeName;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Search order for `name`, ending with [`ROOT_TYPE`].
///
/// `decls` must contain `name`. References to undeclared types and cyclic
/// superclass chains are rejected.
pub fn compute_lineage(
    name: &TypeName,
    decls: &HashMap<TypeName, TypeDecl>,
) -> Result<Vec<TypeName>, CatalogError> {
    let mut lineage: Vec<TypeName> = Vec::new();
    let mut seen: HashSet<TypeName> = HashSet::new();

    // 1. Superclass chain.
    let mut current = Some(name.clone());
    let mut referrer = name.clone();
    while let Some(type_name) = current {
        if !seen.insert(type_name.clone()) {
            return Err(CatalogError::Cycle {
                name: type_name.to_string(),
            });
        }
        let decl = lookup(decls, &referrer, &type_name)?;
        current = decl.superclass().cloned();
        lineage.push(type_name.clone());
        referrer = type_name;
    }

    // 2. Interfaces, breadth-first from the type itself.
    let mut queue: VecDeque<TypeName> = VecDeque::new();
    let mut visited: HashSet<TypeName> = HashSet::new();
    visited.insert(name.clone());
    queue.push_back(name.clone());
    while let Some(next) = queue.pop_front() {
        let decl = lookup(decls, name, &next)?;
        for iface in decl.interfaces() {
            if visited.insert(iface.clone()) {
                lookup(decls, &next, iface)?;
                lineage.push(iface.clone());
                queue.push_back(iface.clone());
            }
        }
    }

    // 3. Universal root.
    lineage.push(Arc::from(ROOT_TYPE));
    Ok(lineage)
}

fn lookup<'d>(
    decls: &'d HashMap<TypeName, TypeDecl>,
    referenced_by: &TypeName,
    target: &TypeName,
) -> Result<&'d TypeDecl, CatalogError> {
    decls
        .get(target)
        .ok_or_else(|| CatalogError::UndeclaredType {
            name: target.to_string(),
            referenced_by: referenced_by.to_string(),
        })
}

/// Lineage for a type the catalog does not know: itself, then the root.
pub fn detached_lineage(name: &TypeName) -> Vec<TypeName> {
    vec![name.clone(), Arc::from(ROOT_TYPE)]
}

/// First entry of `lineage` present in `handlers`.
pub fn closest<'a, H>(
    lineage: &'a [TypeName],
    handlers: &'a HashMap<TypeName, H>,
) -> Option<(&'a TypeName, &'a H)> {
    lineage
        .iter()
        .find_map(|candidate| handlers.get(candidate).map(|h| (candidate, h)))
}
