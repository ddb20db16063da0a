//! Namespace to file/package resolution.
//!
//! The compiler consumes namespace lookups through [`NamespaceResolver`]. The
//! [`DefaultResolver`] derives everything from a namespace's dotted full name:
//!
//! | full name        | package          | flat path              | structured path        |
//! |------------------|------------------|------------------------|------------------------|
//! | `Bnet.Protocol`  | `bnet.protocol`  | `bnet.protocol.proto`  | `bnet/protocol.proto`  |

use crate::error::{Error, Result};
use crate::ir::{Class, Namespace, TypeNode};
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// File extension appended to every resolved path
pub const PROTO_EXTENSION: &str = ".proto";

/// Namespace full name to relative output path, forward-slash separated.
///
/// Iteration is in byte order of the namespace full name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespacePaths {
    paths: BTreeMap<String, String>,
}

impl NamespacePaths {
    /// Creates an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a mapping.
    ///
    /// Fails with [`Error::PathCollision`] when the path is already claimed or
    /// when the namespace itself was already mapped, so two namespaces sharing
    /// a full name cannot silently replace one another.
    pub fn insert(&mut self, namespace: impl Into<String>, path: impl Into<String>) -> Result<()> {
        let namespace = namespace.into();
        let path = path.into();
        if let Some(existing) = self.paths.get(&namespace) {
            return Err(Error::path_collision(existing.clone(), namespace.clone(), namespace));
        }
        if let Some((owner, _)) = self.paths.iter().find(|(_, existing)| **existing == path) {
            return Err(Error::path_collision(path, owner.clone(), namespace));
        }
        self.paths.insert(namespace, path);
        Ok(())
    }

    /// Relative path of a namespace
    pub fn get(&self, namespace: &str) -> Option<&str> {
        self.paths.get(namespace).map(String::as_str)
    }

    /// Iterates `(namespace, path)` pairs in namespace order
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.paths.iter()
    }

    /// Number of mapped namespaces
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is mapped
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Lookup service for namespace paths, imports and package names.
pub trait NamespaceResolver {
    /// Maps every namespace to its relative output path, extension included
    fn resolve_file_paths(
        &self,
        namespaces: &[Namespace],
        package_structured: bool,
    ) -> Result<NamespacePaths>;

    /// Full names of the namespaces referenced from `namespace`, excluding itself
    fn resolve_imports(&self, namespace: &Namespace) -> BTreeSet<String>;

    /// Dotted package name of a namespace full name
    fn resolve_package_name(&self, namespace: &str) -> String;
}

/// Resolver deriving packages and paths from dotted namespace names
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl NamespaceResolver for DefaultResolver {
    fn resolve_file_paths(
        &self,
        namespaces: &[Namespace],
        package_structured: bool,
    ) -> Result<NamespacePaths> {
        let mut paths = NamespacePaths::new();
        for ns in namespaces {
            let path = file_path(&ns.full_name, package_structured)?;
            trace!("Namespace {} -> {}", ns.full_name, path);
            paths.insert(ns.full_name.clone(), path)?;
        }
        Ok(paths)
    }

    fn resolve_imports(&self, namespace: &Namespace) -> BTreeSet<String> {
        let mut referenced = BTreeSet::new();
        for class in &namespace.classes {
            collect_references(class, &mut referenced);
        }
        referenced.remove(&namespace.full_name);
        referenced
    }

    fn resolve_package_name(&self, namespace: &str) -> String {
        package_name(namespace)
    }
}

/// Lower-cased dotted package name
pub fn package_name(full_name: &str) -> String {
    full_name.to_lowercase()
}

/// Relative output path for a namespace
pub fn file_path(full_name: &str, package_structured: bool) -> Result<String> {
    let package = package_name(full_name);
    let segments: Vec<&str> = package.split('.').collect();
    if segments.iter().any(|s| is_unsafe_segment(s)) {
        return Err(Error::path_traversal(full_name));
    }

    let stem = if package_structured {
        segments.join("/")
    } else {
        package
    };
    Ok(format!("{}{}", stem, PROTO_EXTENSION))
}

/// Checks that a forward-slash separated path stays below the output root
pub fn check_relative_path(path: &str) -> Result<()> {
    if path.split('/').any(is_unsafe_segment) {
        return Err(Error::path_traversal(path));
    }
    Ok(())
}

fn is_unsafe_segment(segment: &str) -> bool {
    segment.is_empty() || segment == "." || segment == ".." || segment.contains(['/', '\\'])
}

fn collect_references(class: &Class, into: &mut BTreeSet<String>) {
    for property in &class.properties {
        if let Some(target) = property.referenced_type() {
            into.insert(target.namespace.clone());
        }
    }
    for nested in &class.private_types {
        if let TypeNode::Class(nested) = nested {
            collect_references(nested, into);
        }
    }
}
