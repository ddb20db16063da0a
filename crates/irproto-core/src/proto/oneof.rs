//! Oneof synthesis from the marker enum.
//!
//! A class that owns a nested enum named [`ONEOF_MARKER`] lists its oneof
//! members as that enum's value names. [`OneofSplit`] is a read-only view over
//! the class: the matched fields move into the oneof group, and the marker enum
//! is hidden from nested-type emission. The class itself is never modified, so
//! emitting the same IR twice yields the same text.

use crate::ir::{Class, ClassProperty, TypeNode, ONEOF_MARKER};
use tracing::debug;

/// A class's fields split into flat fields and a single oneof group
#[derive(Debug, Clone)]
pub struct OneofSplit<'a> {
    /// Fields outside the oneof, in declaration order
    pub flat_fields: Vec<&'a ClassProperty>,
    /// Oneof members in marker enum order
    pub oneof_group: Vec<&'a ClassProperty>,
    /// Index of the marker enum in `private_types`
    marker_index: Option<usize>,
}

impl<'a> OneofSplit<'a> {
    /// Derives the split for `class`
    pub fn of(class: &'a Class) -> Self {
        let mut markers = class
            .private_types
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                TypeNode::Enum(e) if e.short_name == ONEOF_MARKER => Some((i, e)),
                _ => None,
            });

        let Some((marker_index, marker)) = markers.next() else {
            return Self {
                flat_fields: class.properties.iter().collect(),
                oneof_group: Vec::new(),
                marker_index: None,
            };
        };
        if markers.next().is_some() {
            debug!(
                "Class {} has more than one {} enum, only the first is used",
                class.short_name, ONEOF_MARKER
            );
        }

        let mut taken = vec![false; class.properties.len()];
        let mut oneof_group = Vec::new();
        for case in &marker.properties {
            let found = class
                .properties
                .iter()
                .enumerate()
                .find(|(i, p)| !taken[*i] && p.name == case.name);
            match found {
                Some((i, property)) => {
                    taken[i] = true;
                    oneof_group.push(property);
                }
                None => debug!(
                    "Class {}: oneof case '{}' matches no field",
                    class.short_name, case.name
                ),
            }
        }

        let flat_fields = class
            .properties
            .iter()
            .zip(taken)
            .filter(|(_, taken)| !taken)
            .map(|(p, _)| p)
            .collect();

        Self {
            flat_fields,
            oneof_group,
            marker_index: Some(marker_index),
        }
    }

    /// Nested types of `class` that are emitted, i.e. all but the marker enum
    pub fn nested_types(&self, class: &'a Class) -> impl Iterator<Item = &'a TypeNode> {
        let marker_index = self.marker_index;
        class
            .private_types
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != marker_index)
            .map(|(_, node)| node)
    }

    /// Smallest tag among oneof members; flat fields below it precede the block
    pub fn threshold(&self) -> Option<u32> {
        self.oneof_group
            .iter()
            .map(|p| p.options.property_order)
            .min()
    }
}
