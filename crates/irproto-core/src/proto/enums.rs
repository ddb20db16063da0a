//! proto3 enum value layout.
//!
//! proto3 requires the first value of every enum to be zero. [`EnumLayout`]
//! picks the first zero-valued property (or synthesizes
//! `<Name>_AUTO_INVALID = 0` when none exists), orders the rest by value, and
//! records whether aliases force `option allow_alias = true;`.

use crate::ir::{Enum, EnumProperty};
use std::borrow::Cow;
use std::collections::BTreeSet;
use tracing::debug;

/// Suffix of the value name synthesized when an enum has no zero value
pub const AUTO_INVALID_SUFFIX: &str = "_AUTO_INVALID";

/// Emission order of an enum's values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLayout<'a> {
    /// Value written first; borrowed from the IR unless synthesized
    pub zero: Cow<'a, EnumProperty>,
    /// Remaining values, ascending by value, ties in declaration order
    pub rest: Vec<&'a EnumProperty>,
    /// Two or more values share a number
    pub allow_alias: bool,
}

impl<'a> EnumLayout<'a> {
    /// Derives the layout of `e` without touching it
    pub fn of(e: &'a Enum) -> Self {
        let zero_index = e.properties.iter().position(|p| p.value == 0);

        let zero = match zero_index {
            Some(i) => Cow::Borrowed(&e.properties[i]),
            None => Cow::Owned(EnumProperty {
                name: format!("{}{}", e.short_name, AUTO_INVALID_SUFFIX),
                value: 0,
            }),
        };

        let zero_count = e.properties.iter().filter(|p| p.value == 0).count();
        if zero_count > 1 {
            debug!(
                "Enum {} has {} zero values, using '{}'",
                e.short_name, zero_count, zero.name
            );
        }

        let mut rest: Vec<&EnumProperty> = e
            .properties
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != zero_index)
            .map(|(_, p)| p)
            .collect();
        rest.sort_by_key(|p| p.value);

        Self {
            zero,
            rest,
            allow_alias: has_alias(e),
        }
    }

    /// Whether the zero value was invented rather than found
    pub fn is_synthesized(&self) -> bool {
        matches!(self.zero, Cow::Owned(_))
    }

    /// Values in emission order
    pub fn values(&self) -> impl Iterator<Item = &EnumProperty> + '_ {
        std::iter::once(self.zero.as_ref()).chain(self.rest.iter().copied())
    }
}

/// True when at least two properties share a value
pub fn has_alias(e: &Enum) -> bool {
    let mut seen = BTreeSet::new();
    e.properties.iter().any(|p| !seen.insert(p.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(layout: &'a EnumLayout<'_>) -> Vec<&'a str> {
        layout.values().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_zero_value_moves_first() {
        let e = Enum::new("Color")
            .value("RED", 2)
            .value("NONE", 0)
            .value("BLUE", 1);
        let layout = EnumLayout::of(&e);
        assert!(!layout.is_synthesized());
        assert!(!layout.allow_alias);
        assert_eq!(names(&layout), vec!["NONE", "BLUE", "RED"]);
    }

    #[test]
    fn test_missing_zero_is_synthesized() {
        let e = Enum::new("Mode").value("ON", 1).value("OFF", 2);
        let layout = EnumLayout::of(&e);
        assert!(layout.is_synthesized());
        assert_eq!(layout.zero.name, "Mode_AUTO_INVALID");
        assert_eq!(layout.zero.value, 0);
        // The IR itself is untouched
        assert_eq!(e.properties.len(), 2);
        assert_eq!(names(&layout), vec!["Mode_AUTO_INVALID", "ON", "OFF"]);
    }

    #[test]
    fn test_empty_enum() {
        let e = Enum::new("Empty");
        let layout = EnumLayout::of(&e);
        assert!(layout.is_synthesized());
        assert!(layout.rest.is_empty());
        assert!(!layout.allow_alias);
    }

    #[test]
    fn test_alias_ties_keep_declaration_order() {
        let e = Enum::new("X")
            .value("RUNNING", 1)
            .value("UNKNOWN", 0)
            .value("STARTED", 1)
            .value("NEG", -1);
        let layout = EnumLayout::of(&e);
        assert!(layout.allow_alias);
        assert_eq!(names(&layout), vec!["UNKNOWN", "NEG", "RUNNING", "STARTED"]);
    }

    #[test]
    fn test_first_zero_wins() {
        let e = Enum::new("Z").value("A", 0).value("B", 0);
        let layout = EnumLayout::of(&e);
        assert_eq!(layout.zero.name, "A");
        assert!(layout.allow_alias);
        assert_eq!(names(&layout), vec!["A", "B"]);
    }
}
