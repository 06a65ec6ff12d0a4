//! Path lookups and leaf updates on parsed YAML values.
//!
//! Manifests are duck-typed: any field may be missing or hold an unexpected
//! type. Lookups therefore never fail, they report absence.

use crate::error::Error;
use crate::fieldpath::{Path, PathElement};
use serde_yaml::{Mapping, Value};

/// FieldMatch is the outcome of comparing an optional field against an expected string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// The field exists, is a string, and equals the expected value.
    Matches,
    /// The field exists but holds a different value (or a non-string).
    Differs,
    /// Some element along the path does not exist.
    Absent,
}

impl FieldMatch {
    /// Returns true for [`FieldMatch::Matches`].
    pub fn is_match(self) -> bool {
        self == FieldMatch::Matches
    }
}

/// How two strings are compared by [`match_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Exact,
    IgnoreCase,
}

/// Walks `path` from `value`, returning the node found there.
///
/// Returns `None` as soon as an element is missing or the node at that point
/// is not a mapping (for field names) or sequence (for indices).
pub fn lookup<'a>(value: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = value;
    for element in path {
        current = match element {
            PathElement::FieldName(name) => current.get(name.as_str())?,
            PathElement::Index(i) => current.get(*i)?,
        };
    }
    Some(current)
}

/// Compares the string at `path` against `expected`.
pub fn match_field(
    value: &Value,
    path: &Path,
    expected: &str,
    comparison: Comparison,
) -> FieldMatch {
    match lookup(value, path) {
        None => FieldMatch::Absent,
        Some(Value::String(actual)) => {
            let equal = match comparison {
                Comparison::Exact => actual == expected,
                Comparison::IgnoreCase => actual.to_lowercase() == expected.to_lowercase(),
            };
            if equal {
                FieldMatch::Matches
            } else {
                FieldMatch::Differs
            }
        }
        Some(_) => FieldMatch::Differs,
    }
}

/// Sets the leaf at `path` to the string `new`.
///
/// Missing mapping entries along the way are created as empty mappings, and a
/// null node is treated the same as a missing one. Descending into any other
/// scalar, or past the end of a sequence, is an error.
pub fn set_string(root: &mut Value, path: &Path, new: &str) -> Result<(), Error> {
    let elements = path.as_slice();
    let mut current = root;
    for (depth, element) in elements.iter().enumerate() {
        let prefix = || Path::from(&elements[..=depth]);
        if current.is_null() && element.as_field_name().is_some() {
            *current = Value::Mapping(Mapping::new());
        }
        current = match (element, current) {
            (PathElement::FieldName(name), Value::Mapping(mapping)) => mapping
                .entry(Value::String(name.clone()))
                .or_insert(Value::Null),
            (PathElement::Index(i), Value::Sequence(items)) => {
                items.get_mut(*i).ok_or_else(|| Error::not_a_mapping(prefix()))?
            }
            _ => return Err(Error::not_a_mapping(prefix())),
        };
    }
    *current = Value::String(new.to_string());
    Ok(())
}
