//! Addresses of nodes inside a manifest document.

use std::fmt;

/// One step from a node to its child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// Mapping key, such as `metadata` or an annotation name.
    FieldName(String),
    /// Sequence position, such as an entry of `items` or `containers`.
    Index(usize),
}

impl PathElement {
    pub fn field(name: impl Into<String>) -> Self {
        PathElement::FieldName(name.into())
    }

    pub fn index(i: usize) -> Self {
        PathElement::Index(i)
    }

    /// The mapping key this element steps into, if any.
    pub fn as_field_name(&self) -> Option<&str> {
        if let PathElement::FieldName(name) = self {
            Some(name.as_str())
        } else {
            None
        }
    }
}

/// Path is a route from the document root, e.g. `.items[1].metadata.name`.
///
/// The builder methods return a new path and leave the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathElement>);

impl Path {
    /// The empty path, addressing the document root.
    pub fn new() -> Self {
        Path::default()
    }

    /// A path made only of mapping keys, e.g. `["metadata", "name"]`.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(PathElement::field).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This path extended by `element`.
    pub fn with(&self, element: PathElement) -> Self {
        self.0.iter().cloned().chain(Some(element)).collect()
    }

    /// This path extended by the mapping key `name`.
    pub fn with_field(&self, name: impl Into<String>) -> Self {
        self.with(PathElement::field(name))
    }

    /// This path followed by every element of `rest`.
    pub fn join(&self, rest: &Path) -> Self {
        self.0.iter().chain(&rest.0).cloned().collect()
    }

    pub fn as_slice(&self) -> &[PathElement] {
        &self.0
    }
}

impl From<&[PathElement]> for Path {
    fn from(elements: &[PathElement]) -> Self {
        Path(elements.to_vec())
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path(Vec::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::FieldName(name) => write!(f, ".{name}"),
            PathElement::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(".");
        }
        self.0.iter().try_for_each(|element| write!(f, "{element}"))
    }
}
