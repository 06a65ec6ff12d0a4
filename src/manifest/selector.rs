//! Selection criteria and mutation directives.

use crate::error::Error;
use std::fmt;

/// Selector identifies the manifest (and optionally the container) to change.
///
/// `kind` is compared case-insensitively; every other field must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub namespace: String,
    pub kind: String,
    pub name: String,
    pub container: Option<String>,
}

impl Selector {
    /// Creates a selector for a manifest.
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Selector {
            namespace: namespace.into(),
            kind: kind.into(),
            name: name.into(),
            container: None,
        }
    }

    /// Narrows the selector to one container of the manifest's pod template.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)?;
        if let Some(container) = &self.container {
            write!(f, " container {}", container)?;
        }
        Ok(())
    }
}

/// MutationDirective is the change applied to the single matched manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationDirective {
    /// Set the image of the selected container.
    SetImage(String),
    /// Merge annotations into `metadata.annotations`, in order.
    MergeAnnotations(Vec<(String, String)>),
}

/// Parses a `key=value` annotation argument.
///
/// The argument must contain exactly one `=`. Either side may be empty.
pub fn parse_annotation(arg: &str) -> Result<(String, String), Error> {
    let mut parts = arg.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::invalid_annotation(arg, "expected exactly one '='")),
    }
}
