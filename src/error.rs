//! Error types shared across the crate.

use crate::fieldpath::Path;
use thiserror::Error;

/// Error is returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An annotation argument was not of the form `key=value`.
    #[error("invalid annotation {arg:?}: {reason}")]
    InvalidAnnotation { arg: String, reason: &'static str },

    /// No manifest (or container) in the whole stream matched the selector.
    #[error("Container not found")]
    NotFound,

    /// A document in the input stream is not valid YAML.
    #[error("document {document}: {source}")]
    Parse {
        document: usize,
        #[source]
        source: serde_yaml::Error,
    },

    /// A mutated document could not be serialized.
    #[error("failed to render document: {0}")]
    Render(#[source] serde_yaml::Error),

    /// A leaf could not be set because a node along the path is not a mapping or sequence.
    #[error("{path}: cannot descend into a scalar value")]
    NotAMapping { path: Path },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an invalid annotation error.
    pub fn invalid_annotation(arg: impl Into<String>, reason: &'static str) -> Self {
        Error::InvalidAnnotation {
            arg: arg.into(),
            reason,
        }
    }

    /// Creates a not-a-mapping error for the given path.
    pub fn not_a_mapping(path: Path) -> Self {
        Error::NotAMapping { path }
    }
}
