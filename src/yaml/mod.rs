//! YAML module - Reading manifests and editing them without reformatting.
//!
//! Two views of every document are kept side by side: a parsed
//! `serde_yaml::Value` that answers questions about content, and a
//! [`Tree`] built from `yaml-rust2` parser events that knows where each node
//! lives in the original text so a single leaf can be rewritten in place.

pub mod edit;
mod scalar;
mod tree;
mod value;

pub use scalar::*;
pub use tree::*;
pub(crate) use tree::Offsets;
pub use value::*;
