//! # kubeyaml
//!
//! Patch one field of one Kubernetes manifest inside a YAML stream.
//!
//! A stream of documents (plain objects or `kind: List` wrappers) is read,
//! the first object matching a namespace/kind/name selector gets its
//! container image or annotations updated, and every document is written
//! back out. Untouched documents are re-emitted as they were read, and the
//! edited document keeps its comments, key order and quoting.
//!
//! ## Modules
//!
//! - [`fieldpath`] - Paths addressing nodes inside a document
//! - [`yaml`] - Semantic lookups and format-preserving edits
//! - [`stream`] - Splitting a stream into documents and writing them back
//! - [`manifest`] - Selecting manifests and containers, applying mutations
//! - [`driver`] - The first-match-wins stream pipeline

pub mod driver;
pub mod error;
pub mod fieldpath;
pub mod manifest;
pub mod stream;
pub mod yaml;


pub use driver::{run, Driver, Mutated};
pub use error::Error;
pub use fieldpath::{Path, PathElement};
pub use manifest::{parse_annotation, MutationDirective, Selector};
pub use stream::{Document, DocumentReader};
