//! Field path module - Addresses nodes inside a manifest document.
//!
//! Paths are how a match is handed from the matcher to the mutator: the
//! matcher reports where the manifest or container lives, the mutator edits
//! the leaf below it.

mod path;

pub use path::*;
