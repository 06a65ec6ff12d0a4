//! Manifest module - Selecting Kubernetes objects and changing them.
//!
//! - [`enumerate`], [`matches`] and [`find_container`] locate the target.
//! - [`apply_image`] and [`apply_annotations`] change it in place.

mod matcher;
mod mutator;
mod selector;

pub use matcher::*;
pub use mutator::*;
pub use selector::*;
