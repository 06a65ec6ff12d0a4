//! Stream module - Reading and writing multi-document YAML streams.

mod document;
mod reader;

pub use document::*;
pub use reader::*;
