//! Document model: paths, keys, field paths and input documents

#[allow(clippy::module_inception)]
mod document;
mod path;

pub use document::{get_field, set_field, Document, DocumentBinding};
pub use path::{DocumentKey, FieldPath, ResourcePath};
