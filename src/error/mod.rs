//! Error types for validation failures.
//!
//! Parse failures are values: an [`Issues`] collection of [`Issue`] records
//! with paths, messages and nested causes. Problems with the schema itself
//! surface at construction time as [`SchemaDefinitionError`].

mod definition;
mod issue;

pub use definition::SchemaDefinitionError;
pub use issue::{Issue, IssueKind, Issues};
