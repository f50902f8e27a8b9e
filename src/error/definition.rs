//! Errors raised while building a schema.
//!
//! A malformed schema is a programming error, so it is reported when the
//! validator is constructed rather than when input is parsed.

use thiserror::Error;

use crate::error::Issue;
use crate::path::JsonPath;

/// A schema could not be constructed.
#[derive(Debug, Error)]
pub enum SchemaDefinitionError {
    /// A union was given no alternatives.
    #[error("union requires at least one alternative")]
    EmptyUnion,

    /// An enum was given no options.
    #[error("enum requires at least one option")]
    EmptyEnum,

    /// An enum option was neither a string nor a number.
    #[error("enum option {0} must be a string or a number")]
    InvalidEnumOption(serde_json::Value),

    /// A derived object schema named a key the source schema does not declare.
    #[error("field '{0}' is not declared in the object schema")]
    UnknownField(String),

    /// The same key was declared twice.
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    /// A string pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl SchemaDefinitionError {
    /// Converts this error into a `schema` issue at the root path, for callers
    /// that report construction problems alongside parse failures.
    pub fn into_issue(self) -> Issue {
        let code = match &self {
            SchemaDefinitionError::EmptyUnion => "empty_union",
            SchemaDefinitionError::EmptyEnum => "empty_enum",
            SchemaDefinitionError::InvalidEnumOption(_) => "invalid_enum_option",
            SchemaDefinitionError::UnknownField(_) => "unknown_field",
            SchemaDefinitionError::DuplicateField(_) => "duplicate_field",
            SchemaDefinitionError::InvalidPattern(_) => "invalid_pattern",
        };
        Issue::schema(JsonPath::root(), code, self.to_string())
    }
}
