//! # Surely
//!
//! Runtime schema validation and coercion for untyped JSON values.
//!
//! ## Overview
//!
//! A schema is built by composing validators. Parsing a value either produces
//! a typed, possibly transformed output or a non-empty list of [`Issue`]s,
//! each located by a [`JsonPath`] into the input. Composite validators
//! (objects, arrays, tuples) evaluate every member and report all failures
//! at once rather than stopping at the first one. This is built on
//! stillwater's `Validation` type for applicative error accumulation.
//!
//! ## Core Types
//!
//! - [`Validator`]: The parsing contract every validator implements
//! - [`Issue`] / [`Issues`]: A single failure and a non-empty collection of them
//! - [`JsonPath`]: The location of a value in nested input (e.g. `users.0.email`)
//! - [`Schema`]: Entry point for creating validators
//!
//! ## Example
//!
//! ```rust
//! use surely::{IssueKind, Schema, Validator};
//! use serde_json::json;
//!
//! let user = Schema::object()
//!     .field("name", Schema::string().trim().min_len(1))
//!     .field("age", Schema::number().int().positive());
//!
//! let parsed = user.parse_value(&json!({"name": " Ada ", "age": 36}));
//! assert_eq!(
//!     parsed.into_result().unwrap(),
//!     Some(json!({"name": "Ada", "age": 36}).as_object().unwrap().clone())
//! );
//!
//! // Both fields fail; both are reported.
//! let issues = user
//!     .parse_value(&json!({"name": 12, "age": "28"}))
//!     .into_result()
//!     .unwrap_err();
//! let leaves = issues.leaves();
//! assert_eq!(leaves.len(), 2);
//! assert!(leaves.iter().all(|issue| issue.kind == IssueKind::Type));
//! ```

pub mod error;
pub mod path;
pub mod pipeline;
pub mod schema;

pub use error::{Issue, IssueKind, Issues, SchemaDefinitionError};
pub use path::{make_path, JsonPath, PathSegment};
pub use pipeline::Modifiers;
pub use schema::{
    ArrayValidator, BooleanValidator, DateOffset, DateValidator, DynValidator, EnumValidator,
    Format, LazyValidator, NumberValidator, ObjectValidator, OptionalValidator, Schema,
    StringValidator, TupleItems, TupleValidator, UnionValidator, UnknownKeys, Validator,
    DEFAULT_MAX_DEPTH,
};

/// Type alias for parse results carrying accumulated issues.
pub type ParseResult<T> = stillwater::Validation<T, Issues>;
