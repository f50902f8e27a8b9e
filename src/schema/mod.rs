//! Validator definitions.
//!
//! Every validator implements [`Validator`]. Leaf validators (string, number,
//! boolean, enum, date) check a single value; composite validators (object,
//! array, tuple, union) fan out to children at extended paths and collect all
//! of their issues before deciding.
//!
//! # Example
//!
//! ```rust
//! use surely::{Schema, Validator};
//! use serde_json::json;
//!
//! let schema = Schema::string().min_len(1).max_len(100);
//!
//! assert!(schema.validate(&json!("hello")));
//! assert!(!schema.validate(&json!("")));
//! ```

mod array;
mod boolean;
mod date;
mod enumeration;
mod lazy;
mod number;
mod object;
mod optional;
mod string;
mod traits;
mod tuple;
mod union;

pub use array::ArrayValidator;
pub use boolean::BooleanValidator;
pub use date::{DateOffset, DateValidator};
pub use enumeration::EnumValidator;
pub use lazy::{LazyValidator, DEFAULT_MAX_DEPTH};
pub use number::NumberValidator;
pub use object::{ObjectValidator, UnknownKeys};
pub use optional::OptionalValidator;
pub use string::{Format, StringValidator};
pub use traits::{DynValidator, Validator};
pub use tuple::{TupleItems, TupleValidator};
pub use union::UnionValidator;

use serde_json::Value;

use crate::error::SchemaDefinitionError;

/// Entry point for creating validators.
///
/// Each method returns a fresh validator in strict mode with no constraints.
/// Configuration methods consume and return the validator, so a base
/// validator is shared by cloning it.
///
/// # Strict by default
///
/// Leaf validators reject input of the wrong JSON type until `.coerce()` is
/// called. A number validator refuses `"42"`, and a boolean validator refuses
/// `"yes"`. Call `.coerce()` on each leaf that should convert text, numbers
/// or flags. Composites pass input to their children unchanged, so the
/// setting belongs on the leaves.
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// assert!(!Schema::number().validate(&json!("42")));
/// assert!(Schema::number().coerce().validate(&json!("42")));
///
/// let form = Schema::object().field("subscribe", Schema::boolean().coerce());
/// assert!(form.validate(&json!({"subscribe": "yes"})));
/// ```
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// let user = Schema::object()
///     .field("name", Schema::string().min_len(1))
///     .field("age", Schema::number().int().gte(0.0))
///     .field("tags", Schema::array(Schema::string()).optional());
///
/// assert!(user.validate(&json!({"name": "Ada", "age": 36})));
/// assert!(!user.validate(&json!({"name": "", "age": -1})));
/// ```
pub struct Schema;

impl Schema {
    /// Creates a string validator.
    ///
    /// ```rust
    /// use surely::{Schema, Validator};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string().min_len(5);
    /// assert!(schema.validate(&json!("hello")));
    /// assert!(!schema.validate(&json!("hi")));
    /// ```
    pub fn string() -> StringValidator {
        StringValidator::new()
    }

    /// Creates a number validator.
    ///
    /// ```rust
    /// use surely::{Schema, Validator};
    /// use serde_json::json;
    ///
    /// let schema = Schema::number().int().range(0.0, 100.0);
    /// assert!(schema.validate(&json!(50)));
    /// assert!(!schema.validate(&json!(1.5)));
    /// ```
    pub fn number() -> NumberValidator {
        NumberValidator::new()
    }

    pub fn boolean() -> BooleanValidator {
        BooleanValidator::new()
    }

    /// Creates an enum validator over string and number options.
    ///
    /// Fails if `options` is empty or holds any other kind of value.
    pub fn enumeration<I>(options: I) -> Result<EnumValidator, SchemaDefinitionError>
    where
        I: IntoIterator<Item = Value>,
    {
        EnumValidator::new(options)
    }

    pub fn date() -> DateValidator {
        DateValidator::new()
    }

    /// Creates an object validator with no fields.
    ///
    /// Unknown keys are rejected until [`loose`](ObjectValidator::loose) or
    /// [`strip`](ObjectValidator::strip) is called.
    pub fn object() -> ObjectValidator {
        ObjectValidator::new()
    }

    pub fn array<V: Validator>(item: V) -> ArrayValidator<V> {
        ArrayValidator::new(item)
    }

    /// Creates a tuple validator from a Rust tuple of validators or a `Vec`
    /// of type-erased ones.
    ///
    /// ```rust
    /// use surely::{Schema, Validator};
    /// use serde_json::json;
    ///
    /// let point = Schema::tuple((Schema::string(), Schema::number()));
    /// let (label, x) = point.parse_value(&json!(["a", 1])).into_result().unwrap().unwrap();
    /// assert_eq!((label.as_str(), x), ("a", 1.0));
    /// ```
    pub fn tuple<I: TupleItems>(items: I) -> TupleValidator<I> {
        TupleValidator::new(items)
    }

    /// Creates a union validator. An empty list of alternatives is rejected.
    ///
    /// ```rust
    /// use surely::{DynValidator, Schema, Validator};
    /// use serde_json::json;
    ///
    /// let id = Schema::union(vec![
    ///     Box::new(Schema::string()) as Box<dyn DynValidator>,
    ///     Box::new(Schema::number()),
    /// ])
    /// .unwrap();
    /// assert!(id.validate(&json!("abc")));
    /// assert!(id.validate(&json!(7)));
    /// assert!(!id.validate(&json!(true)));
    /// ```
    pub fn union(
        alternatives: Vec<Box<dyn DynValidator>>,
    ) -> Result<UnionValidator, SchemaDefinitionError> {
        UnionValidator::new(alternatives)
    }

    /// Creates a validator whose target is built on first use, for schemas
    /// that refer to themselves.
    pub fn lazy<V, F>(build: F) -> LazyValidator<V, F>
    where
        V: Validator,
        F: Fn() -> V + Send + Sync,
    {
        LazyValidator::new(build)
    }

    /// Wraps `inner` so absent input succeeds with no value.
    pub fn optional<V: Validator + 'static>(inner: V) -> OptionalValidator {
        OptionalValidator::wrap(inner)
    }
}
