//! Traits for validator polymorphism.
//!
//! This module provides the [`Validator`] trait every validator implements and
//! the type-erased [`DynValidator`] used where children of different output
//! types sit side by side (object fields, union alternatives, dynamic tuples).

use indexmap::IndexMap;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{Issue, IssueKind, Issues};
use crate::path::JsonPath;
use crate::pipeline::{self, Modifiers};
use crate::ParseResult;

/// The parsing contract shared by every validator.
///
/// Implementors supply the structural step ([`parse_inner`](Self::parse_inner))
/// and access to their [`Modifiers`]; the trait provides the full pipeline,
/// the bulk helpers and the configuration builders.
///
/// The `Send + Sync` bounds allow validators to be shared across threads and
/// stored as `Arc<dyn DynValidator>` inside composites.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// let name = Schema::string().min_len(1).default("anonymous".to_string());
///
/// let parsed = name.parse(None, &surely::JsonPath::root());
/// assert_eq!(parsed.into_result().unwrap(), Some("anonymous".to_string()));
///
/// assert!(name.validate(&json!("Ada")));
/// assert!(!name.validate(&json!(42)));
/// ```
pub trait Validator: Send + Sync {
    /// The value produced by a successful parse.
    type Output: Clone + Send + Sync + 'static;

    /// Returns the shared configuration of this validator.
    fn modifiers(&self) -> &Modifiers<Self::Output>;

    /// Returns the shared configuration of this validator for modification.
    fn modifiers_mut(&mut self) -> &mut Modifiers<Self::Output>;

    /// The validator-specific structural step, run on present input after the
    /// pre-transform.
    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Self::Output>;

    /// Converts an output back into an untyped value.
    fn output_to_value(&self, output: Self::Output) -> Value;

    /// Parses possibly absent input at `path`.
    ///
    /// `None` in the success case means the input was absent and the
    /// validator is optional.
    fn parse(&self, input: Option<&Value>, path: &JsonPath) -> ParseResult<Option<Self::Output>> {
        pipeline::parse(self, input, path)
    }

    /// Parses input known to be present.
    fn parse_present(&self, value: &Value, path: &JsonPath) -> ParseResult<Self::Output> {
        pipeline::parse_present(self, value, path)
    }

    /// Parses `input` at the root path.
    fn parse_value(&self, input: &Value) -> ParseResult<Option<Self::Output>> {
        self.parse(Some(input), &JsonPath::root())
    }

    /// Returns true if `input` parses successfully at the root path.
    fn validate(&self, input: &Value) -> bool {
        self.parse_value(input).is_success()
    }

    /// Parses every element of an array, failing with the flat list of
    /// element issues.
    fn parse_an_array(&self, input: &Value, path: &JsonPath) -> ParseResult<Vec<Self::Output>> {
        pipeline::parse_an_array(self, input, path)
    }

    /// Parses every value of an object, failing with the flat list of
    /// member issues.
    fn parse_a_record(
        &self,
        input: &Value,
        path: &JsonPath,
    ) -> ParseResult<IndexMap<String, Self::Output>> {
        pipeline::parse_a_record(self, input, path)
    }

    /// Returns true if every element of `input` parses.
    fn validate_an_array(&self, input: &Value) -> bool {
        self.parse_an_array(input, &JsonPath::root()).is_success()
    }

    /// Returns true if every value of `input` parses.
    fn validate_a_record(&self, input: &Value) -> bool {
        self.parse_a_record(input, &JsonPath::root()).is_success()
    }

    /// Returns true if type mismatches are rejected instead of coerced.
    fn is_strict(&self) -> bool {
        self.modifiers().is_strict()
    }

    /// Rejects type mismatches. This is the default.
    fn strict(mut self) -> Self
    where
        Self: Sized,
    {
        self.modifiers_mut().set_strict(true);
        self
    }

    /// Converts compatible input types instead of rejecting them.
    fn coerce(mut self) -> Self
    where
        Self: Sized,
    {
        self.modifiers_mut().set_strict(false);
        self
    }

    /// Accepts absent input, producing `None`.
    fn optional(mut self) -> Self
    where
        Self: Sized,
    {
        self.modifiers_mut().set_optional(true);
        self
    }

    /// Substitutes `value` for absent input.
    fn default(mut self, value: Self::Output) -> Self
    where
        Self: Sized,
    {
        self.modifiers_mut().set_default(value);
        self
    }

    /// Rewrites present input before the structural step.
    fn pre_transform<F>(mut self, f: F) -> Self
    where
        Self: Sized,
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.modifiers_mut().set_pre_transform(f);
        self
    }

    /// Rewrites the output after custom validation.
    fn post_transform<F>(mut self, f: F) -> Self
    where
        Self: Sized,
        F: Fn(Self::Output) -> Self::Output + Send + Sync + 'static,
    {
        self.modifiers_mut().set_post_transform(f);
        self
    }

    /// Replaces the custom validation function.
    ///
    /// On success the returned value replaces the output.
    fn custom<F>(mut self, f: F) -> Self
    where
        Self: Sized,
        F: Fn(Self::Output, &JsonPath) -> ParseResult<Self::Output> + Send + Sync + 'static,
    {
        self.modifiers_mut().set_custom(f);
        self
    }

    /// Adds a predicate on the output, reported as a `custom` refinement
    /// issue with `message` when it fails.
    ///
    /// Successive calls run in order after any existing custom validation.
    fn refine<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        Self: Sized,
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.modifiers_mut().push_custom(move |output, path| {
            if predicate(&output) {
                Validation::Success(output)
            } else {
                Validation::Failure(Issues::single(
                    Issue::new(path.clone(), IssueKind::Refinement, message.clone())
                        .with_code("custom"),
                ))
            }
        });
        self
    }
}

/// A type-erased validator producing untyped values.
///
/// Every [`Validator`] implements `DynValidator` through a blanket impl, so
/// validators with different outputs can be stored together:
///
/// ```rust
/// use std::sync::Arc;
/// use surely::{DynValidator, Schema};
///
/// let children: Vec<Arc<dyn DynValidator>> = vec![
///     Arc::new(Schema::string()),
///     Arc::new(Schema::number().int()),
/// ];
/// assert_eq!(children.len(), 2);
/// ```
pub trait DynValidator: Send + Sync {
    /// Parses possibly absent input and converts the output to a `Value`.
    fn parse_dyn(&self, input: Option<&Value>, path: &JsonPath) -> ParseResult<Option<Value>>;

    /// Parses present input and converts the output to a `Value`.
    fn parse_present_dyn(&self, value: &Value, path: &JsonPath) -> ParseResult<Value>;
}

impl<V: Validator> DynValidator for V {
    fn parse_dyn(&self, input: Option<&Value>, path: &JsonPath) -> ParseResult<Option<Value>> {
        self.parse(input, path)
            .map(|output| output.map(|o| self.output_to_value(o)))
    }

    fn parse_present_dyn(&self, value: &Value, path: &JsonPath) -> ParseResult<Value> {
        self.parse_present(value, path)
            .map(|o| self.output_to_value(o))
    }
}
