//! The parsing pipeline shared by every validator.
//!
//! A validator's [`Modifiers`] hold the configuration every validator has in
//! common: strictness, optionality, a default, and the pre-transform, custom
//! validation and post-transform hooks. The functions here run the phases in
//! their fixed order:
//!
//! 1. required / default / optional handling for absent input
//! 2. pre-transform
//! 3. the validator's own structural step ([`Validator::parse_inner`])
//! 4. custom validation
//! 5. post-transform
//!
//! A failing phase short-circuits the rest.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use stillwater::Validation;
use tracing::trace;

use crate::error::{Issue, Issues};
use crate::path::JsonPath;
use crate::schema::Validator;
use crate::ParseResult;

pub(crate) type PreTransformFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;
pub(crate) type CustomFn<T> = Arc<dyn Fn(T, &JsonPath) -> ParseResult<T> + Send + Sync>;
pub(crate) type PostTransformFn<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Configuration common to every validator.
///
/// Validators start strict, required, with no default and no hooks.
#[derive(Clone)]
pub struct Modifiers<T> {
    strict: bool,
    optional: bool,
    default: Option<T>,
    pre_transform: Option<PreTransformFn>,
    custom: Option<CustomFn<T>>,
    post_transform: Option<PostTransformFn<T>>,
}

impl<T> Default for Modifiers<T> {
    fn default() -> Self {
        Self {
            strict: true,
            optional: false,
            default: None,
            pre_transform: None,
            custom: None,
            post_transform: None,
        }
    }
}

impl<T> Modifiers<T> {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if type mismatches are rejected instead of coerced.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns true if absent input is accepted.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the value substituted for absent input, if any.
    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    /// Sets strict (`true`) or coercive (`false`) mode.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Sets whether absent input is accepted.
    pub fn set_optional(&mut self, optional: bool) {
        self.optional = optional;
    }

    /// Sets the value substituted for absent input.
    pub fn set_default(&mut self, value: T) {
        self.default = Some(value);
    }

    /// Sets the function applied to present input before the structural step.
    pub fn set_pre_transform<F>(&mut self, f: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.pre_transform = Some(Arc::new(f));
    }

    /// Replaces the custom validation function.
    pub fn set_custom<F>(&mut self, f: F)
    where
        F: Fn(T, &JsonPath) -> ParseResult<T> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(f));
    }

    /// Sets the function applied to the validated output.
    pub fn set_post_transform<F>(&mut self, f: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.post_transform = Some(Arc::new(f));
    }
}

impl<T: 'static> Modifiers<T> {
    /// Chains `f` after the current custom validation function, if any.
    pub fn push_custom<F>(&mut self, f: F)
    where
        F: Fn(T, &JsonPath) -> ParseResult<T> + Send + Sync + 'static,
    {
        match self.custom.take() {
            Some(previous) => {
                self.custom = Some(Arc::new(move |value, path| {
                    match previous(value, path) {
                        Validation::Success(v) => f(v, path),
                        failure => failure,
                    }
                }));
            }
            None => self.custom = Some(Arc::new(f)),
        }
    }
}

/// Runs the full pipeline, starting with the absent-input check.
pub(crate) fn parse<V>(
    validator: &V,
    input: Option<&Value>,
    path: &JsonPath,
) -> ParseResult<Option<V::Output>>
where
    V: Validator + ?Sized,
{
    match input {
        Some(value) => validator.parse_present(value, path).map(Some),
        None => {
            let modifiers = validator.modifiers();
            if let Some(default) = modifiers.default_value() {
                Validation::Success(Some(default.clone()))
            } else if modifiers.is_optional() {
                Validation::Success(None)
            } else {
                trace!(path = %path, "required value is absent");
                Validation::Failure(Issues::single(Issue::required(path.clone())))
            }
        }
    }
}

/// Runs the phases that apply to present input.
pub(crate) fn parse_present<V>(validator: &V, value: &Value, path: &JsonPath) -> ParseResult<V::Output>
where
    V: Validator + ?Sized,
{
    let modifiers = validator.modifiers();

    let inner = match &modifiers.pre_transform {
        Some(pre) => validator.parse_inner(&pre(value.clone()), path),
        None => validator.parse_inner(value, path),
    };

    let mut output = match inner {
        Validation::Success(output) => output,
        failure => return failure,
    };

    if let Some(custom) = &modifiers.custom {
        output = match custom(output, path) {
            Validation::Success(output) => output,
            failure => {
                trace!(path = %path, "custom validation rejected value");
                return failure;
            }
        };
    }

    if let Some(post) = &modifiers.post_transform {
        output = post(output);
    }

    Validation::Success(output)
}

/// Parses every element of a sequence, concatenating all element issues.
pub(crate) fn parse_an_array<V>(
    validator: &V,
    input: &Value,
    path: &JsonPath,
) -> ParseResult<Vec<V::Output>>
where
    V: Validator + ?Sized,
{
    let items = match input.as_array() {
        Some(items) => items,
        None => {
            return Validation::Failure(Issues::single(Issue::type_mismatch(
                path.clone(),
                "array",
                input,
            )))
        }
    };

    let mut output = Vec::with_capacity(items.len());
    let mut issues = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match validator.parse_present(item, &path.push_index(index)) {
            Validation::Success(v) => output.push(v),
            Validation::Failure(e) => issues.extend(e),
        }
    }

    finish(output, issues)
}

/// Parses every value of a keyed mapping, concatenating all member issues.
pub(crate) fn parse_a_record<V>(
    validator: &V,
    input: &Value,
    path: &JsonPath,
) -> ParseResult<IndexMap<String, V::Output>>
where
    V: Validator + ?Sized,
{
    let entries = match input.as_object() {
        Some(entries) => entries,
        None => {
            return Validation::Failure(Issues::single(Issue::type_mismatch(
                path.clone(),
                "record",
                input,
            )))
        }
    };

    let mut output = IndexMap::with_capacity(entries.len());
    let mut issues = Vec::new();

    for (key, value) in entries {
        match validator.parse_present(value, &path.push_field(key.as_str())) {
            Validation::Success(v) => {
                output.insert(key.clone(), v);
            }
            Validation::Failure(e) => issues.extend(e),
        }
    }

    finish(output, issues)
}

/// Succeeds with `output` when `issues` is empty, otherwise fails with them.
pub(crate) fn finish<T>(output: T, issues: Vec<Issue>) -> ParseResult<T> {
    match Issues::from_vec(issues) {
        Some(issues) => Validation::Failure(issues),
        None => Validation::Success(output),
    }
}
