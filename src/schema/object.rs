//! Object validation.
//!
//! This module provides [`ObjectValidator`] for validating JSON objects field
//! by field, with a configurable policy for keys the shape does not declare.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;
use tracing::{debug, trace};

use crate::error::{Issue, Issues, SchemaDefinitionError};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::optional::OptionalValidator;
use super::traits::{DynValidator, Validator};

/// How to handle keys not declared in the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Report every unknown key in one `unrecognized_keys` issue.
    #[default]
    Strict,
    /// Copy unknown keys into the output unchanged.
    Loose,
    /// Drop unknown keys from the output.
    Strip,
}

/// A validator for JSON objects.
///
/// Every declared field is parsed in declaration order with the key's value,
/// or with absent input when the key is missing, so a field's own
/// optionality and default decide what a missing key means. All field
/// failures are collected; on failure the result is a single `aggregate`
/// issue at the object's path whose sub-issues are the field issues
/// followed by the unknown-keys issue, if any.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// let user = Schema::object()
///     .field("name", Schema::string().min_len(1))
///     .field("age", Schema::number().int().positive())
///     .field("email", Schema::string().optional());
///
/// assert!(user.validate(&json!({"name": "Alice", "age": 30})));
///
/// let issues = user
///     .parse_value(&json!({"name": "", "age": -1}))
///     .into_result()
///     .unwrap_err();
/// assert_eq!(issues.len(), 1);
/// assert_eq!(issues.leaves().len(), 2);
/// ```
#[derive(Clone)]
pub struct ObjectValidator {
    fields: IndexMap<String, Arc<dyn DynValidator>>,
    unknown_keys: UnknownKeys,
    type_error_message: Option<String>,
    modifiers: Modifiers<Map<String, Value>>,
}

impl ObjectValidator {
    /// Creates an object validator with no fields.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            unknown_keys: UnknownKeys::default(),
            type_error_message: None,
            modifiers: Modifiers::new(),
        }
    }

    /// Creates an object validator from a list of fields, rejecting
    /// duplicate keys.
    pub fn try_from_fields<I, K>(fields: I) -> Result<Self, SchemaDefinitionError>
    where
        I: IntoIterator<Item = (K, Arc<dyn DynValidator>)>,
        K: Into<String>,
    {
        let mut shape = IndexMap::new();
        for (name, validator) in fields {
            let name = name.into();
            if shape.contains_key(&name) {
                return Err(SchemaDefinitionError::DuplicateField(name));
            }
            shape.insert(name, validator);
        }
        Ok(Self::from_shape(shape, UnknownKeys::default()))
    }

    fn from_shape(fields: IndexMap<String, Arc<dyn DynValidator>>, unknown_keys: UnknownKeys) -> Self {
        Self {
            fields,
            unknown_keys,
            type_error_message: None,
            modifiers: Modifiers::new(),
        }
    }

    /// Declares a field. A later declaration with the same name replaces the
    /// earlier one and keeps its position.
    ///
    /// A field is required unless its validator is optional or has a default.
    pub fn field<V>(self, name: impl Into<String>, validator: V) -> Self
    where
        V: Validator + 'static,
    {
        self.field_dyn(name, Arc::new(validator))
    }

    /// Declares a field from an already type-erased validator.
    pub fn field_dyn(mut self, name: impl Into<String>, validator: Arc<dyn DynValidator>) -> Self {
        self.fields.insert(name.into(), validator);
        self
    }

    /// Sets how keys missing from the shape are handled.
    pub fn unknown_keys(mut self, mode: UnknownKeys) -> Self {
        self.unknown_keys = mode;
        self
    }

    /// Copies unknown keys through to the output.
    pub fn loose(self) -> Self {
        self.unknown_keys(UnknownKeys::Loose)
    }

    /// Drops unknown keys from the output.
    pub fn strip(self) -> Self {
        self.unknown_keys(UnknownKeys::Strip)
    }

    /// Sets a custom message for the issue reported when the input is not
    /// an object.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Returns the unknown-keys mode.
    pub fn unknown_keys_mode(&self) -> UnknownKeys {
        self.unknown_keys
    }

    /// Returns the declared field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns a validator with only the named fields.
    ///
    /// Naming a field the shape does not declare is an error.
    pub fn pick(&self, keys: &[&str]) -> Result<Self, SchemaDefinitionError> {
        let mut shape = IndexMap::with_capacity(keys.len());
        for key in keys {
            let validator = self
                .fields
                .get(*key)
                .ok_or_else(|| SchemaDefinitionError::UnknownField((*key).to_string()))?;
            shape.insert((*key).to_string(), Arc::clone(validator));
        }
        Ok(Self::from_shape(shape, self.unknown_keys))
    }

    /// Returns a validator without the named fields. Names the shape does
    /// not declare are ignored.
    pub fn omit(&self, keys: &[&str]) -> Self {
        let shape = self
            .fields
            .iter()
            .filter(|(name, _)| !keys.contains(&name.as_str()))
            .map(|(name, validator)| (name.clone(), Arc::clone(validator)))
            .collect();
        Self::from_shape(shape, self.unknown_keys)
    }

    /// Returns a validator with the fields of `other` added. Fields of
    /// `other` replace same-named fields of `self`.
    pub fn extend(&self, other: &ObjectValidator) -> Self {
        let mut shape = self.fields.clone();
        for (name, validator) in &other.fields {
            shape.insert(name.clone(), Arc::clone(validator));
        }
        Self::from_shape(shape, self.unknown_keys)
    }

    /// Returns a validator whose every field accepts a missing key.
    pub fn as_partial(&self) -> Self {
        let shape = self
            .fields
            .iter()
            .map(|(name, validator)| {
                let optional: Arc<dyn DynValidator> =
                    Arc::new(OptionalValidator::new(Arc::clone(validator)));
                (name.clone(), optional)
            })
            .collect();
        Self::from_shape(shape, self.unknown_keys)
    }

    fn unrecognized_keys_issue(&self, path: &JsonPath, unknown: &[&String]) -> Issue {
        let listed = unknown
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", ");
        Issue::refinement(
            path.clone(),
            "unrecognized_keys",
            format!("Unexpected keys: {}", listed),
            Value::Array(unknown.iter().map(|k| Value::String((*k).clone())).collect()),
        )
    }
}

impl Validator for ObjectValidator {
    type Output = Map<String, Value>;

    fn modifiers(&self) -> &Modifiers<Self::Output> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<Self::Output> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Self::Output> {
        let obj = match value.as_object() {
            Some(o) => o,
            None => {
                let mut issue = Issue::type_mismatch(path.clone(), "object", value);
                if let Some(message) = &self.type_error_message {
                    issue.message = message.clone();
                }
                return Validation::Failure(Issues::single(issue));
            }
        };

        trace!(path = %path, fields = self.fields.len(), "validating object");

        let mut issues = Vec::new();
        let mut validated = Map::new();

        for (name, validator) in &self.fields {
            let field_path = path.push_field(name.as_str());
            match validator.parse_dyn(obj.get(name), &field_path) {
                Validation::Success(Some(v)) => {
                    validated.insert(name.clone(), v);
                }
                Validation::Success(None) => {}
                Validation::Failure(e) => issues.extend(e),
            }
        }

        let unknown: Vec<&String> = obj
            .keys()
            .filter(|key| !self.fields.contains_key(key.as_str()))
            .collect();

        if !unknown.is_empty() {
            match self.unknown_keys {
                UnknownKeys::Strict => issues.push(self.unrecognized_keys_issue(path, &unknown)),
                UnknownKeys::Loose => {
                    for key in unknown {
                        validated.insert(key.clone(), obj[key.as_str()].clone());
                    }
                }
                UnknownKeys::Strip => {}
            }
        }

        match Issues::from_vec(issues) {
            None => Validation::Success(validated),
            Some(sub) => {
                debug!(path = %path, issues = sub.len(), "object validation failed");
                Validation::Failure(Issues::single(Issue::aggregate(
                    path.clone(),
                    format!("Object validation failed with {} issue(s)", sub.len()),
                    value.clone(),
                    sub,
                )))
            }
        }
    }

    fn output_to_value(&self, output: Self::Output) -> Value {
        Value::Object(output)
    }
}
