//! Enumerated value validation.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{Issue, Issues, SchemaDefinitionError};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::Validator;

static NUMERIC_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("numeric pattern is valid"));

/// A validator that accepts one of a fixed set of strings or numbers.
///
/// In coercive mode a numeric string such as `"2"` is converted to a number
/// before the membership check, which suits enumerations whose members are
/// numbers but arrive as text (query strings, form fields).
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// let role = Schema::enumeration([json!("admin"), json!("user")]).unwrap();
/// assert!(role.validate(&json!("admin")));
/// assert!(!role.validate(&json!("root")));
///
/// let level = Schema::enumeration([json!(1), json!(2), json!(3)]).unwrap().coerce();
/// let parsed = level.parse_value(&json!("2")).into_result().unwrap();
/// assert_eq!(parsed, Some(json!(2)));
/// ```
#[derive(Clone)]
pub struct EnumValidator {
    options: Vec<Value>,
    modifiers: Modifiers<Value>,
}

impl EnumValidator {
    /// Creates an enum validator.
    ///
    /// Fails if `options` is empty or holds anything other than strings and
    /// numbers.
    pub fn new<I>(options: I) -> Result<Self, SchemaDefinitionError>
    where
        I: IntoIterator<Item = Value>,
    {
        let options: Vec<Value> = options.into_iter().collect();
        if options.is_empty() {
            return Err(SchemaDefinitionError::EmptyEnum);
        }
        if let Some(bad) = options
            .iter()
            .find(|o| !matches!(o, Value::String(_) | Value::Number(_)))
        {
            return Err(SchemaDefinitionError::InvalidEnumOption(bad.clone()));
        }
        Ok(Self {
            options,
            modifiers: Modifiers::new(),
        })
    }

    /// Returns the accepted values in declaration order.
    pub fn options(&self) -> &[Value] {
        &self.options
    }

    fn find(&self, candidate: &Value) -> Option<&Value> {
        self.options.iter().find(|o| same_member(o, candidate))
    }
}

/// Numbers compare by value so `1` matches `1.0`.
fn same_member(option: &Value, candidate: &Value) -> bool {
    match (option, candidate) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => option == candidate,
    }
}

impl Validator for EnumValidator {
    type Output = Value;

    fn modifiers(&self) -> &Modifiers<Value> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<Value> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Value> {
        let coerced = match value {
            Value::String(s) if !self.is_strict() && NUMERIC_STRING.is_match(s) => s
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            _ => None,
        };
        let candidate = coerced.as_ref().unwrap_or(value);

        match self.find(candidate) {
            Some(option) => Validation::Success(option.clone()),
            None => {
                let listed = self
                    .options
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                Validation::Failure(Issues::single(
                    Issue::refinement(
                        path.clone(),
                        "invalid_enum_value",
                        format!("expected one of {}, received {}", listed, value),
                        value.clone(),
                    )
                    .with_expected(format!("one of {}", listed)),
                ))
            }
        }
    }

    fn output_to_value(&self, output: Value) -> Value {
        output
    }
}
