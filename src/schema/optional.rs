//! Optional wrapper for type-erased validators.

use std::sync::Arc;

use serde_json::Value;
use stillwater::Validation;

use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::{DynValidator, Validator};

/// A validator that accepts absent input on behalf of its child.
///
/// Absent input is first offered to the child, so a child default still
/// applies; if the child rejects it the wrapper succeeds with `None`.
/// Present input is parsed by the child unchanged.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator, JsonPath};
///
/// let nickname = Schema::optional(Schema::string().min_len(2));
/// let parsed = nickname.parse(None, &JsonPath::root()).into_result().unwrap();
/// assert_eq!(parsed, None);
/// ```
#[derive(Clone)]
pub struct OptionalValidator {
    inner: Arc<dyn DynValidator>,
    modifiers: Modifiers<Value>,
}

impl OptionalValidator {
    /// Wraps an already type-erased validator.
    pub fn new(inner: Arc<dyn DynValidator>) -> Self {
        let mut modifiers = Modifiers::new();
        modifiers.set_optional(true);
        Self { inner, modifiers }
    }

    /// Wraps a typed validator.
    pub fn wrap<V: Validator + 'static>(inner: V) -> Self {
        Self::new(Arc::new(inner))
    }
}

impl Validator for OptionalValidator {
    type Output = Value;

    fn modifiers(&self) -> &Modifiers<Value> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<Value> {
        &mut self.modifiers
    }

    fn parse(&self, input: Option<&Value>, path: &JsonPath) -> ParseResult<Option<Value>> {
        match input {
            Some(value) => self.parse_present(value, path).map(Some),
            None => {
                if let Some(default) = self.modifiers.default_value() {
                    return Validation::Success(Some(default.clone()));
                }
                match self.inner.parse_dyn(None, path) {
                    Validation::Success(output) => Validation::Success(output),
                    Validation::Failure(_) => Validation::Success(None),
                }
            }
        }
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Value> {
        self.inner.parse_present_dyn(value, path)
    }

    fn output_to_value(&self, output: Value) -> Value {
        output
    }
}
