//! Boolean validation.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{Issue, Issues};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::Validator;

const TRUE_WORDS: &[&str] = &[
    "true", "TRUE", "True", "1", "yes", "YES", "Yes", "on", "ON", "On", "Y", "y", "T", "t",
];

const FALSE_WORDS: &[&str] = &[
    "false", "FALSE", "False", "0", "no", "NO", "No", "off", "OFF", "Off", "N", "n", "F", "f",
];

/// A validator for booleans.
///
/// In coercive mode the usual spellings of yes and no are accepted as
/// strings (`"true"`, `"yes"`, `"on"`, `"y"`, `"t"`, `"1"` and their
/// negative counterparts, in lower, upper and capitalised case where they
/// have one), as are the numbers `1` and `0`.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// assert!(!Schema::boolean().validate(&json!("true")));
///
/// let flag = Schema::boolean().coerce();
/// let parsed = flag.parse_value(&json!("Yes")).into_result().unwrap();
/// assert_eq!(parsed, Some(true));
/// ```
#[derive(Clone)]
pub struct BooleanValidator {
    expect: Option<bool>,
    modifiers: Modifiers<bool>,
}

impl BooleanValidator {
    pub fn new() -> Self {
        Self {
            expect: None,
            modifiers: Modifiers::new(),
        }
    }

    /// Requires the parsed value to be `true`.
    pub fn truthy(mut self) -> Self {
        self.expect = Some(true);
        self
    }

    /// Requires the parsed value to be `false`.
    pub fn falsy(mut self) -> Self {
        self.expect = Some(false);
        self
    }

    fn coerce_input(&self, value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            _ if self.is_strict() => None,
            Value::String(s) if TRUE_WORDS.contains(&s.as_str()) => Some(true),
            Value::String(s) if FALSE_WORDS.contains(&s.as_str()) => Some(false),
            Value::Number(n) => match n.as_f64() {
                Some(x) if x == 1.0 => Some(true),
                Some(x) if x == 0.0 => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Validator for BooleanValidator {
    type Output = bool;

    fn modifiers(&self) -> &Modifiers<bool> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<bool> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<bool> {
        let b = match self.coerce_input(value) {
            Some(b) => b,
            None => {
                return Validation::Failure(Issues::single(Issue::type_mismatch(
                    path.clone(),
                    "boolean",
                    value,
                )))
            }
        };

        match self.expect {
            Some(expected) if expected != b => {
                let (code, message) = if expected {
                    ("truthy", "expected a truthy value, received a falsy value")
                } else {
                    ("falsy", "expected a falsy value, received a truthy value")
                };
                Validation::Failure(Issues::single(Issue::refinement(
                    path.clone(),
                    code,
                    message,
                    value.clone(),
                )))
            }
            _ => Validation::Success(b),
        }
    }

    fn output_to_value(&self, output: bool) -> Value {
        Value::Bool(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;
    use serde_json::json;

    fn parse(schema: &BooleanValidator, value: Value) -> ParseResult<bool> {
        schema.parse_present(&value, &JsonPath::root())
    }

    #[test]
    fn test_strict() {
        let schema = BooleanValidator::new();
        assert_eq!(parse(&schema, json!(true)).into_result().unwrap(), true);
        for input in [json!("true"), json!(1), json!(null)] {
            let issues = parse(&schema, input).into_result().unwrap_err();
            assert_eq!(issues.first().kind, IssueKind::Type);
        }
    }

    #[test]
    fn test_coerce_table() {
        let schema = BooleanValidator::new().coerce();
        for word in TRUE_WORDS {
            assert_eq!(parse(&schema, json!(word)).into_result().unwrap(), true, "{}", word);
        }
        for word in FALSE_WORDS {
            assert_eq!(parse(&schema, json!(word)).into_result().unwrap(), false, "{}", word);
        }
        assert_eq!(parse(&schema, json!(1)).into_result().unwrap(), true);
        assert_eq!(parse(&schema, json!(0)).into_result().unwrap(), false);
        assert!(parse(&schema, json!(2)).is_failure());
        assert!(parse(&schema, json!("yEs")).is_failure());
    }

    #[test]
    fn test_truthy_and_falsy() {
        let truthy = BooleanValidator::new().truthy();
        assert!(parse(&truthy, json!(true)).is_success());
        let issues = parse(&truthy, json!(false)).into_result().unwrap_err();
        assert_eq!(issues.first().code, "truthy");

        let falsy = BooleanValidator::new().falsy();
        assert_eq!(parse(&falsy, json!(true)).into_result().unwrap_err().first().code, "falsy");
    }
}
