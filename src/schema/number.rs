//! Numeric validation.
//!
//! This module provides [`NumberValidator`] for validating numbers. Values
//! are handled as `f64`; outputs with no fractional part convert back to
//! JSON integers.

use serde_json::{Number, Value};
use stillwater::Validation;

use crate::error::{Issue, Issues};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::Validator;

/// Largest magnitude at which every integer is exactly representable.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rounding {
    Round,
    Ceil,
    Floor,
}

/// A constraint applied to numbers. Variants are declared in evaluation
/// order.
#[derive(Debug, Clone)]
enum NumberConstraint {
    Int { message: Option<String> },
    Float { message: Option<String> },
    Positive { message: Option<String> },
    Negative { message: Option<String> },
    Finite { message: Option<String> },
    Lt { bound: f64, message: Option<String> },
    Gt { bound: f64, message: Option<String> },
    Lte { bound: f64, message: Option<String> },
    Gte { bound: f64, message: Option<String> },
    Range { min: f64, max: f64, message: Option<String> },
    Even { message: Option<String> },
    Odd { message: Option<String> },
    MultipleOf { step: f64, message: Option<String> },
}

impl NumberConstraint {
    fn rank(&self) -> u8 {
        match self {
            NumberConstraint::Int { .. } | NumberConstraint::Float { .. } => 0,
            NumberConstraint::Positive { .. } | NumberConstraint::Negative { .. } => 1,
            NumberConstraint::Finite { .. } => 2,
            NumberConstraint::Lt { .. } => 3,
            NumberConstraint::Gt { .. } => 4,
            NumberConstraint::Lte { .. } => 5,
            NumberConstraint::Gte { .. } => 6,
            NumberConstraint::Range { .. } => 7,
            NumberConstraint::Even { .. } | NumberConstraint::Odd { .. } => 8,
            NumberConstraint::MultipleOf { .. } => 9,
        }
    }

    fn message_mut(&mut self) -> &mut Option<String> {
        match self {
            NumberConstraint::Int { message }
            | NumberConstraint::Float { message }
            | NumberConstraint::Positive { message }
            | NumberConstraint::Negative { message }
            | NumberConstraint::Finite { message }
            | NumberConstraint::Lt { message, .. }
            | NumberConstraint::Gt { message, .. }
            | NumberConstraint::Lte { message, .. }
            | NumberConstraint::Gte { message, .. }
            | NumberConstraint::Range { message, .. }
            | NumberConstraint::Even { message }
            | NumberConstraint::Odd { message }
            | NumberConstraint::MultipleOf { message, .. } => message,
        }
    }
}

/// A validator for numbers.
///
/// In coercive mode, trimmed numeric strings are parsed and booleans map to
/// `1` and `0`. Rounding and clamping run before any constraint is checked.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// let age = Schema::number().int().range(0.0, 150.0);
/// assert!(age.validate(&json!(42)));
/// assert!(!age.validate(&json!(42.5)));
/// assert!(!age.validate(&json!("42")));
///
/// let lenient = Schema::number().coerce().round();
/// let parsed = lenient.parse_value(&json!(" 41.6 ")).into_result().unwrap();
/// assert_eq!(parsed, Some(42.0));
/// ```
#[derive(Clone)]
pub struct NumberValidator {
    rounding: Option<Rounding>,
    clamp: Option<(f64, f64)>,
    constraints: Vec<NumberConstraint>,
    last_constraint: Option<usize>,
    type_error_message: Option<String>,
    modifiers: Modifiers<f64>,
}

impl NumberValidator {
    /// Creates a number validator with no transforms or constraints.
    pub fn new() -> Self {
        Self {
            rounding: None,
            clamp: None,
            constraints: Vec::new(),
            last_constraint: None,
            type_error_message: None,
            modifiers: Modifiers::new(),
        }
    }

    fn constrain(mut self, constraint: NumberConstraint) -> Self {
        let rank = constraint.rank();
        let pos = self
            .constraints
            .iter()
            .position(|c| c.rank() > rank)
            .unwrap_or(self.constraints.len());
        self.constraints.insert(pos, constraint);
        self.last_constraint = Some(pos);
        self
    }

    /// Rounds to the nearest integer, half away from zero.
    pub fn round(mut self) -> Self {
        self.rounding = Some(Rounding::Round);
        self
    }

    /// Rounds up.
    pub fn ceil(mut self) -> Self {
        self.rounding = Some(Rounding::Ceil);
        self
    }

    /// Rounds down.
    pub fn floor(mut self) -> Self {
        self.rounding = Some(Rounding::Floor);
        self
    }

    /// Limits the value to `[min, max]`. Reversed bounds are swapped.
    pub fn clamp(mut self, min: f64, max: f64) -> Self {
        self.clamp = Some((min.min(max), min.max(max)));
        self
    }

    /// Requires an integral value. Reported as a type issue.
    pub fn int(self) -> Self {
        self.constrain(NumberConstraint::Int { message: None })
    }

    /// Requires a value with a fractional part. Reported as a type issue.
    pub fn float(self) -> Self {
        self.constrain(NumberConstraint::Float { message: None })
    }

    /// Requires a value greater than zero.
    pub fn positive(self) -> Self {
        self.constrain(NumberConstraint::Positive { message: None })
    }

    /// Requires a value less than zero.
    pub fn negative(self) -> Self {
        self.constrain(NumberConstraint::Negative { message: None })
    }

    /// Rejects infinities. Only reachable through coercion, since JSON
    /// numbers are always finite.
    pub fn finite(self) -> Self {
        self.constrain(NumberConstraint::Finite { message: None })
    }

    pub fn lt(self, bound: f64) -> Self {
        self.constrain(NumberConstraint::Lt { bound, message: None })
    }

    pub fn gt(self, bound: f64) -> Self {
        self.constrain(NumberConstraint::Gt { bound, message: None })
    }

    pub fn lte(self, bound: f64) -> Self {
        self.constrain(NumberConstraint::Lte { bound, message: None })
    }

    pub fn gte(self, bound: f64) -> Self {
        self.constrain(NumberConstraint::Gte { bound, message: None })
    }

    /// Requires `min <= value <= max`.
    pub fn range(self, min: f64, max: f64) -> Self {
        self.constrain(NumberConstraint::Range {
            min,
            max,
            message: None,
        })
    }

    pub fn even(self) -> Self {
        self.constrain(NumberConstraint::Even { message: None })
    }

    pub fn odd(self) -> Self {
        self.constrain(NumberConstraint::Odd { message: None })
    }

    /// Requires the value to be a multiple of `step`, within a tolerance of
    /// `|step| * EPSILON * 10`.
    ///
    /// A zero step fails every parse with a `multiple_of` issue.
    pub fn multiple_of(self, step: f64) -> Self {
        self.constrain(NumberConstraint::MultipleOf {
            step,
            message: None,
        })
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the message used
    /// when the value is not a number.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.last_constraint.and_then(|i| self.constraints.get_mut(i)) {
            Some(constraint) => *constraint.message_mut() = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    fn type_issue(&self, value: &Value, path: &JsonPath) -> ParseResult<f64> {
        let mut issue = Issue::type_mismatch(path.clone(), "number", value);
        if let Some(message) = &self.type_error_message {
            issue.message = message.clone();
        }
        Validation::Failure(Issues::single(issue))
    }

    fn coerce_input(&self, value: &Value, path: &JsonPath) -> ParseResult<f64> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if !self.is_strict() => s.trim().parse::<f64>().ok(),
            Value::Bool(b) if !self.is_strict() => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        match parsed {
            Some(n) if !n.is_nan() => Validation::Success(n),
            _ => self.type_issue(value, path),
        }
    }

    fn transform(&self, mut n: f64) -> f64 {
        n = match self.rounding {
            Some(Rounding::Round) => n.round(),
            Some(Rounding::Ceil) => n.ceil(),
            Some(Rounding::Floor) => n.floor(),
            None => n,
        };
        if let Some((min, max)) = self.clamp {
            n = n.max(min).min(max);
        }
        n
    }
}

impl Validator for NumberValidator {
    type Output = f64;

    fn modifiers(&self) -> &Modifiers<f64> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<f64> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<f64> {
        let n = match self.coerce_input(value, path) {
            Validation::Success(n) => self.transform(n),
            failure => return failure,
        };

        match self
            .constraints
            .iter()
            .find_map(|c| check_constraint(c, n, path))
        {
            Some(issue) => Validation::Failure(Issues::single(issue)),
            None => Validation::Success(n),
        }
    }

    fn output_to_value(&self, output: f64) -> Value {
        number_to_value(output)
    }
}

/// Converts an `f64` to a JSON number, using an integer when the value has
/// no fractional part. Non-finite values have no JSON form and become null.
pub(crate) fn number_to_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0
}

/// Checks a single constraint and returns an issue if it fails.
fn check_constraint(constraint: &NumberConstraint, n: f64, path: &JsonPath) -> Option<Issue> {
    let received = number_to_value(n);
    let fail = |code: &str, message: &Option<String>, default: String, expected: String| {
        Some(
            Issue::refinement(path.clone(), code, message.clone().unwrap_or(default), received.clone())
                .with_expected(expected),
        )
    };
    let type_fail = |expected: &str, message: &Option<String>| {
        let mut issue = Issue::type_mismatch(path.clone(), expected, &received);
        if let Some(message) = message {
            issue.message = message.clone();
        }
        Some(issue)
    };

    match constraint {
        NumberConstraint::Int { message } if !is_integral(n) => type_fail("integer", message),
        NumberConstraint::Float { message } if is_integral(n) => type_fail("float", message),
        NumberConstraint::Positive { message } if n <= 0.0 => fail(
            "positive",
            message,
            format!("must be positive, got {}", n),
            "positive number".to_string(),
        ),
        NumberConstraint::Negative { message } if n >= 0.0 => fail(
            "negative",
            message,
            format!("must be negative, got {}", n),
            "negative number".to_string(),
        ),
        NumberConstraint::Finite { message } if !n.is_finite() => fail(
            "finite",
            message,
            format!("must be finite, got {}", n),
            "finite number".to_string(),
        ),
        NumberConstraint::Lt { bound, message } if n >= *bound => fail(
            "lt",
            message,
            format!("must be less than {}, got {}", bound, n),
            format!("less than {}", bound),
        ),
        NumberConstraint::Gt { bound, message } if n <= *bound => fail(
            "gt",
            message,
            format!("must be greater than {}, got {}", bound, n),
            format!("greater than {}", bound),
        ),
        NumberConstraint::Lte { bound, message } if n > *bound => fail(
            "lte",
            message,
            format!("must be at most {}, got {}", bound, n),
            format!("at most {}", bound),
        ),
        NumberConstraint::Gte { bound, message } if n < *bound => fail(
            "gte",
            message,
            format!("must be at least {}, got {}", bound, n),
            format!("at least {}", bound),
        ),
        NumberConstraint::Range { min, max, message } if n < *min || n > *max => fail(
            "range",
            message,
            format!("must be between {} and {}, got {}", min, max, n),
            format!("between {} and {}", min, max),
        ),
        NumberConstraint::Even { message } if n % 2.0 != 0.0 => fail(
            "even",
            message,
            format!("must be even, got {}", n),
            "even number".to_string(),
        ),
        NumberConstraint::Odd { message } if n % 2.0 == 0.0 || !n.is_finite() => fail(
            "odd",
            message,
            format!("must be odd, got {}", n),
            "odd number".to_string(),
        ),
        NumberConstraint::MultipleOf { step, message } if *step == 0.0 => fail(
            "multiple_of",
            message,
            format!("step must be non-zero, got {}", step),
            "non-zero step".to_string(),
        ),
        NumberConstraint::MultipleOf { step, message } if !is_multiple_of(n, *step) => fail(
            "multiple_of",
            message,
            format!("must be a multiple of {}, got {}", step, n),
            format!("multiple of {}", step),
        ),
        _ => None,
    }
}

fn is_multiple_of(n: f64, step: f64) -> bool {
    let remainder = n % step;
    let tolerance = step.abs() * f64::EPSILON * 10.0;
    remainder.abs() <= tolerance || (remainder.abs() - step.abs()).abs() <= tolerance
}
