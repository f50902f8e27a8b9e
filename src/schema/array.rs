//! Array validation.
//!
//! This module provides [`ArrayValidator`] for validating arrays whose every
//! element matches one item validator, with length, uniqueness and dedupe
//! options.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use stillwater::Validation;
use tracing::{debug, trace};

use crate::error::{Issue, Issues};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::Validator;

type KeyFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A constraint applied to arrays.
#[derive(Clone)]
enum ArrayConstraint {
    MinLength { min: usize, message: Option<String> },
    MaxLength { max: usize, message: Option<String> },
    Length { len: usize, message: Option<String> },
    Unique { message: Option<String> },
    UniqueBy { key_fn: KeyFn, message: Option<String> },
}

/// A validator for arrays.
///
/// The input must be an array. Every element is parsed against the item
/// validator at `path.i` and every element failure is collected into one
/// `aggregate` issue. Length constraints are checked on the input length and
/// reported as sibling issues of that aggregate. Uniqueness is checked on
/// the parsed elements, and only when all of them passed.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// let tags = Schema::array(Schema::string().min_len(1))
///     .non_empty()
///     .max_len(10);
///
/// assert!(tags.validate(&json!(["rust", "json"])));
/// assert!(!tags.validate(&json!([])));
/// ```
#[derive(Clone)]
pub struct ArrayValidator<V: Validator> {
    item: V,
    constraints: Vec<ArrayConstraint>,
    dedupe: bool,
    type_error_message: Option<String>,
    modifiers: Modifiers<Vec<V::Output>>,
}

impl<V: Validator> ArrayValidator<V> {
    /// Creates an array validator with the given item validator.
    pub fn new(item: V) -> Self {
        Self {
            item,
            constraints: Vec::new(),
            dedupe: false,
            type_error_message: None,
            modifiers: Modifiers::new(),
        }
    }

    /// Requires at least `min` elements.
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MinLength { min, message: None });
        self
    }

    /// Requires at most `max` elements.
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MaxLength { max, message: None });
        self
    }

    /// Requires exactly `len` elements.
    pub fn len(mut self, len: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::Length { len, message: None });
        self
    }

    /// Requires at least one element. Equivalent to `.min_len(1)`.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Requires all parsed elements to be distinct.
    ///
    /// ```rust
    /// use surely::{Schema, Validator};
    /// use serde_json::json;
    ///
    /// let ids = Schema::array(Schema::number()).unique();
    /// assert!(ids.validate(&json!([1, 2, 3])));
    /// assert!(!ids.validate(&json!([1, 2, 1])));
    /// ```
    pub fn unique(mut self) -> Self {
        self.constraints
            .push(ArrayConstraint::Unique { message: None });
        self
    }

    /// Requires the key computed from each parsed element to be distinct.
    ///
    /// ```rust
    /// use surely::{Schema, Validator};
    /// use serde_json::{json, Value};
    ///
    /// let users = Schema::array(
    ///     Schema::object()
    ///         .field("id", Schema::number())
    ///         .field("name", Schema::string()),
    /// )
    /// .unique_by(|user| user.get("id").cloned().unwrap_or(Value::Null));
    ///
    /// assert!(!users.validate(&json!([
    ///     {"id": 1, "name": "Alice"},
    ///     {"id": 1, "name": "Bob"}
    /// ])));
    /// ```
    pub fn unique_by<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.constraints.push(ArrayConstraint::UniqueBy {
            key_fn: Arc::new(key_fn),
            message: None,
        });
        self
    }

    /// Removes later duplicates from the output, keeping first occurrences.
    pub fn dedupe(mut self) -> Self {
        self.dedupe = true;
        self
    }

    /// Sets a custom message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the message used
    /// when the value is not an array.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                ArrayConstraint::MinLength { message: m, .. }
                | ArrayConstraint::MaxLength { message: m, .. }
                | ArrayConstraint::Length { message: m, .. }
                | ArrayConstraint::Unique { message: m }
                | ArrayConstraint::UniqueBy { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Returns the item validator.
    pub fn item(&self) -> &V {
        &self.item
    }

    fn length_issues(&self, len: usize, value: &Value, path: &JsonPath) -> Vec<Issue> {
        let mut issues = Vec::new();
        for constraint in &self.constraints {
            match constraint {
                ArrayConstraint::MinLength { min, message } if len < *min => {
                    let msg = message.clone().unwrap_or_else(|| {
                        format!("array must have at least {} items, got {}", min, len)
                    });
                    issues.push(
                        Issue::refinement(path.clone(), "min_length", msg, value.clone())
                            .with_expected(format!("at least {} items", min)),
                    );
                }
                ArrayConstraint::MaxLength { max, message } if len > *max => {
                    let msg = message.clone().unwrap_or_else(|| {
                        format!("array must have at most {} items, got {}", max, len)
                    });
                    issues.push(
                        Issue::refinement(path.clone(), "max_length", msg, value.clone())
                            .with_expected(format!("at most {} items", max)),
                    );
                }
                ArrayConstraint::Length { len: exact, message } if len != *exact => {
                    let msg = message.clone().unwrap_or_else(|| {
                        format!("array must have exactly {} items, got {}", exact, len)
                    });
                    issues.push(
                        Issue::refinement(path.clone(), "length", msg, value.clone())
                            .with_expected(format!("{} items", exact)),
                    );
                }
                _ => {}
            }
        }
        issues
    }

    fn uniqueness_issues(&self, parsed: &[Value], value: &Value, path: &JsonPath) -> Vec<Issue> {
        let mut issues = Vec::new();
        for constraint in &self.constraints {
            let (duplicates, message, what) = match constraint {
                ArrayConstraint::Unique { message } => {
                    (find_duplicates(parsed, |v| v.clone()), message, "value")
                }
                ArrayConstraint::UniqueBy { key_fn, message } => {
                    (find_duplicates(parsed, |v| key_fn(v)), message, "key")
                }
                _ => continue,
            };
            for indices in duplicates {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("duplicate {} at indices {:?}", what, indices));
                issues.push(Issue::refinement(path.clone(), "unique", msg, value.clone()));
            }
        }
        issues
    }
}

impl<V: Validator> Validator for ArrayValidator<V> {
    type Output = Vec<V::Output>;

    fn modifiers(&self) -> &Modifiers<Self::Output> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<Self::Output> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Self::Output> {
        let arr = match value.as_array() {
            Some(a) => a,
            None => {
                let mut issue = Issue::type_mismatch(path.clone(), "array", value);
                if let Some(message) = &self.type_error_message {
                    issue.message = message.clone();
                }
                return Validation::Failure(Issues::single(issue));
            }
        };

        trace!(path = %path, len = arr.len(), "validating array");

        let mut issues = self.length_issues(arr.len(), value, path);

        let mut parsed = Vec::with_capacity(arr.len());
        let mut element_issues = Vec::new();
        for (index, item) in arr.iter().enumerate() {
            match self.item.parse_present(item, &path.push_index(index)) {
                Validation::Success(v) => parsed.push(v),
                Validation::Failure(e) => element_issues.extend(e),
            }
        }

        if let Some(sub) = Issues::from_vec(element_issues) {
            issues.push(Issue::aggregate(
                path.clone(),
                format!("Array validation failed with {} issue(s)", sub.len()),
                value.clone(),
                sub,
            ));
        } else if self.dedupe || self.constraints.iter().any(ArrayConstraint::is_uniqueness) {
            let as_values: Vec<Value> = parsed
                .iter()
                .map(|v| self.item.output_to_value(v.clone()))
                .collect();
            issues.extend(self.uniqueness_issues(&as_values, value, path));

            if self.dedupe && issues.is_empty() {
                parsed = dedupe_by_value(parsed, &as_values);
            }
        }

        match Issues::from_vec(issues) {
            None => Validation::Success(parsed),
            Some(issues) => {
                debug!(path = %path, issues = issues.len(), "array validation failed");
                Validation::Failure(issues)
            }
        }
    }

    fn output_to_value(&self, output: Self::Output) -> Value {
        Value::Array(
            output
                .into_iter()
                .map(|item| self.item.output_to_value(item))
                .collect(),
        )
    }
}

impl ArrayConstraint {
    fn is_uniqueness(&self) -> bool {
        matches!(
            self,
            ArrayConstraint::Unique { .. } | ArrayConstraint::UniqueBy { .. }
        )
    }
}

/// Groups indices by key, returning only the groups with more than one
/// index, ordered by first occurrence.
fn find_duplicates<F>(arr: &[Value], key_fn: F) -> Vec<Vec<usize>>
where
    F: Fn(&Value) -> Value,
{
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, item) in arr.iter().enumerate() {
        let key = key_fn(item);
        // JSON text is a total key for any value
        let key_str = serde_json::to_string(&key).unwrap_or_else(|_| format!("{:?}", key));
        let indices = seen.entry(key_str.clone()).or_default();
        if indices.is_empty() {
            order.push(key_str);
        }
        indices.push(i);
    }
    order
        .into_iter()
        .filter_map(|key| seen.remove(&key))
        .filter(|indices| indices.len() > 1)
        .collect()
}

fn dedupe_by_value<T>(parsed: Vec<T>, as_values: &[Value]) -> Vec<T> {
    let mut later_duplicates = vec![false; parsed.len()];
    for indices in find_duplicates(as_values, |v| v.clone()) {
        for &i in &indices[1..] {
            later_duplicates[i] = true;
        }
    }
    parsed
        .into_iter()
        .zip(later_duplicates)
        .filter_map(|(item, duplicate)| (!duplicate).then_some(item))
        .collect()
}
