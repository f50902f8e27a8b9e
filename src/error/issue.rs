//! Validation issue types.
//!
//! This module provides [`Issue`] for a single validation failure and
//! [`Issues`] for the non-empty collection carried by every failed parse.

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::prelude::*;

use crate::path::JsonPath;

/// The category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Input was absent, had no default and was not optional.
    Required,
    /// Input had the wrong runtime shape and could not be coerced.
    Type,
    /// Input had the right shape but broke a validator-specific rule.
    Refinement,
    /// A schema was malformed. Only produced at construction time.
    Schema,
    /// A composite failure whose `sub_issues` hold the underlying causes.
    Aggregate,
}

impl IssueKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Required => "required",
            IssueKind::Type => "type",
            IssueKind::Refinement => "refinement",
            IssueKind::Schema => "schema",
            IssueKind::Aggregate => "aggregate",
        }
    }

    fn default_code(&self) -> &'static str {
        match self {
            IssueKind::Required => "required",
            IssueKind::Type => "invalid_type",
            IssueKind::Refinement => "refinement",
            IssueKind::Schema => "invalid_schema",
            IssueKind::Aggregate => "aggregate",
        }
    }
}

impl Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure with its location.
///
/// - **path**: where in the input the failure occurred
/// - **kind**: the failure category
/// - **code**: machine-readable code for programmatic handling
/// - **message**: human-readable description
/// - **value**: the offending value, when one exists
/// - **expected**: what was expected instead (optional)
/// - **sub_issues**: the nested failures relayed by a composite validator
///
/// # Example
///
/// ```rust
/// use surely::{Issue, IssueKind, JsonPath};
/// use serde_json::json;
///
/// let issue = Issue::refinement(
///     JsonPath::root().push_field("age"),
///     "positive",
///     "expected a positive number, received -3",
///     json!(-3),
/// );
///
/// assert_eq!(issue.kind, IssueKind::Refinement);
/// assert_eq!(issue.code, "positive");
/// assert_eq!(issue.path.to_string(), "age");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// The path to the value that failed validation.
    pub path: JsonPath,
    /// The failure category.
    pub kind: IssueKind,
    /// Machine-readable error code (e.g., `min_length`).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// The value that was received, if any.
    pub value: Option<Value>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Failures relayed from children or alternatives.
    pub sub_issues: Option<Box<Issues>>,
}

impl Issue {
    /// Creates an issue whose code defaults to the kind's generic code.
    pub fn new(path: JsonPath, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            code: kind.default_code().to_string(),
            message: message.into(),
            value: None,
            expected: None,
            sub_issues: None,
        }
    }

    /// The issue reported for absent input.
    pub fn required(path: JsonPath) -> Self {
        Self::new(
            path,
            IssueKind::Required,
            "expected a value, but received nothing",
        )
        .with_expected("value")
    }

    /// The issue reported when the input has the wrong runtime shape.
    pub fn type_mismatch(path: JsonPath, expected: &str, value: &Value) -> Self {
        Self::new(
            path,
            IssueKind::Type,
            format!("expected {}, received {}", expected, value_type_name(value)),
        )
        .with_expected(expected)
        .with_value(value.clone())
    }

    /// The issue reported when a validator-specific rule fails.
    pub fn refinement(
        path: JsonPath,
        code: impl Into<String>,
        message: impl Into<String>,
        value: Value,
    ) -> Self {
        Self::new(path, IssueKind::Refinement, message)
            .with_code(code)
            .with_value(value)
    }

    /// A composite issue wrapping the failures of children or alternatives.
    pub fn aggregate(
        path: JsonPath,
        message: impl Into<String>,
        value: Value,
        sub_issues: Issues,
    ) -> Self {
        Self::new(path, IssueKind::Aggregate, message)
            .with_value(value)
            .with_sub_issues(sub_issues)
    }

    /// The issue reported for a malformed schema.
    pub fn schema(path: JsonPath, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, IssueKind::Schema, message).with_code(code)
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the offending value and returns self for chaining.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attaches nested issues and returns self for chaining.
    pub fn with_sub_issues(mut self, sub_issues: Issues) -> Self {
        self.sub_issues = Some(Box::new(sub_issues));
        self
    }

    /// Returns the nested issues, if this issue relays any.
    pub fn sub_issues(&self) -> Option<&Issues> {
        self.sub_issues.as_deref()
    }

    /// Returns true if this issue has no nested issues.
    pub fn is_leaf(&self) -> bool {
        self.sub_issues.is_none()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}- {}", "", self, indent = depth * 2)?;
        if let Some(sub) = self.sub_issues() {
            for issue in sub.iter() {
                issue.fmt_indented(f, depth + 1)?;
            }
        }
        Ok(())
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }

        Ok(())
    }
}

impl std::error::Error for Issue {}

/// A non-empty collection of issues.
///
/// `Issues` wraps a `NonEmptyVec<Issue>` so a failed parse always carries at
/// least one issue. It implements `Semigroup`, so failures from independent
/// checks can be combined:
///
/// ```rust
/// use surely::{Issue, Issues, JsonPath};
/// use stillwater::prelude::*;
///
/// let a = Issues::single(Issue::required(JsonPath::from_field("name")));
/// let b = Issues::single(Issue::required(JsonPath::from_field("email")));
///
/// let combined = a.combine(b);
/// assert_eq!(combined.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issues(NonEmptyVec<Issue>);

impl Issues {
    /// Creates an `Issues` containing a single issue.
    pub fn single(issue: Issue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Creates an `Issues` from a `NonEmptyVec`.
    pub fn from_non_empty(issues: NonEmptyVec<Issue>) -> Self {
        Self(issues)
    }

    /// Creates an `Issues` from a vec, or `None` if the vec is empty.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        let mut iter = issues.into_iter();
        let head = Self::single(iter.next()?);
        Some(iter.fold(head, |acc, issue| acc.combine(Self::single(issue))))
    }

    /// Returns the number of top-level issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the top-level issues.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Returns the first issue.
    pub fn first(&self) -> &Issue {
        self.0.head()
    }

    /// Returns all top-level issues at the specified path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&Issue> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all top-level issues with the specified code.
    pub fn with_code(&self, code: &str) -> Vec<&Issue> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns all top-level issues of the specified kind.
    pub fn with_kind(&self, kind: IssueKind) -> Vec<&Issue> {
        self.0.iter().filter(|e| e.kind == kind).collect()
    }

    /// Walks the issue tree depth-first and returns every issue that has
    /// no sub-issues, in reporting order.
    ///
    /// This is the flat list of root causes behind an aggregate failure.
    pub fn leaves(&self) -> Vec<&Issue> {
        let mut out = Vec::new();
        for issue in self.0.iter() {
            collect_leaves(issue, &mut out);
        }
        out
    }

    /// Converts this collection into a `Vec<Issue>`.
    pub fn into_vec(self) -> Vec<Issue> {
        self.0.into_vec()
    }

    /// Returns a reference to the underlying `NonEmptyVec`.
    pub fn as_non_empty_vec(&self) -> &NonEmptyVec<Issue> {
        &self.0
    }
}

fn collect_leaves<'a>(issue: &'a Issue, out: &mut Vec<&'a Issue>) {
    match issue.sub_issues() {
        Some(sub) => {
            for child in sub.iter() {
                collect_leaves(child, out);
            }
        }
        None => out.push(issue),
    }
}

impl Semigroup for Issues {
    fn combine(self, other: Self) -> Self {
        Issues(self.0.combine(other.0))
    }
}

impl Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} issue(s):", self.len())?;
        for issue in self.iter() {
            issue.fmt_indented(f, 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for Issues {}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = Box<dyn Iterator<Item = &'a Issue> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issues>();
    assert_sync::<Issues>();
};

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_issue() {
        let issue = Issue::required(JsonPath::root().push_field("name"));

        assert_eq!(issue.kind, IssueKind::Required);
        assert_eq!(issue.code, "required");
        assert_eq!(issue.path.to_string(), "name");
        assert!(issue.value.is_none());
        assert!(issue.is_leaf());
    }

    #[test]
    fn test_type_mismatch_issue() {
        let issue = Issue::type_mismatch(JsonPath::root(), "string", &json!(12));

        assert_eq!(issue.kind, IssueKind::Type);
        assert_eq!(issue.code, "invalid_type");
        assert_eq!(issue.message, "expected string, received number");
        assert_eq!(issue.value, Some(json!(12)));
        assert_eq!(issue.expected, Some("string".to_string()));
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue::type_mismatch(JsonPath::from_field("email"), "string", &json!(true));
        let display = issue.to_string();
        assert!(display.contains("email: expected string, received boolean"));
        assert!(display.contains("(expected: string)"));
    }

    #[test]
    fn test_issue_display_root() {
        let issue = Issue::new(JsonPath::root(), IssueKind::Refinement, "too short");
        assert!(issue.to_string().contains("(root): too short"));
    }

    #[test]
    fn test_aggregate_carries_sub_issues() {
        let sub = Issues::single(Issue::required(JsonPath::from_field("a")))
            .combine(Issues::single(Issue::required(JsonPath::from_field("b"))));
        let issue = Issue::aggregate(JsonPath::root(), "failed", json!({}), sub);

        assert_eq!(issue.kind, IssueKind::Aggregate);
        assert!(!issue.is_leaf());
        assert_eq!(issue.sub_issues().unwrap().len(), 2);
    }

    #[test]
    fn test_from_vec() {
        assert!(Issues::from_vec(Vec::new()).is_none());

        let issues = Issues::from_vec(vec![
            Issue::required(JsonPath::from_field("a")),
            Issue::required(JsonPath::from_field("b")),
            Issue::required(JsonPath::from_field("c")),
        ])
        .unwrap();
        let paths: Vec<_> = issues.iter().map(|i| i.path.to_string()).collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_leaves_walks_nested_issues() {
        let inner = Issues::from_vec(vec![
            Issue::required(JsonPath::from("user.name")),
            Issue::required(JsonPath::from("user.age")),
        ])
        .unwrap();
        let nested = Issue::aggregate(JsonPath::from_field("user"), "object", json!({}), inner);
        let outer = Issues::single(Issue::aggregate(
            JsonPath::root(),
            "object",
            json!({}),
            Issues::single(nested),
        ))
        .combine(Issues::single(Issue::required(JsonPath::from_field("id"))));

        let leaves: Vec<_> = outer.leaves().iter().map(|i| i.path.to_string()).collect();
        assert_eq!(leaves, vec!["user.name", "user.age", "id"]);
    }

    #[test]
    fn test_filters() {
        let issues = Issues::from_vec(vec![
            Issue::required(JsonPath::from_field("a")),
            Issue::type_mismatch(JsonPath::from_field("a"), "number", &json!("x")),
            Issue::required(JsonPath::from_field("b")),
        ])
        .unwrap();

        assert_eq!(issues.at_path(&JsonPath::from_field("a")).len(), 2);
        assert_eq!(issues.with_code("required").len(), 2);
        assert_eq!(issues.with_kind(IssueKind::Type).len(), 1);
    }

    #[test]
    fn test_issues_display_is_indented() {
        let sub = Issues::single(Issue::required(JsonPath::from_field("name")));
        let issues = Issues::single(Issue::aggregate(JsonPath::root(), "object failed", json!({}), sub));
        let display = issues.to_string();

        assert!(display.contains("1 issue(s)"));
        assert!(display.contains("  - (root): object failed"));
        assert!(display.contains("    - name: expected a value"));
    }

    #[test]
    fn test_semigroup_associativity() {
        let e1 = Issues::single(Issue::new(JsonPath::root(), IssueKind::Refinement, "1"));
        let e2 = Issues::single(Issue::new(JsonPath::root(), IssueKind::Refinement, "2"));
        let e3 = Issues::single(Issue::new(JsonPath::root(), IssueKind::Refinement, "3"));

        let left = e1.clone().combine(e2.clone()).combine(e3.clone());
        let right = e1.combine(e2.combine(e3));

        let left_msgs: Vec<_> = left.iter().map(|e| &e.message).collect();
        let right_msgs: Vec<_> = right.iter().map(|e| &e.message).collect();
        assert_eq!(left_msgs, right_msgs);
    }
}
