//! String validation.
//!
//! This module provides [`StringValidator`] for validating and normalising
//! string values. Transforms run first, in a fixed order (trim, casing,
//! prefix, suffix, replacements). Constraints are then checked in a fixed
//! order regardless of the order they were added in, and the first one that
//! fails is reported.

use std::fmt;
use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{Issue, Issues, SchemaDefinitionError};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::Validator;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern is valid")
});

/// A well-known string format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Email,
    Url,
    Uuid,
    Ip,
    Mac,
    DateTime,
    Numeric,
    Alphanumeric,
    Hex,
    Alphabetic,
}

impl Format {
    /// Returns the lowercase name of the format, also used as issue code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Url => "url",
            Format::Uuid => "uuid",
            Format::Ip => "ip",
            Format::Mac => "mac",
            Format::DateTime => "datetime",
            Format::Numeric => "numeric",
            Format::Alphanumeric => "alphanumeric",
            Format::Hex => "hex",
            Format::Alphabetic => "alphabetic",
        }
    }

    /// Returns true if `s` is in this format.
    pub fn matches(&self, s: &str) -> bool {
        match self {
            Format::Email => EMAIL_REGEX.is_match(s),
            Format::Url => URL_REGEX.is_match(s),
            Format::Uuid => is_uuid(s),
            Format::Ip => s.parse::<IpAddr>().is_ok(),
            Format::Mac => is_mac(s),
            Format::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            Format::Numeric => !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
            Format::Alphanumeric => !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()),
            Format::Hex => !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit()),
            Format::Alphabetic => !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_uuid(s: &str) -> bool {
    s.len() == 36
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

fn is_mac(s: &str) -> bool {
    let separator = match s.chars().nth(2) {
        Some(c @ (':' | '-')) => c,
        _ => return false,
    };
    let groups: Vec<&str> = s.split(separator).collect();
    groups.len() == 6
        && groups
            .iter()
            .all(|g| g.len() == 2 && g.chars().all(|c| c.is_ascii_hexdigit()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Casing {
    Upper,
    Lower,
    Title,
}

#[derive(Clone)]
enum Replacement {
    Literal { from: String, to: String },
    Pattern { regex: Regex, to: String },
}

/// A constraint applied to string values.
///
/// Variants are declared in evaluation order.
#[derive(Clone)]
enum StringConstraint {
    MinLength { min: usize, message: Option<String> },
    MaxLength { max: usize, message: Option<String> },
    Length { len: usize, message: Option<String> },
    OneOf { options: Vec<String>, message: Option<String> },
    Pattern { regex: Regex, pattern_str: String, message: Option<String> },
    Contains { needle: String, message: Option<String> },
    StartsWith { prefix: String, message: Option<String> },
    EndsWith { suffix: String, message: Option<String> },
    Format { format: Format, message: Option<String> },
}

impl StringConstraint {
    fn rank(&self) -> u8 {
        match self {
            StringConstraint::MinLength { .. } => 0,
            StringConstraint::MaxLength { .. } => 1,
            StringConstraint::Length { .. } => 2,
            StringConstraint::OneOf { .. } => 3,
            StringConstraint::Pattern { .. } => 4,
            StringConstraint::Contains { .. } => 5,
            StringConstraint::StartsWith { .. } => 6,
            StringConstraint::EndsWith { .. } => 7,
            StringConstraint::Format { .. } => 8,
        }
    }

    fn message_mut(&mut self) -> &mut Option<String> {
        match self {
            StringConstraint::MinLength { message, .. }
            | StringConstraint::MaxLength { message, .. }
            | StringConstraint::Length { message, .. }
            | StringConstraint::OneOf { message, .. }
            | StringConstraint::Pattern { message, .. }
            | StringConstraint::Contains { message, .. }
            | StringConstraint::StartsWith { message, .. }
            | StringConstraint::EndsWith { message, .. }
            | StringConstraint::Format { message, .. } => message,
        }
    }
}

/// A validator for string values.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// let username = Schema::string()
///     .trim()
///     .lowercase()
///     .min_len(3)
///     .max_len(20)
///     .pattern(r"^[a-z0-9_]+$")
///     .unwrap();
///
/// let parsed = username.parse_value(&json!("  Ada_L ")).into_result().unwrap();
/// assert_eq!(parsed, Some("ada_l".to_string()));
///
/// assert!(!username.validate(&json!("no spaces allowed")));
/// ```
#[derive(Clone)]
pub struct StringValidator {
    trim: bool,
    casing: Option<Casing>,
    prefix: Option<String>,
    suffix: Option<String>,
    replacements: Vec<Replacement>,
    constraints: Vec<StringConstraint>,
    last_constraint: Option<usize>,
    type_error_message: Option<String>,
    modifiers: Modifiers<String>,
}

impl StringValidator {
    /// Creates a string validator with no transforms or constraints.
    pub fn new() -> Self {
        Self {
            trim: false,
            casing: None,
            prefix: None,
            suffix: None,
            replacements: Vec::new(),
            constraints: Vec::new(),
            last_constraint: None,
            type_error_message: None,
            modifiers: Modifiers::new(),
        }
    }

    fn constrain(mut self, constraint: StringConstraint) -> Self {
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

    /// Strips leading and trailing whitespace.
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Converts to upper case.
    pub fn uppercase(mut self) -> Self {
        self.casing = Some(Casing::Upper);
        self
    }

    /// Converts to lower case.
    pub fn lowercase(mut self) -> Self {
        self.casing = Some(Casing::Lower);
        self
    }

    /// Lower-cases, then upper-cases the first character of every word.
    /// Words start at the beginning and after whitespace, `-` or `_`.
    pub fn capitalize(mut self) -> Self {
        self.casing = Some(Casing::Title);
        self
    }

    /// Prepends `prefix`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Appends `suffix`.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Replaces every occurrence of `from` with `to`.
    pub fn replace(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.replacements.push(Replacement::Literal {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Replaces every match of the regex `pattern` with `to`.
    pub fn replace_regex(
        mut self,
        pattern: &str,
        to: impl Into<String>,
    ) -> Result<Self, SchemaDefinitionError> {
        let regex = Regex::new(pattern)?;
        self.replacements.push(Replacement::Pattern {
            regex,
            to: to.into(),
        });
        Ok(self)
    }

    /// Requires at least `min` characters (Unicode scalar values).
    pub fn min_len(self, min: usize) -> Self {
        self.constrain(StringConstraint::MinLength { min, message: None })
    }

    /// Requires at most `max` characters.
    pub fn max_len(self, max: usize) -> Self {
        self.constrain(StringConstraint::MaxLength { max, message: None })
    }

    /// Requires exactly `len` characters.
    pub fn len(self, len: usize) -> Self {
        self.constrain(StringConstraint::Length { len, message: None })
    }

    /// Requires the string to be one of `options`.
    pub fn one_of<I, S>(self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrain(StringConstraint::OneOf {
            options: options.into_iter().map(Into::into).collect(),
            message: None,
        })
    }

    /// Requires the string to match the regex `pattern`.
    ///
    /// Returns an error if the pattern is not a valid regex.
    ///
    /// ```rust
    /// use surely::{Schema, Validator};
    /// use serde_json::json;
    ///
    /// let digits = Schema::string().pattern(r"^\d+$").unwrap();
    /// assert!(digits.validate(&json!("12345")));
    /// assert!(!digits.validate(&json!("abc")));
    ///
    /// assert!(Schema::string().pattern("(").is_err());
    /// ```
    pub fn pattern(self, pattern: &str) -> Result<Self, SchemaDefinitionError> {
        let regex = Regex::new(pattern)?;
        Ok(self.constrain(StringConstraint::Pattern {
            regex,
            pattern_str: pattern.to_string(),
            message: None,
        }))
    }

    /// Requires the string to contain `needle`.
    pub fn contains(self, needle: impl Into<String>) -> Self {
        self.constrain(StringConstraint::Contains {
            needle: needle.into(),
            message: None,
        })
    }

    /// Requires the string to start with `prefix`.
    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.constrain(StringConstraint::StartsWith {
            prefix: prefix.into(),
            message: None,
        })
    }

    /// Requires the string to end with `suffix`.
    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.constrain(StringConstraint::EndsWith {
            suffix: suffix.into(),
            message: None,
        })
    }

    /// Requires the string to be in the given format.
    pub fn format(self, format: Format) -> Self {
        self.constrain(StringConstraint::Format {
            format,
            message: None,
        })
    }

    pub fn email(self) -> Self {
        self.format(Format::Email)
    }

    pub fn url(self) -> Self {
        self.format(Format::Url)
    }

    pub fn uuid(self) -> Self {
        self.format(Format::Uuid)
    }

    pub fn ip(self) -> Self {
        self.format(Format::Ip)
    }

    pub fn mac(self) -> Self {
        self.format(Format::Mac)
    }

    pub fn datetime(self) -> Self {
        self.format(Format::DateTime)
    }

    pub fn numeric(self) -> Self {
        self.format(Format::Numeric)
    }

    pub fn alphanumeric(self) -> Self {
        self.format(Format::Alphanumeric)
    }

    pub fn hex(self) -> Self {
        self.format(Format::Hex)
    }

    pub fn alphabetic(self) -> Self {
        self.format(Format::Alphabetic)
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the message used
    /// when the value is not a string.
    ///
    /// ```rust
    /// use surely::{Schema, Validator};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string()
    ///     .min_len(5)
    ///     .error("username must be at least 5 characters");
    ///
    /// let issues = schema.parse_value(&json!("hi")).into_result().unwrap_err();
    /// assert_eq!(issues.first().message, "username must be at least 5 characters");
    /// ```
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.last_constraint.and_then(|i| self.constraints.get_mut(i)) {
            Some(constraint) => *constraint.message_mut() = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    fn coerce_input(&self, value: &Value, path: &JsonPath) -> ParseResult<String> {
        match value {
            Value::String(s) => Validation::Success(s.clone()),
            Value::Number(n) if !self.is_strict() => Validation::Success(n.to_string()),
            Value::Bool(b) if !self.is_strict() => Validation::Success(b.to_string()),
            _ => {
                let mut issue = Issue::type_mismatch(path.clone(), "string", value);
                if let Some(message) = &self.type_error_message {
                    issue.message = message.clone();
                }
                Validation::Failure(Issues::single(issue))
            }
        }
    }

    fn transform(&self, mut output: String) -> String {
        if self.trim {
            output = output.trim().to_string();
        }
        output = match self.casing {
            Some(Casing::Upper) => output.to_uppercase(),
            Some(Casing::Lower) => output.to_lowercase(),
            Some(Casing::Title) => title_case(&output),
            None => output,
        };
        if let Some(prefix) = &self.prefix {
            output.insert_str(0, prefix);
        }
        if let Some(suffix) = &self.suffix {
            output.push_str(suffix);
        }
        for replacement in &self.replacements {
            output = match replacement {
                Replacement::Literal { from, to } => output.replace(from.as_str(), to),
                Replacement::Pattern { regex, to } => {
                    regex.replace_all(&output, to.as_str()).into_owned()
                }
            };
        }
        output
    }
}

impl Validator for StringValidator {
    type Output = String;

    fn modifiers(&self) -> &Modifiers<String> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<String> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<String> {
        let output = match self.coerce_input(value, path) {
            Validation::Success(s) => self.transform(s),
            failure => return failure,
        };

        match self
            .constraints
            .iter()
            .find_map(|c| check_constraint(c, &output, path))
        {
            Some(issue) => Validation::Failure(Issues::single(issue)),
            None => Validation::Success(output),
        }
    }

    fn output_to_value(&self, output: String) -> Value {
        Value::String(output)
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.to_lowercase().chars() {
        if at_word_start && !c.is_whitespace() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace() || c == '-' || c == '_';
    }
    out
}

/// Checks a single constraint and returns an issue if it fails.
fn check_constraint(constraint: &StringConstraint, value: &str, path: &JsonPath) -> Option<Issue> {
    let fail = |code: &str, message: &Option<String>, default: String, expected: String| {
        Some(
            Issue::refinement(
                path.clone(),
                code,
                message.clone().unwrap_or(default),
                Value::String(value.to_string()),
            )
            .with_expected(expected),
        )
    };

    match constraint {
        StringConstraint::MinLength { min, message } => {
            let len = value.chars().count();
            if len < *min {
                return fail(
                    "min_length",
                    message,
                    format!("length must be at least {}, got {}", min, len),
                    format!("at least {} characters", min),
                );
            }
        }
        StringConstraint::MaxLength { max, message } => {
            let len = value.chars().count();
            if len > *max {
                return fail(
                    "max_length",
                    message,
                    format!("length must be at most {}, got {}", max, len),
                    format!("at most {} characters", max),
                );
            }
        }
        StringConstraint::Length { len: exact, message } => {
            let len = value.chars().count();
            if len != *exact {
                return fail(
                    "length",
                    message,
                    format!("length must be exactly {}, got {}", exact, len),
                    format!("{} characters", exact),
                );
            }
        }
        StringConstraint::OneOf { options, message } => {
            if !options.iter().any(|o| o == value) {
                let listed = options.join(", ");
                return fail(
                    "one_of",
                    message,
                    format!("must be one of [{}], got '{}'", listed, value),
                    format!("one of [{}]", listed),
                );
            }
        }
        StringConstraint::Pattern {
            regex,
            pattern_str,
            message,
        } => {
            if !regex.is_match(value) {
                return fail(
                    "pattern",
                    message,
                    format!("must match pattern '{}'", pattern_str),
                    format!("string matching '{}'", pattern_str),
                );
            }
        }
        StringConstraint::Contains { needle, message } => {
            if !value.contains(needle.as_str()) {
                return fail(
                    "contains",
                    message,
                    format!("must contain '{}'", needle),
                    format!("string containing '{}'", needle),
                );
            }
        }
        StringConstraint::StartsWith { prefix, message } => {
            if !value.starts_with(prefix.as_str()) {
                return fail(
                    "starts_with",
                    message,
                    format!("must start with '{}'", prefix),
                    format!("string starting with '{}'", prefix),
                );
            }
        }
        StringConstraint::EndsWith { suffix, message } => {
            if !value.ends_with(suffix.as_str()) {
                return fail(
                    "ends_with",
                    message,
                    format!("must end with '{}'", suffix),
                    format!("string ending with '{}'", suffix),
                );
            }
        }
        StringConstraint::Format { format, message } => {
            if !format.matches(value) {
                return fail(
                    format.as_str(),
                    message,
                    format!("must be a valid {}, got '{}'", format, value),
                    format!("valid {}", format),
                );
            }
        }
    }
    None
}
