//! Integration tests for string validation.

use serde_json::json;
use surely::{Format, IssueKind, Schema, Validator};

fn unwrap_success<T, E: std::fmt::Debug>(v: stillwater::Validation<T, E>) -> T {
    v.into_result().unwrap()
}

fn unwrap_failure<T, E>(v: stillwater::Validation<T, E>) -> E
where
    T: std::fmt::Debug,
{
    v.into_result().unwrap_err()
}

#[test]
fn test_matching_input_round_trips() {
    let schema = Schema::string();
    for s in ["", "hello", "ünïcödé"] {
        assert_eq!(unwrap_success(schema.parse_value(&json!(s))), Some(s.to_string()));
    }
}

#[test]
fn test_strict_rejects_other_types() {
    let schema = Schema::string();
    for input in [json!(1), json!(true), json!(null), json!([]), json!({})] {
        let issues = unwrap_failure(schema.parse_value(&input));
        assert_eq!(issues.first().kind, IssueKind::Type);
    }
}

#[test]
fn test_coerce_numbers_and_booleans() {
    let schema = Schema::string().coerce();
    assert_eq!(unwrap_success(schema.parse_value(&json!(12))), Some("12".to_string()));
    assert_eq!(unwrap_success(schema.parse_value(&json!(1.5))), Some("1.5".to_string()));
    assert_eq!(unwrap_success(schema.parse_value(&json!(false))), Some("false".to_string()));
    assert!(!schema.validate(&json!(null)));
}

#[test]
fn test_length_counts_characters() {
    let schema = Schema::string().min_len(2).max_len(3);
    assert!(schema.validate(&json!("日本")));
    assert!(!schema.validate(&json!("日")));

    let issues = unwrap_failure(schema.parse_value(&json!("abcd")));
    assert_eq!(issues.first().code, "max_length");
    assert_eq!(issues.first().message, "length must be at most 3, got 4");
}

#[test]
fn test_transforms_run_in_order() {
    let schema = Schema::string()
        .trim()
        .capitalize()
        .prefix("<")
        .suffix(">")
        .replace(" ", "_");

    assert_eq!(
        unwrap_success(schema.parse_value(&json!("  hello big-world  "))),
        Some("<Hello_Big-World>".to_string())
    );
}

#[test]
fn test_constraints_see_transformed_value() {
    let schema = Schema::string().trim().min_len(3);
    assert!(!schema.validate(&json!("  a  ")));

    let upper = Schema::string().uppercase().one_of(["YES", "NO"]);
    assert_eq!(unwrap_success(upper.parse_value(&json!("yes"))), Some("YES".to_string()));
}

#[test]
fn test_replace_regex() {
    let schema = Schema::string().replace_regex(r"\s+", " ").unwrap();
    assert_eq!(
        unwrap_success(schema.parse_value(&json!("a \t\n b"))),
        Some("a b".to_string())
    );
    assert!(Schema::string().replace_regex("[", "").is_err());
}

#[test]
fn test_first_failing_constraint_reported() {
    let schema = Schema::string().ends_with("!").min_len(5);

    let issues = unwrap_failure(schema.parse_value(&json!("hi")));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.first().code, "min_length");
}

#[test]
fn test_substring_constraints() {
    let schema = Schema::string().starts_with("ab").contains("c").ends_with("d");
    assert!(schema.validate(&json!("abcd")));

    assert_eq!(unwrap_failure(schema.parse_value(&json!("xbcd"))).first().code, "starts_with");
    assert_eq!(unwrap_failure(schema.parse_value(&json!("abxd"))).first().code, "contains");
    assert_eq!(unwrap_failure(schema.parse_value(&json!("abcx"))).first().code, "ends_with");
}

#[test]
fn test_formats() {
    let cases = [
        (Format::Email, "user@example.com", "user@"),
        (Format::Url, "https://example.com/a?b=c", "example.com"),
        (Format::Uuid, "123e4567-e89b-12d3-a456-426614174000", "123e4567e89b12d3a456426614174000"),
        (Format::Ip, "192.168.0.1", "256.1.1.1"),
        (Format::Ip, "::1", "1::2::3"),
        (Format::Mac, "00:1A:2b:3C:4d:5E", "00:1A:2b:3C:4d"),
        (Format::DateTime, "2024-01-01T10:00:00Z", "2024-01-01"),
        (Format::Numeric, "0123", "12.5"),
        (Format::Alphanumeric, "abc123", "abc-123"),
        (Format::Hex, "deadBEEF", "xyz"),
        (Format::Alphabetic, "abc", "abc1"),
    ];

    for (format, good, bad) in cases {
        let schema = Schema::string().format(format);
        assert!(schema.validate(&json!(good)), "{} should accept {}", format, good);

        let issues = unwrap_failure(schema.parse_value(&json!(bad)));
        assert_eq!(issues.first().code, format.as_str(), "{} should reject {}", format, bad);
    }
}

#[test]
fn test_format_shortcuts() {
    assert!(Schema::string().email().validate(&json!("a@b.io")));
    assert!(!Schema::string().uuid().validate(&json!("nope")));
    assert!(Schema::string().hex().validate(&json!("ff")));
}

#[test]
fn test_error_overrides_most_recent_constraint() {
    let schema = Schema::string()
        .min_len(3)
        .error("too short")
        .max_len(5)
        .error("too long");

    assert_eq!(unwrap_failure(schema.parse_value(&json!("ab"))).first().message, "too short");
    assert_eq!(unwrap_failure(schema.parse_value(&json!("abcdef"))).first().message, "too long");
}

#[test]
fn test_error_without_constraints_overrides_type_message() {
    let schema = Schema::string().error("name must be text");
    let issues = unwrap_failure(schema.parse_value(&json!(5)));
    assert_eq!(issues.first().message, "name must be text");
    assert_eq!(issues.first().kind, IssueKind::Type);
}

#[test]
fn test_pattern() {
    let schema = Schema::string().pattern(r"^[a-z]+$").unwrap();
    assert!(schema.validate(&json!("abc")));

    let issues = unwrap_failure(schema.parse_value(&json!("ABC")));
    assert_eq!(issues.first().code, "pattern");
    assert_eq!(issues.first().value, Some(json!("ABC")));
}
