//! Integration tests for number validation.

use serde_json::json;
use surely::{IssueKind, Schema, Validator};

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
fn test_strict_numbers() {
    let schema = Schema::number();
    assert_eq!(unwrap_success(schema.parse_value(&json!(42))), Some(42.0));
    assert_eq!(unwrap_success(schema.parse_value(&json!(-1.25))), Some(-1.25));

    for input in [json!("42"), json!(true), json!(null)] {
        let issues = unwrap_failure(schema.parse_value(&input));
        assert_eq!(issues.first().kind, IssueKind::Type);
        assert_eq!(issues.first().expected.as_deref(), Some("number"));
    }
}

#[test]
fn test_coercion() {
    let schema = Schema::number().coerce();
    assert_eq!(unwrap_success(schema.parse_value(&json!(" 3.5 "))), Some(3.5));
    assert_eq!(unwrap_success(schema.parse_value(&json!(true))), Some(1.0));
    assert_eq!(unwrap_success(schema.parse_value(&json!(false))), Some(0.0));
    assert!(!schema.validate(&json!("abc")));
    assert!(!schema.validate(&json!("NaN")));
}

#[test]
fn test_int_and_float_are_type_issues() {
    let int = Schema::number().int();
    assert!(int.validate(&json!(3)));
    let issues = unwrap_failure(int.parse_value(&json!(3.5)));
    assert_eq!(issues.first().kind, IssueKind::Type);
    assert_eq!(issues.first().expected.as_deref(), Some("integer"));

    let float = Schema::number().float();
    assert!(float.validate(&json!(0.5)));
    assert!(!float.validate(&json!(2)));
}

#[test]
fn test_bounds() {
    let schema = Schema::number().gt(0.0).lte(10.0);
    assert!(schema.validate(&json!(10)));
    assert_eq!(unwrap_failure(schema.parse_value(&json!(0))).first().code, "gt");
    assert_eq!(unwrap_failure(schema.parse_value(&json!(10.5))).first().code, "lte");

    let exclusive = Schema::number().gte(1.0).lt(2.0);
    assert!(exclusive.validate(&json!(1)));
    assert_eq!(unwrap_failure(exclusive.parse_value(&json!(2))).first().code, "lt");

    let range = Schema::number().range(1.0, 5.0);
    let issues = unwrap_failure(range.parse_value(&json!(6)));
    assert_eq!(issues.first().code, "range");
    assert_eq!(issues.first().message, "must be between 1 and 5, got 6");
}

#[test]
fn test_sign_and_parity() {
    assert!(!Schema::number().positive().validate(&json!(0)));
    assert!(Schema::number().negative().validate(&json!(-0.5)));
    assert!(Schema::number().even().validate(&json!(4)));
    assert!(!Schema::number().even().validate(&json!(3)));
    assert!(Schema::number().odd().validate(&json!(-3)));
    assert_eq!(
        unwrap_failure(Schema::number().odd().parse_value(&json!(2))).first().code,
        "odd"
    );
}

#[test]
fn test_multiple_of_with_tolerance() {
    let cents = Schema::number().multiple_of(0.01);
    assert!(cents.validate(&json!(0.3)));
    assert!(cents.validate(&json!(0.07)));
    assert!(!cents.validate(&json!(0.005)));

    assert!(Schema::number().multiple_of(3.0).validate(&json!(-9)));

    let issues = unwrap_failure(Schema::number().multiple_of(0.0).parse_value(&json!(1)));
    assert_eq!(issues.first().code, "multiple_of");
    assert_eq!(issues.first().kind, IssueKind::Refinement);
}

#[test]
fn test_finite_after_coercion() {
    let schema = Schema::number().coerce().finite();
    assert!(schema.validate(&json!("12")));
    assert_eq!(unwrap_failure(schema.parse_value(&json!("inf"))).first().code, "finite");
}

#[test]
fn test_rounding_then_clamp_then_constraints() {
    let schema = Schema::number().ceil().clamp(10.0, 0.0).int();
    assert_eq!(unwrap_success(schema.parse_value(&json!(4.1))), Some(5.0));
    assert_eq!(unwrap_success(schema.parse_value(&json!(99))), Some(10.0));
    assert_eq!(unwrap_success(schema.parse_value(&json!(-3.5))), Some(0.0));

    let floor = Schema::number().floor();
    assert_eq!(unwrap_success(floor.parse_value(&json!(-1.5))), Some(-2.0));
}

#[test]
fn test_constraints_checked_in_fixed_order() {
    let schema = Schema::number().multiple_of(2.0).positive();
    let issues = unwrap_failure(schema.parse_value(&json!(-3)));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.first().code, "positive");
}

#[test]
fn test_error_override() {
    let schema = Schema::number().positive().error("must be above zero");
    assert_eq!(
        unwrap_failure(schema.parse_value(&json!(-1))).first().message,
        "must be above zero"
    );

    let typed = Schema::number().error("age must be a number");
    assert_eq!(
        unwrap_failure(typed.parse_value(&json!("x"))).first().message,
        "age must be a number"
    );
}

#[test]
fn test_output_to_value_prefers_integers() {
    let schema = Schema::number();
    assert_eq!(schema.output_to_value(3.0), json!(3));
    assert_eq!(schema.output_to_value(3.5), json!(3.5));
    assert_eq!(schema.output_to_value(f64::INFINITY), json!(null));
}
