//! Integration tests for object validation.

use std::sync::Arc;

use serde_json::{json, Value};
use surely::{DynValidator, IssueKind, ObjectValidator, Schema, UnknownKeys, Validator};

fn unwrap_success<T, E: std::fmt::Debug>(v: stillwater::Validation<T, E>) -> T {
    v.into_result().unwrap()
}

fn unwrap_failure<T, E>(v: stillwater::Validation<T, E>) -> E
where
    T: std::fmt::Debug,
{
    v.into_result().unwrap_err()
}

fn person() -> ObjectValidator {
    Schema::object()
        .field("name", Schema::string())
        .field("age", Schema::number())
}

#[test]
fn test_valid_object() {
    let output = unwrap_success(person().parse_value(&json!({"name": "Ann", "age": 28})))
        .unwrap();
    assert_eq!(Value::Object(output), json!({"name": "Ann", "age": 28}));
}

#[test]
fn test_two_type_issues_in_one_failure() {
    let issues = unwrap_failure(person().parse_value(&json!({"name": 12, "age": "28"})));

    assert_eq!(issues.len(), 1);
    let aggregate = issues.first();
    assert_eq!(aggregate.kind, IssueKind::Aggregate);
    assert!(aggregate.path.is_root());

    let leaves = issues.leaves();
    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].path.to_string(), "name");
    assert_eq!(leaves[0].kind, IssueKind::Type);
    assert_eq!(leaves[1].path.to_string(), "age");
    assert_eq!(leaves[1].kind, IssueKind::Type);
}

#[test]
fn test_missing_field_reports_required_at_path() {
    let issues = unwrap_failure(person().parse_value(&json!({"name": "Ann"})));
    let leaves = issues.leaves();

    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].kind, IssueKind::Required);
    assert_eq!(leaves[0].path.to_string(), "age");
}

#[test]
fn test_rejects_non_objects() {
    for input in [json!([]), json!("x"), json!(1), Value::Null] {
        let issues = unwrap_failure(person().parse_value(&input));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.first().kind, IssueKind::Type);
        assert_eq!(issues.first().expected.as_deref(), Some("object"));
    }
}

#[test]
fn test_nested_paths() {
    let schema = Schema::object().field(
        "address",
        Schema::object()
            .field("city", Schema::string().min_len(1))
            .field("zip", Schema::string().len(5)),
    );

    let issues = unwrap_failure(schema.parse_value(&json!({"address": {"city": "", "zip": "1"}})));
    let paths: Vec<String> = issues.leaves().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["address.city", "address.zip"]);
}

#[test]
fn test_optional_and_default_fields() {
    let schema = Schema::object()
        .field("name", Schema::string())
        .field("nickname", Schema::string().optional())
        .field("role", Schema::string().default("user".to_string()));

    let output = unwrap_success(schema.parse_value(&json!({"name": "Ann"}))).unwrap();
    assert_eq!(Value::Object(output), json!({"name": "Ann", "role": "user"}));
}

#[test]
fn test_unknown_keys_modes() {
    let input = json!({"name": "Ann", "age": 1, "extra": true, "more": 2});

    let issues = unwrap_failure(person().parse_value(&input));
    let leaves = issues.leaves();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].code, "unrecognized_keys");
    assert_eq!(leaves[0].message, "Unexpected keys: \"extra\", \"more\"");
    assert_eq!(leaves[0].value, Some(json!(["extra", "more"])));

    let loose = unwrap_success(person().loose().parse_value(&input)).unwrap();
    assert_eq!(Value::Object(loose), input);

    let stripped = unwrap_success(person().strip().parse_value(&input)).unwrap();
    assert_eq!(Value::Object(stripped), json!({"name": "Ann", "age": 1}));
}

#[test]
fn test_unknown_keys_issue_follows_field_issues() {
    let issues = unwrap_failure(person().parse_value(&json!({"name": 1, "age": 2, "x": 3})));
    let codes: Vec<&str> = issues.leaves().iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["invalid_type", "unrecognized_keys"]);
}

#[test]
fn test_pick_omit_extend() {
    let base = person().strip();

    let picked = base.pick(&["name"]).unwrap();
    assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(picked.unknown_keys_mode(), UnknownKeys::Strip);
    assert!(picked.validate(&json!({"name": "Ann"})));

    assert!(base.pick(&["email"]).is_err());

    let omitted = base.omit(&["name", "missing"]);
    assert_eq!(omitted.keys().collect::<Vec<_>>(), vec!["age"]);

    let extended = base.extend(&Schema::object().field("email", Schema::string().email()));
    assert_eq!(extended.len(), 3);
    assert!(!extended.validate(&json!({"name": "Ann", "age": 1})));
    assert!(extended.validate(&json!({"name": "Ann", "age": 1, "email": "a@b.co"})));
}

#[test]
fn test_derived_validators_start_from_fresh_modifiers() {
    let base = person().optional();
    let picked = base.pick(&["name"]).unwrap();

    assert!(base.parse(None, &surely::JsonPath::root()).is_success());
    assert!(picked.parse(None, &surely::JsonPath::root()).is_failure());
}

#[test]
fn test_as_partial() {
    let partial = Schema::object()
        .field("name", Schema::string())
        .field("role", Schema::string().default("user".to_string()))
        .as_partial();

    let output = unwrap_success(partial.parse_value(&json!({}))).unwrap();
    assert_eq!(Value::Object(output), json!({"role": "user"}));

    // present values are still checked
    assert!(!partial.validate(&json!({"name": 3})));
}

#[test]
fn test_try_from_fields() {
    let fields: Vec<(&str, Arc<dyn DynValidator>)> = vec![
        ("id", Arc::new(Schema::number().int())),
        ("label", Arc::new(Schema::string())),
    ];
    let schema = ObjectValidator::try_from_fields(fields).unwrap();
    assert!(schema.validate(&json!({"id": 1, "label": "x"})));

    let duplicated: Vec<(&str, Arc<dyn DynValidator>)> = vec![
        ("id", Arc::new(Schema::number())),
        ("id", Arc::new(Schema::string())),
    ];
    assert!(ObjectValidator::try_from_fields(duplicated).is_err());
}

#[test]
fn test_object_pipeline_hooks() {
    let schema = person()
        .refine(|o| o.get("age").and_then(Value::as_f64) != Some(0.0), "age must be non-zero")
        .post_transform(|mut o| {
            o.insert("checked".to_string(), json!(true));
            o
        });

    let output = unwrap_success(schema.parse_value(&json!({"name": "A", "age": 2}))).unwrap();
    assert_eq!(output.get("checked"), Some(&json!(true)));

    let issues = unwrap_failure(schema.parse_value(&json!({"name": "A", "age": 0})));
    assert_eq!(issues.first().message, "age must be non-zero");
}
