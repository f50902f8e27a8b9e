//! Tests for sharing validators across threads.

use serde_json::json;
use std::sync::Arc;
use std::thread;
use surely::{
    ArrayValidator, DateValidator, DynValidator, EnumValidator, LazyValidator, NumberValidator,
    ObjectValidator, OptionalValidator, Schema, StringValidator, TupleValidator, UnionValidator,
    Validator,
};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_validators_are_send_sync() {
    assert_send_sync::<StringValidator>();
    assert_send_sync::<NumberValidator>();
    assert_send_sync::<EnumValidator>();
    assert_send_sync::<DateValidator>();
    assert_send_sync::<ObjectValidator>();
    assert_send_sync::<OptionalValidator>();
    assert_send_sync::<UnionValidator>();
    assert_send_sync::<ArrayValidator<StringValidator>>();
    assert_send_sync::<TupleValidator<(StringValidator, NumberValidator)>>();
    assert_send_sync::<LazyValidator<ObjectValidator, fn() -> ObjectValidator>>();
    assert_send_sync::<Arc<dyn DynValidator>>();
}

fn user() -> ObjectValidator {
    Schema::object()
        .field("name", Schema::string().min_len(1))
        .field("age", Schema::number().int().positive())
}

#[test]
fn test_concurrent_validation() {
    let schema = Arc::new(user());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                assert!(schema.validate(&json!({
                    "name": format!("User{}", i),
                    "age": 20 + i
                })));
                assert!(!schema.validate(&json!({"name": "", "age": -i})));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn node() -> ObjectValidator {
    Schema::object()
        .field("value", Schema::number())
        .field("next", Schema::lazy(node).optional())
}

#[test]
fn test_concurrent_lazy_initialisation() {
    let schema = Arc::new(Schema::lazy(node));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let result = schema.parse_value(&json!({
                    "value": i,
                    "next": {"value": i + 1, "next": {"value": i + 2}}
                }));
                assert!(result.is_success());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(schema.is_initialized());
}

#[test]
fn test_concurrent_failures_are_independent() {
    let schema = Arc::new(Schema::array(Schema::number()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let mut items = vec![json!(0); 8];
                items[i] = json!("bad");
                let issues = schema
                    .parse_value(&json!(items))
                    .into_result()
                    .unwrap_err();
                let leaves = issues.leaves();
                assert_eq!(leaves.len(), 1);
                assert_eq!(leaves[0].path.to_string(), i.to_string());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
