//! Integration tests for JsonPath and make_path.

use surely::{make_path, JsonPath, PathSegment};

#[test]
fn test_path_construction_and_display() {
    assert_eq!(JsonPath::root().to_string(), "");
    assert_eq!(JsonPath::root().push_field("name").to_string(), "name");
    assert_eq!(JsonPath::root().push_index(0).to_string(), "0");

    let path = JsonPath::root()
        .push_field("users")
        .push_index(0)
        .push_field("address")
        .push_field("city");
    assert_eq!(path.to_string(), "users.0.address.city");
}

#[test]
fn test_display_agrees_with_make_path() {
    let path = JsonPath::root().push_field("items").push_index(1);
    assert_eq!(path.to_string(), make_path(&make_path("", "items"), "1"));
}

#[test]
fn test_make_path() {
    assert_eq!(make_path("", "key"), "key");
    assert_eq!(make_path("a.b", "c"), "a.b.c");
}

#[test]
fn test_path_segments_preserved() {
    let path = JsonPath::root()
        .push_field("data")
        .push_index(42)
        .push_field("value");

    let segments: Vec<&PathSegment> = path.segments().collect();
    assert_eq!(
        segments,
        vec![
            &PathSegment::Field("data".to_string()),
            &PathSegment::Index(42),
            &PathSegment::Field("value".to_string()),
        ]
    );
}

#[test]
fn test_path_is_immutable() {
    let base = JsonPath::root().push_field("items");

    let path1 = base.push_index(0);
    let path2 = base.push_index(1);
    let path3 = base.push_field("count");

    assert_eq!(base.to_string(), "items");
    assert_eq!(path1.to_string(), "items.0");
    assert_eq!(path2.to_string(), "items.1");
    assert_eq!(path3.to_string(), "items.count");
}

#[test]
fn test_path_parent_chain() {
    let path = JsonPath::root()
        .push_field("a")
        .push_field("b")
        .push_index(0);

    let parent1 = path.parent().expect("should have parent");
    assert_eq!(parent1.to_string(), "a.b");

    let parent2 = parent1.parent().expect("should have parent");
    let parent3 = parent2.parent().expect("should have parent");
    assert!(parent3.is_root());
    assert!(parent3.parent().is_none());
}

#[test]
fn test_from_rendered_path() {
    let path = JsonPath::from("users.3.email");
    assert_eq!(
        path,
        JsonPath::root().push_field("users").push_index(3).push_field("email")
    );
    assert!(JsonPath::from("").is_root());
}

#[test]
fn test_path_hash() {
    use std::collections::HashSet;

    let mut set = HashSet::new();
    set.insert(JsonPath::root().push_field("a"));
    set.insert(JsonPath::root().push_field("b"));
    set.insert(JsonPath::root().push_field("a"));

    assert_eq!(set.len(), 2);
}
