extern crate aexpr;

use aexpr::ds::object::ObservableObject;
use aexpr::ds::value::Value;

#[test]
fn test_get_set_roundtrip() {
    let obj = ObservableObject::new();
    assert_eq!(obj.get("x"), None);
    obj.set("x", Value::Int(1));
    assert_eq!(obj.get("x"), Some(Value::Int(1)));
}

#[test]
fn test_overwrite_replaces_value() {
    let obj = ObservableObject::new();
    obj.set("x", Value::Int(1));
    obj.set("x", Value::Str("one".to_string()));
    assert_eq!(obj.get("x"), Some(Value::Str("one".to_string())));
}

#[test]
fn test_unobserved_write_is_plain() {
    // Writes to attributes nobody listens on just store the value.
    let obj = ObservableObject::new();
    obj.set("x", Value::Int(1));
    assert_eq!(obj.listener_count("x"), 0);
}

#[test]
fn test_ids_are_unique() {
    let a = ObservableObject::new();
    let b = ObservableObject::new();
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_attributes_are_independent() {
    let obj = ObservableObject::new();
    obj.set("x", Value::Int(1));
    obj.set("y", Value::Int(2));
    assert_eq!(obj.get("x"), Some(Value::Int(1)));
    assert_eq!(obj.get("y"), Some(Value::Int(2)));
    assert_eq!(obj.get("z"), None);
}
