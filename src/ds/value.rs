//! Runtime values flowing through expressions and observable objects.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::bytecode::FuncDef;
use crate::ds::object::ObjRef;

/// The global name-to-value mapping visible to a monitored expression.
pub type Bindings = HashMap<String, Value>;

/// A named constructor marker.
///
/// Calling a class constructs an instance; the analyzer treats the result
/// as opaque and never traces constructor bodies.
#[derive(Debug)]
pub struct ClassDef {
    pub name: String,
}

impl ClassDef {
    pub fn new(name: &str) -> Self {
        ClassDef {
            name: name.to_string(),
        }
    }
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An observable object with dynamic attributes.
    Object(ObjRef),
    /// A user-defined callable the analyzer can recurse into.
    Function(Rc<FuncDef>),
    /// A constructor; calling it is opaque.
    Class(Rc<ClassDef>),
}

impl PartialEq for Value {
    /// Definitional equality: structural for scalars, reference identity
    /// for objects, functions and classes.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(o) => write!(f, "<object {}>", o.id()),
            Value::Function(func) => write!(f, "<fn {}>", func.name),
            Value::Class(class) => write!(f, "<class {}>", class.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::CodeObject;
    use crate::ds::object::ObservableObject;

    #[test]
    fn test_scalar_equality() {
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Int(2));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Str("a".to_string()), Value::Str("a".to_string()));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn test_object_equality_is_identity() {
        let a = ObservableObject::new();
        let b = ObservableObject::new();
        assert_eq!(Value::Object(Rc::clone(&a)), Value::Object(Rc::clone(&a)));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn test_function_equality_is_identity() {
        let f = Rc::new(FuncDef::new("f", &[], CodeObject::new()));
        let g = Rc::new(FuncDef::new("f", &[], CodeObject::new()));
        assert_eq!(Value::Function(Rc::clone(&f)), Value::Function(Rc::clone(&f)));
        assert_ne!(Value::Function(f), Value::Function(g));
    }
}
