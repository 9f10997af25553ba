//! Abstractly-tracked stack and variable slots.

use crate::ds::object::ObjRef;
use crate::ds::value::Value;

/// One abstract operand-stack or variable slot.
///
/// Tags a tracked value as concrete, placeholder (precision was lost, do
/// not dereference) or intrinsic (resolves outside the supplied global
/// bindings, treat as opaque and never recurse into it). A slot produced
/// by an attribute read also records the object it was read from, so a
/// method found there can later be analyzed with that object as its
/// receiver. Source tracking is shallow - one level. Slots are immutable
/// after construction.
#[derive(Debug, Clone)]
pub struct Slot {
    payload: Option<Value>,
    source: Option<ObjRef>,
    placeholder: bool,
    intrinsic: bool,
}

impl Slot {
    /// A known value.
    pub fn concrete(value: Value) -> Self {
        Slot {
            payload: Some(value),
            source: None,
            placeholder: false,
            intrinsic: false,
        }
    }

    /// A known value read off `source` as an attribute.
    pub fn with_source(value: Value, source: ObjRef) -> Self {
        Slot {
            payload: Some(value),
            source: Some(source),
            placeholder: false,
            intrinsic: false,
        }
    }

    /// An unknown value: abstract evaluation lost precision here.
    pub fn placeholder() -> Self {
        Slot {
            payload: None,
            source: None,
            placeholder: true,
            intrinsic: false,
        }
    }

    /// A reference resolving outside the tracked global namespace.
    pub fn intrinsic() -> Self {
        Slot {
            payload: None,
            source: None,
            placeholder: false,
            intrinsic: true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn is_intrinsic(&self) -> bool {
        self.intrinsic
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn source(&self) -> Option<&ObjRef> {
        self.source.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::object::ObservableObject;

    #[test]
    fn test_constructor_flags() {
        let concrete = Slot::concrete(Value::Int(1));
        assert!(!concrete.is_placeholder());
        assert!(!concrete.is_intrinsic());
        assert_eq!(concrete.payload(), Some(&Value::Int(1)));
        assert!(concrete.source().is_none());

        let placeholder = Slot::placeholder();
        assert!(placeholder.is_placeholder());
        assert!(placeholder.payload().is_none());

        let intrinsic = Slot::intrinsic();
        assert!(intrinsic.is_intrinsic());
        assert!(!intrinsic.is_placeholder());
        assert!(intrinsic.payload().is_none());
    }

    #[test]
    fn test_source_recorded_on_attribute_reads() {
        let obj = ObservableObject::new();
        let slot = Slot::with_source(Value::Int(2), std::rc::Rc::clone(&obj));
        assert_eq!(slot.payload(), Some(&Value::Int(2)));
        assert!(std::rc::Rc::ptr_eq(slot.source().unwrap(), &obj));
    }
}
