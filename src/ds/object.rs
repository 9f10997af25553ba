//! Observable objects: dynamic attributes with a notifying write path.
//!
//! `ObservableObject` is the capability the analyzer requires of anything
//! it instruments: per-instance auxiliary listener state, and a write
//! operation that dispatches to interested reactions. The per-attribute
//! listener map doubles as the hook registry - registering a dependency
//! and installing its hook are the same operation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::ds::reaction::Reaction;
use crate::ds::value::Value;

/// Shared handle to an observable object.
pub type ObjRef = Rc<ObservableObject>;

/// An object with dynamic attributes whose writes notify listeners.
pub struct ObservableObject {
    id: Uuid,
    fields: RefCell<HashMap<String, Value>>,
    listeners: RefCell<HashMap<String, Vec<Reaction>>>,
}

impl ObservableObject {
    pub fn new() -> ObjRef {
        Rc::new(ObservableObject {
            id: Uuid::new_v4(),
            fields: RefCell::new(HashMap::new()),
            listeners: RefCell::new(HashMap::new()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Read an attribute. Absent attributes read as `None`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    /// Write an attribute, then synchronously invoke every reaction
    /// listening on it, in indeterminate order.
    ///
    /// The listener set is snapshotted before dispatch so a callback may
    /// mutate this object again; that re-enters `set` on the same call
    /// stack with no reentrancy guard.
    pub fn set(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
        let interested = match self.listeners.borrow().get(name) {
            Some(reactions) => reactions.clone(),
            None => return,
        };
        for reaction in interested {
            reaction.call();
        }
    }

    /// Subscribe `reaction` to writes of `name`.
    ///
    /// Set semantics: a reaction already listening on this attribute is
    /// not added twice, so it notifies at most once per write. Listener
    /// sets only grow; there is no unsubscribe.
    pub fn observe(&self, name: &str, reaction: &Reaction) {
        let mut listeners = self.listeners.borrow_mut();
        let set = listeners.entry(name.to_string()).or_insert_with(Vec::new);
        if !set.iter().any(|r| r.ptr_eq(reaction)) {
            set.push(reaction.clone());
        }
    }

    /// Number of reactions listening on `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners
            .borrow()
            .get(name)
            .map(|set| set.len())
            .unwrap_or(0)
    }
}

impl fmt::Debug for ObservableObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.borrow();
        let mut names: Vec<&String> = fields.keys().collect();
        names.sort();
        f.debug_struct("ObservableObject")
            .field("id", &self.id)
            .field("fields", &names)
            .finish()
    }
}
