//! Monitored expressions and the reactions that couple them to callbacks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::bytecode::CodeObject;
use crate::ds::value::Value;

/// Change handler signature: (expression, old value, new value).
pub type ChangeHandler = dyn Fn(&Expression, &Value, &Value);

/// A zero-argument monitored expression.
///
/// Bundles the two halves the analyzer needs: an evaluation thunk that
/// produces the expression's current value, and the decoded instruction
/// stream of its compiled form. The caller asserts that the two
/// correspond; the analyzer only ever walks the instructions, and the
/// reaction only ever runs the thunk.
#[derive(Clone)]
pub struct Expression {
    code: Rc<CodeObject>,
    thunk: Rc<dyn Fn() -> Value>,
}

impl Expression {
    pub fn new(code: CodeObject, thunk: impl Fn() -> Value + 'static) -> Self {
        Expression {
            code: Rc::new(code),
            thunk: Rc::new(thunk),
        }
    }

    /// Evaluate the expression now.
    pub fn eval(&self) -> Value {
        (self.thunk)()
    }

    /// The expression's decoded instruction stream.
    pub fn code(&self) -> &CodeObject {
        &self.code
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expression({} instrs)", self.code.len())
    }
}

struct ReactionInner {
    expression: Expression,
    old_value: RefCell<Value>,
    on_change: RefCell<Rc<ChangeHandler>>,
}

/// Couples a monitored expression to its last-known value and a change
/// callback.
///
/// Cheap to clone - clones share one underlying reaction, which is how
/// the listener sets of every watched attribute, the analyzer and the
/// caller all hold the same instance.
#[derive(Clone)]
pub struct Reaction {
    inner: Rc<ReactionInner>,
}

impl Reaction {
    /// Capture the expression and its current value as the baseline.
    pub(crate) fn new(expression: Expression) -> Self {
        let baseline = expression.eval();
        Reaction {
            inner: Rc::new(ReactionInner {
                expression,
                old_value: RefCell::new(baseline),
                on_change: RefCell::new(Rc::new(|_, _, _| {})),
            }),
        }
    }

    /// Register the change handler. Single slot: replaces any previous
    /// handler.
    pub fn on_change(&self, handler: impl Fn(&Expression, &Value, &Value) + 'static) {
        *self.inner.on_change.borrow_mut() = Rc::new(handler);
    }

    /// Re-evaluate the expression; if the result differs from the stored
    /// value, invoke the handler with (expression, old, new) and store the
    /// new value. An unchanged result is silently absorbed.
    pub fn call(&self) {
        let new_value = self.inner.expression.eval();
        let old_value = self.inner.old_value.borrow().clone();
        if old_value != new_value {
            // Clone the handler out so no borrow is held while it runs;
            // the handler may re-enter this reaction or replace itself.
            let handler = {
                let slot = self.inner.on_change.borrow();
                Rc::clone(&*slot)
            };
            (*handler)(&self.inner.expression, &old_value, &new_value);
            *self.inner.old_value.borrow_mut() = new_value;
        }
    }

    /// The last observed value of the expression.
    pub fn value(&self) -> Value {
        self.inner.old_value.borrow().clone()
    }

    pub fn expression(&self) -> &Expression {
        &self.inner.expression
    }

    /// Identity comparison, used for listener-set deduplication.
    pub(crate) fn ptr_eq(&self, other: &Reaction) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reaction(value: {:?})", self.inner.old_value.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_expression(source: Rc<Cell<i64>>) -> Expression {
        Expression::new(CodeObject::new(), move || Value::Int(source.get()))
    }

    #[test]
    fn test_baseline_captured_at_construction() {
        let source = Rc::new(Cell::new(7));
        let reaction = Reaction::new(counting_expression(Rc::clone(&source)));
        source.set(8);
        assert_eq!(reaction.value(), Value::Int(7));
    }

    #[test]
    fn test_call_fires_on_difference_only() {
        let source = Cell::new(1);
        let source = Rc::new(source);
        let reaction = Reaction::new(counting_expression(Rc::clone(&source)));

        let fired = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&fired);
        reaction.on_change(move |_, old, new| {
            log.borrow_mut().push((old.clone(), new.clone()));
        });

        reaction.call(); // unchanged, absorbed
        assert!(fired.borrow().is_empty());

        source.set(2);
        reaction.call();
        assert_eq!(
            fired.borrow().as_slice(),
            &[(Value::Int(1), Value::Int(2))]
        );

        reaction.call(); // unchanged again
        assert_eq!(fired.borrow().len(), 1);
    }

    #[test]
    fn test_on_change_replaces_previous_handler() {
        let source = Rc::new(Cell::new(1));
        let reaction = Reaction::new(counting_expression(Rc::clone(&source)));

        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let hits = Rc::clone(&first);
        reaction.on_change(move |_, _, _| hits.set(hits.get() + 1));
        let hits = Rc::clone(&second);
        reaction.on_change(move |_, _, _| hits.set(hits.get() + 1));

        source.set(2);
        reaction.call();
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let source = Rc::new(Cell::new(1));
        let reaction = Reaction::new(counting_expression(Rc::clone(&source)));
        let alias = reaction.clone();
        assert!(reaction.ptr_eq(&alias));

        source.set(5);
        alias.call();
        assert_eq!(reaction.value(), Value::Int(5));
    }
}
