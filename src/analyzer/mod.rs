//! Dependency discovery: the `aexpr` driver and the abstract evaluator.
//!
//! `aexpr` runs one static pass over a monitored expression's instruction
//! stream. Every attribute read the pass encounters - directly in the
//! expression or transitively inside user-defined functions it calls -
//! subscribes the returned [`Reaction`] to that (object, attribute) pair,
//! so any later write re-evaluates the expression.
//!
//! [`Reaction`]: crate::ds::reaction::Reaction

pub(crate) mod evaluator;
pub(crate) mod wrapper;

use std::collections::HashMap;

use crate::ds::error::AexprError;
use crate::ds::reaction::{Expression, Reaction};
use crate::ds::value::{Bindings, Value};

use self::evaluator::Evaluator;
use self::wrapper::Slot;

/// Discover the attribute dependencies of `expression` and return a
/// reaction subscribed to all of them.
///
/// `globals` is the name-to-value mapping visible to the expression at
/// definition time; names absent from it are treated as intrinsics. The
/// expression's current value is captured as the baseline before analysis
/// starts, so the first real change after this call fires the callback.
///
/// Fails if the stream contains an opcode outside the supported set or
/// instruments something that cannot carry listener state; hooks already
/// installed when the failure hit are kept.
pub fn aexpr(expression: Expression, globals: &Bindings) -> Result<Reaction, AexprError> {
    aexpr_with_locals(expression, globals, HashMap::new())
}

/// [`aexpr`] with seed local-variable bindings for the top-level frame.
///
/// Mirrors the entry the evaluator itself uses when recursing into a
/// called function; top-level callers normally have no seed locals.
pub fn aexpr_with_locals(
    expression: Expression,
    globals: &Bindings,
    locals: HashMap<String, Value>,
) -> Result<Reaction, AexprError> {
    let reaction = Reaction::new(expression.clone());
    let mut evaluator = Evaluator::new(globals, reaction.clone());
    let seed = locals
        .into_iter()
        .map(|(name, value)| (name, Slot::concrete(value)))
        .collect();
    evaluator.run(expression.code(), None, seed)?;
    Ok(reaction)
}
