//! # aexpr - reactive attribute expressions
//!
//! Watches an expression for changes by statically analyzing its compiled
//! instruction stream: an abstract evaluator walks the instructions,
//! discovers every object attribute the expression reads (including reads
//! performed by functions it calls), and subscribes to those attributes.
//! Any later mutation of a watched attribute re-evaluates the expression
//! and, when the result actually changed, fires a user callback.
//!
//! ## Quick Start
//!
//! ```
//! use std::rc::Rc;
//!
//! use aexpr::analyzer::aexpr;
//! use aexpr::bytecode::{CodeObject, Instr, OpCode};
//! use aexpr::ds::object::ObservableObject;
//! use aexpr::ds::reaction::Expression;
//! use aexpr::ds::value::{Bindings, Value};
//!
//! let p = ObservableObject::new();
//! p.set("x", Value::Int(1));
//!
//! let mut globals = Bindings::new();
//! globals.insert("p".to_string(), Value::Object(Rc::clone(&p)));
//!
//! // The compiled form of `p.x`.
//! let code = CodeObject::of(vec![
//!     Instr::named(OpCode::LoadGlobal, "p"),
//!     Instr::named(OpCode::LoadAttr, "x"),
//!     Instr::plain(OpCode::Return),
//! ]);
//! let thunk = {
//!     let p = Rc::clone(&p);
//!     move || p.get("x").unwrap_or(Value::Null)
//! };
//!
//! let reaction = aexpr(Expression::new(code, thunk), &globals).unwrap();
//! reaction.on_change(|_expr, old, new| {
//!     println!("changed: {} -> {}", old, new);
//! });
//!
//! p.set("x", Value::Int(2)); // prints "changed: 1 -> 2"
//! assert_eq!(reaction.value(), Value::Int(2));
//! ```
//!
//! ## Architecture
//!
//! - **[`bytecode`]** - the instruction abstraction the analyzer consumes:
//!   opcodes, decoded arguments, instruction streams, function definitions.
//!   How a stream is produced (hand-built, decoded from another
//!   representation) is the caller's business; the analyzer depends only on
//!   the sequence shape.
//! - **[`ds`]** - runtime data structures: values, the observable object
//!   model with notifying attribute writes, reactions, and the error type.
//! - **[`analyzer`]** - the dependency discovery driver and the abstract
//!   evaluator with its opcode dispatch table.
//!
//! ## Limitations
//!
//! Discovery is a single straight-line pass over the instruction stream:
//! branches and loops are not modeled, every instruction is visited exactly
//! once in program order. Change notification is synchronous and has no
//! reentrancy guard; a callback that mutates a watched attribute triggers a
//! nested notification cycle on the same call stack. Listener sets only
//! grow - there is no way to unregister a reaction.

pub mod analyzer;
pub mod bytecode;
pub mod ds;
