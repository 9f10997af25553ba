//! The abstract evaluator: per-opcode dispatch over an operand stack.
//!
//! Walks a pre-decoded instruction stream front to back exactly once,
//! approximating each opcode's stack effect without executing real
//! semantics. Attribute reads are the discovery point: each one registers
//! the (object, attribute) pair with the monitored reaction's listener
//! set. Calls to user-defined functions recurse into the callee's own
//! stream with a fresh frame so transitive reads are discovered too.
//!
//! Branches and loops are not modeled - the traversal is a straight-line
//! FIFO drain, which may over- or under-approximate the dependencies of
//! code with real control flow. This is a documented approximation.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::analyzer::wrapper::Slot;
use crate::bytecode::{Arg, CodeObject, Instr, OpCode, OPCODE_COUNT};
use crate::ds::error::AexprError;
use crate::ds::object::ObjRef;
use crate::ds::reaction::Reaction;
use crate::ds::value::{Bindings, Value};

type Handler = fn(&mut Evaluator<'_>, &mut Frame, &Instr) -> Result<(), AexprError>;

/// One evaluation frame: pending instructions, operand stack, variables.
pub(crate) struct Frame {
    queue: VecDeque<Instr>,
    stack: Vec<Slot>,
    vars: HashMap<String, Slot>,
}

impl Frame {
    /// The variable map is always seeded with `self`: the receiver the
    /// callee was read off, or null for free functions and the top-level
    /// expression. Caller-provided seed bindings win over the default.
    fn new(code: &CodeObject, receiver: Option<ObjRef>, seed: HashMap<String, Slot>) -> Self {
        let mut vars = seed;
        vars.entry("self".to_string()).or_insert_with(move || {
            Slot::concrete(match receiver {
                Some(obj) => Value::Object(obj),
                None => Value::Null,
            })
        });
        Frame {
            queue: code.instrs.iter().cloned().collect(),
            stack: Vec::new(),
            vars,
        }
    }

    fn pop(&mut self, instr: &Instr) -> Result<Slot, AexprError> {
        self.stack
            .pop()
            .ok_or_else(|| AexprError::StackUnderflow(format!("at {}", instr)))
    }
}

/// Abstract evaluator for one dependency-discovery pass.
///
/// Holds the state shared by every frame of the pass: the global bindings
/// the expression was defined against, the reaction collecting discovered
/// dependencies, and the opcode dispatch table. The table is pure data
/// built once per evaluator - discovery is a one-time startup cost per
/// monitored expression, not a hot path.
pub(crate) struct Evaluator<'a> {
    globals: &'a Bindings,
    reaction: Reaction,
    handlers: [Option<Handler>; OPCODE_COUNT],
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(globals: &'a Bindings, reaction: Reaction) -> Self {
        Evaluator {
            globals,
            reaction,
            handlers: dispatch_table(),
        }
    }

    /// Drain one frame's instruction queue and return the frame result:
    /// the single value left on the operand stack.
    pub(crate) fn run(
        &mut self,
        code: &CodeObject,
        receiver: Option<ObjRef>,
        seed: HashMap<String, Slot>,
    ) -> Result<Slot, AexprError> {
        let mut frame = Frame::new(code, receiver, seed);
        while let Some(instr) = frame.queue.pop_front() {
            match self.handlers[instr.op as usize] {
                Some(handler) => handler(self, &mut frame, &instr)?,
                None => {
                    return Err(AexprError::UnimplementedInstruction(format!("{}", instr)))
                }
            }
        }
        frame
            .stack
            .pop()
            .ok_or_else(|| AexprError::StackUnderflow("frame ended with an empty stack".to_string()))
    }
}

/// Build the opcode-to-handler table.
///
/// Entries left `None` abort analysis with `UnimplementedInstruction`
/// when encountered: skipping an opcode with an unknown stack effect
/// would silently desynchronize the bookkeeping.
fn dispatch_table() -> [Option<Handler>; OPCODE_COUNT] {
    let mut table: [Option<Handler>; OPCODE_COUNT] = [None; OPCODE_COUNT];
    table[OpCode::Nop as usize] = Some(ignore);
    table[OpCode::Return as usize] = Some(ignore);
    table[OpCode::Jump as usize] = Some(ignore);
    table[OpCode::JumpIfTrue as usize] = Some(ignore);
    table[OpCode::JumpIfFalse as usize] = Some(ignore);
    table[OpCode::Pop as usize] = Some(pop_top);
    table[OpCode::Swap as usize] = Some(swap);
    table[OpCode::RotThree as usize] = Some(rot_three);
    table[OpCode::DupTop as usize] = Some(dup_top);
    table[OpCode::RotFour as usize] = Some(rot_four);
    table[OpCode::UnaryOp as usize] = Some(unary_op);
    table[OpCode::BinaryOp as usize] = Some(binary_op);
    table[OpCode::LoadConst as usize] = Some(load_const);
    table[OpCode::LoadAttr as usize] = Some(load_attr);
    table[OpCode::LoadGlobal as usize] = Some(load_global);
    table[OpCode::LoadLocal as usize] = Some(load_local);
    table[OpCode::LoadDeref as usize] = Some(load_local);
    table[OpCode::StoreLocal as usize] = Some(store_local);
    table[OpCode::DeleteLocal as usize] = Some(delete_local);
    table[OpCode::CallFunction as usize] = Some(call_function);
    table
}

fn name_arg(instr: &Instr) -> Result<&str, AexprError> {
    match &instr.arg {
        Arg::Name(name) => Ok(name),
        _ => Err(AexprError::MalformedInstruction(format!(
            "{} requires a name argument",
            instr
        ))),
    }
}

fn count_arg(instr: &Instr) -> Result<usize, AexprError> {
    match &instr.arg {
        Arg::Count(count) => Ok(*count),
        _ => Err(AexprError::MalformedInstruction(format!(
            "{} requires a count argument",
            instr
        ))),
    }
}

// ── Handlers ─────────────────────────────────────────────────

fn ignore(_ev: &mut Evaluator<'_>, _frame: &mut Frame, _instr: &Instr) -> Result<(), AexprError> {
    Ok(())
}

fn pop_top(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    frame.pop(instr)?;
    Ok(())
}

fn swap(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let first = frame.pop(instr)?;
    let second = frame.pop(instr)?;
    frame.stack.push(first);
    frame.stack.push(second);
    Ok(())
}

fn rot_three(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let first = frame.pop(instr)?;
    let second = frame.pop(instr)?;
    let third = frame.pop(instr)?;
    frame.stack.push(first);
    frame.stack.push(third);
    frame.stack.push(second);
    Ok(())
}

fn dup_top(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let top = frame.pop(instr)?;
    frame.stack.push(top.clone());
    frame.stack.push(top);
    Ok(())
}

fn rot_four(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let first = frame.pop(instr)?;
    let second = frame.pop(instr)?;
    let third = frame.pop(instr)?;
    let fourth = frame.pop(instr)?;
    frame.stack.push(first);
    frame.stack.push(fourth);
    frame.stack.push(third);
    frame.stack.push(second);
    Ok(())
}

fn unary_op(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    frame.pop(instr)?;
    frame.stack.push(Slot::placeholder());
    Ok(())
}

fn binary_op(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    frame.pop(instr)?;
    frame.pop(instr)?;
    frame.stack.push(Slot::placeholder());
    Ok(())
}

fn load_const(_ev: &mut Evaluator<'_>, frame: &mut Frame, _instr: &Instr) -> Result<(), AexprError> {
    // Constants carry no dependency information worth tracking.
    frame.stack.push(Slot::placeholder());
    Ok(())
}

/// The single dependency-registration point: reading an attribute off an
/// observable object subscribes the current reaction to that attribute
/// and pushes the attribute's current value with its source recorded.
fn load_attr(ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let attr = name_arg(instr)?.to_string();
    let base = frame.pop(instr)?;

    if base.is_placeholder() {
        log::warn!(
            "attribute read \"{}\" on a placeholder value ({}); precision degraded",
            attr,
            instr
        );
        frame.stack.push(Slot::placeholder());
        return Ok(());
    }

    let obj = match base.payload() {
        Some(Value::Object(obj)) => Rc::clone(obj),
        Some(other) => {
            return Err(AexprError::UnsupportedObject(format!(
                "cannot observe attribute \"{}\" of {} ({})",
                attr, other, instr
            )))
        }
        None => {
            return Err(AexprError::UnsupportedObject(format!(
                "cannot observe attribute \"{}\" of an intrinsic reference ({})",
                attr, instr
            )))
        }
    };

    obj.observe(&attr, &ev.reaction);
    // An absent attribute reads as null; the hook is installed either
    // way, so a later write is still tracked.
    let current = obj.get(&attr).unwrap_or(Value::Null);
    frame.stack.push(Slot::with_source(current, obj));
    Ok(())
}

fn load_global(ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let name = name_arg(instr)?;
    match ev.globals.get(name) {
        Some(value) => frame.stack.push(Slot::concrete(value.clone())),
        // Names absent from the supplied bindings resolve to language
        // builtins or are simply unknown; either way they are opaque.
        None => frame.stack.push(Slot::intrinsic()),
    }
    Ok(())
}

fn load_local(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let name = name_arg(instr)?;
    let slot = frame
        .vars
        .get(name)
        .cloned()
        .ok_or_else(|| AexprError::UnboundLocal(format!("\"{}\" ({})", name, instr)))?;
    frame.stack.push(slot);
    Ok(())
}

fn store_local(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let name = name_arg(instr)?.to_string();
    let slot = frame.pop(instr)?;
    frame.vars.insert(name, slot);
    Ok(())
}

fn delete_local(_ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    // Deleting an unbound name is a no-op.
    frame.vars.remove(name_arg(instr)?);
    Ok(())
}

fn call_function(ev: &mut Evaluator<'_>, frame: &mut Frame, instr: &Instr) -> Result<(), AexprError> {
    let argc = count_arg(instr)?;
    let mut args = Vec::with_capacity(argc);
    for _ in 0..argc {
        args.push(frame.pop(instr)?);
    }
    args.reverse(); // popped rightmost-first; restore call order
    let callee = frame.pop(instr)?;

    if callee.is_intrinsic() {
        // Builtin or unresolved code: cannot recurse into it.
        frame.stack.push(Slot::placeholder());
        return Ok(());
    }
    if callee.is_placeholder() {
        log::warn!("call through a placeholder value ({}); precision degraded", instr);
        frame.stack.push(Slot::placeholder());
        return Ok(());
    }

    match callee.payload() {
        Some(Value::Function(func)) => {
            if func.params.len() != argc {
                return Err(AexprError::ArityMismatch(format!(
                    "\"{}\" takes {} argument(s), {} given ({})",
                    func.name,
                    func.params.len(),
                    argc,
                    instr
                )));
            }
            let func = Rc::clone(func);
            let receiver = callee.source().cloned();
            let mut seed = HashMap::new();
            // Rightmost argument first, matching the call layout.
            for i in (0..argc).rev() {
                seed.insert(func.params[i].clone(), args[i].clone());
            }
            let result = ev.run(&func.code, receiver, seed)?;
            frame.stack.push(result);
        }
        Some(Value::Class(_)) => {
            // Construction is opaque; constructor bodies are never traced.
            frame.stack.push(Slot::placeholder());
        }
        Some(other) => {
            log::warn!("call of non-callable value {} ({})", other, instr);
            frame.stack.push(Slot::placeholder());
        }
        None => frame.stack.push(Slot::placeholder()),
    }
    Ok(())
}
