//! Instruction abstraction consumed by the dependency analyzer.
//!
//! Defines a flat, stack-based instruction set mirroring the shape a
//! compiled expression exposes: a dense opcode, an optional decoded
//! argument, and a linear stream of instructions. The analyzer depends
//! only on this shape; producing a stream (hand-building it, decoding it
//! from some other compiled representation) is the caller's concern.

use std::fmt;

/// Opcodes known to the instruction decoder.
///
/// The discriminants are dense so an opcode can index a fixed-size
/// dispatch table directly. Not every opcode here has an abstract
/// handler - the last group is decodable but deliberately unsupported,
/// and aborts analysis when encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    // ── No effect under abstract evaluation ──────────────────
    /// Do nothing.
    Nop,
    /// Return from the current frame. The frame result is whatever is
    /// left on top of the operand stack, so this has no stack effect.
    Return,
    /// Unconditional jump. Traversal is straight-line; jumps are ignored.
    Jump,
    /// Jump if top of stack is truthy. Ignored, nothing is popped.
    JumpIfTrue,
    /// Jump if top of stack is falsy. Ignored, nothing is popped.
    JumpIfFalse,

    // ── Stack manipulation ───────────────────────────────────
    /// Pop and discard the top of the stack.
    Pop,
    /// Swap the top two stack values (a,b -> b,a).
    Swap,
    /// Rotate the top three values: the top moves to third place.
    RotThree,
    /// Duplicate the top of the stack.
    DupTop,
    /// Rotate the top four values: the top moves to fourth place.
    RotFour,

    // ── Operators ────────────────────────────────────────────
    /// Unary operator. Arg: operator name. Pops one operand.
    UnaryOp,
    /// Binary operator, comparisons included. Arg: operator name.
    /// Pops two operands.
    BinaryOp,

    // ── Loads & stores ───────────────────────────────────────
    /// Push a literal constant.
    LoadConst,
    /// Read an attribute of the value on top of the stack.
    /// Arg: attribute name.
    LoadAttr,
    /// Look up a name in the global bindings. Arg: name.
    LoadGlobal,
    /// Read a local variable. Arg: name.
    LoadLocal,
    /// Read a closure-captured variable. Arg: name. Abstractly identical
    /// to `LoadLocal`.
    LoadDeref,
    /// Write the top of the stack into a local variable. Arg: name.
    StoreLocal,
    /// Remove a local variable binding. Arg: name.
    DeleteLocal,

    // ── Calls ────────────────────────────────────────────────
    /// Call a callable. Arg: argument count.
    /// Stack: [callee, arg_1, ..., arg_n] with arg_n on top.
    CallFunction,

    // ── Decodable but unsupported ────────────────────────────
    // These have no dispatch-table entry: skipping them would silently
    // desynchronize stack bookkeeping, so analysis aborts instead.
    /// Write an attribute: stack [value, object]. Arg: attribute name.
    StoreAttr,
    /// Construct a function object from code on the stack.
    MakeFunction,
    /// Import a module by name. Arg: module name.
    ImportName,
    /// Build a list from the top N stack values. Arg: element count.
    BuildList,
}

/// Number of opcodes. Sizes the analyzer's dispatch table.
pub const OPCODE_COUNT: usize = OpCode::BuildList as usize + 1;

/// Decoded instruction argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// No argument.
    None,
    /// A name: attribute, global, local or operator name.
    Name(String),
    /// A count: call argument count, list element count.
    Count(usize),
}

/// A single decoded instruction: opcode plus decoded argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    pub op: OpCode,
    pub arg: Arg,
}

impl Instr {
    /// An instruction with no argument.
    pub fn plain(op: OpCode) -> Self {
        Instr { op, arg: Arg::None }
    }

    /// An instruction carrying a name argument.
    pub fn named(op: OpCode, name: &str) -> Self {
        Instr {
            op,
            arg: Arg::Name(name.to_string()),
        }
    }

    /// An instruction carrying a count argument.
    pub fn counted(op: OpCode, count: usize) -> Self {
        Instr {
            op,
            arg: Arg::Count(count),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Arg::None => write!(f, "{:?}", self.op),
            Arg::Name(name) => write!(f, "{:?} \"{}\"", self.op, name),
            Arg::Count(count) => write!(f, "{:?} argc={}", self.op, count),
        }
    }
}

/// A linear instruction stream, in program order.
#[derive(Debug, Clone, Default)]
pub struct CodeObject {
    pub instrs: Vec<Instr>,
}

impl CodeObject {
    pub fn new() -> Self {
        CodeObject { instrs: Vec::new() }
    }

    /// Wrap an already-built instruction list.
    pub fn of(instrs: Vec<Instr>) -> Self {
        CodeObject { instrs }
    }

    /// Append an instruction and return its index.
    pub fn emit(&mut self, instr: Instr) -> usize {
        let idx = self.instrs.len();
        self.instrs.push(instr);
        idx
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Human-readable dump of the stream, for diagnostics.
    pub fn disassemble(&self, name: &str) -> String {
        let mut out = format!("== {} ==\n", name);
        for (i, instr) in self.instrs.iter().enumerate() {
            out.push_str(&format!("{:04}  {}\n", i, instr));
        }
        out
    }
}

/// A user-defined callable the analyzer may recurse into.
///
/// `params` lists declared parameter names left to right, excluding the
/// receiver; when the callable was read off an object, the analyzer seeds
/// the new frame's `self` binding with that object separately.
#[derive(Debug, Clone)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<String>,
    pub code: CodeObject,
}

impl FuncDef {
    pub fn new(name: &str, params: &[&str], code: CodeObject) -> Self {
        FuncDef {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            code,
        }
    }
}
