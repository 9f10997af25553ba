//! Error type for dependency discovery.

use std::error::Error;
use std::fmt;

/// Errors raised while analyzing an expression.
///
/// All variants are fatal to the `aexpr` call that produced them and
/// propagate to the caller uncaught. Attribute hooks installed before the
/// failure are kept - partial instrumentation is not rolled back.
#[derive(Debug)]
pub enum AexprError {
    /// Attribute instrumentation was attempted on a value that cannot
    /// carry listener state (a scalar, a function, an intrinsic reference).
    UnsupportedObject(String),
    /// A decoded opcode has no dispatch-table entry.
    UnimplementedInstruction(String),
    /// The instruction stream popped an empty operand stack, or a frame
    /// ended with nothing to return.
    StackUnderflow(String),
    /// An opcode was decoded with the wrong argument kind.
    MalformedInstruction(String),
    /// A local variable was read before being bound.
    UnboundLocal(String),
    /// A call's argument count differs from the callee's parameter list.
    ArityMismatch(String),
}

impl fmt::Display for AexprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AexprError::UnsupportedObject(m) => write!(f, "unsupported object: {}", m),
            AexprError::UnimplementedInstruction(m) => {
                write!(f, "unimplemented instruction: {}", m)
            }
            AexprError::StackUnderflow(m) => write!(f, "operand stack underflow: {}", m),
            AexprError::MalformedInstruction(m) => write!(f, "malformed instruction: {}", m),
            AexprError::UnboundLocal(m) => write!(f, "unbound local: {}", m),
            AexprError::ArityMismatch(m) => write!(f, "arity mismatch: {}", m),
        }
    }
}

impl Error for AexprError {}
