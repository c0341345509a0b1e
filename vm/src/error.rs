use thiserror::Error;

use crate::script::ScriptFormat;

/// Fatal interpreter errors.
///
/// Scripts are trusted, pre-validated data: anything reported here is a
/// contract violation between the decoders and the interpreters, not a
/// condition a running stage can recover from. Unknown opcodes are not
/// errors; they are logged and skipped.
#[derive(Debug, Error, PartialEq)]
pub enum RuntimeError {
    #[error("unmapped variable address {0}")]
    UnmappedVariable(i32),

    #[error("variable {0} is read-only")]
    ReadOnlyVariable(i32),

    #[error("return with an empty call stack")]
    CallStackUnderflow,

    #[error("opcode {opcode} needs {needed} argument bytes, got {available}")]
    TruncatedArgs {
        opcode: u16,
        needed: usize,
        available: usize,
    },

    #[error("opcode {opcode} expects a non-negative argument, got {value}")]
    NegativeArgument { opcode: u16, value: i32 },

    #[error("integer division by zero")]
    DivisionByZero,

    #[error("unknown subroutine {0}")]
    UnknownSubroutine(u16),

    #[error("unknown script {0}")]
    UnknownScript(u32),

    #[error("unsupported {format:?} format version {version}")]
    UnsupportedVersion { format: ScriptFormat, version: u8 },

    #[error("opcode {0} carries a malformed text argument")]
    InvalidText(u16),
}
