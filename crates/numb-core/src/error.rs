//! Numb Error Types
//!
//! Execution faults raised while the interpreter is running, and the
//! errors produced by the encoding and image layers around it.

use std::io;

use thiserror::Error;

/// Execution-time fault kinds. Every trap is fatal to the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Trap {
    #[error("stack overflow")]
    StackOverflow,

    #[error("stack underflow")]
    StackUnderflow,

    #[error("invalid operand")]
    InvalidOperand,

    #[error("global not found")]
    GlobalNotFound,

    #[error("invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),

    #[error("program counter ran past the end of the program")]
    ProgramOverrun,
}

/// A trap together with the interpreter registers at the moment it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pc: {pc} -> {trap}{}", stack_suffix(.trap, .sp))]
pub struct Fault {
    pub trap: Trap,
    pub pc: isize,
    pub sp: isize,
}

/// Stack faults also report where the stack pointer stood
fn stack_suffix(trap: &Trap, sp: &isize) -> String {
    match trap {
        Trap::StackOverflow | Trap::StackUnderflow => format!(" at sp: {}", sp),
        _ => String::new(),
    }
}

/// Errors outside of execution: decoding instructions and program images.
#[derive(Debug, Error)]
pub enum NumbError {
    #[error("invalid image magic number")]
    InvalidMagic,

    #[error("unsupported image version: {0}")]
    UnsupportedVersion(u8),

    #[error("input is truncated")]
    Truncated,

    #[error("invalid value tag: 0x{0:02X}")]
    InvalidValueTag(u8),

    #[error("invalid opcode 0x{opcode:02X} at offset {offset}")]
    InvalidOpcode { opcode: u8, offset: usize },

    #[error("stack capacity {0} exceeds the limit of {max}", max = crate::config::MAX_STACK_CAPACITY)]
    StackCapacity(usize),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type NumbResult<T> = Result<T, NumbError>;
