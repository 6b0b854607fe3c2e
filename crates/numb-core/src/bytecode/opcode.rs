//! Bytecode Opcode Definitions
//!
//! Defines the raw opcode set for Numb bytecode.
//! This file contains no execution semantics.
//! Opcode values are shared between the encoder and the interpreter.

use std::fmt;

/// Size in bytes of a pool or global index operand
pub const INDEX_OPERAND_LEN: usize = 8;

/// Bytecode opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Halt = 0x00,

    // Constants
    I64Const = 0x01,
    F64Const = 0x02,

    // Stack
    Pop = 0x03,

    // Globals
    SetGlobal = 0x04,
    GetGlobal = 0x05,
}

impl OpCode {
    /// Convert raw byte to opcode
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(OpCode::Halt),
            0x01 => Some(OpCode::I64Const),
            0x02 => Some(OpCode::F64Const),
            0x03 => Some(OpCode::Pop),
            0x04 => Some(OpCode::SetGlobal),
            0x05 => Some(OpCode::GetGlobal),
            _ => None,
        }
    }

    /// Number of operand bytes following the opcode byte
    pub fn operand_len(self) -> usize {
        match self {
            OpCode::Halt | OpCode::Pop => 0,
            OpCode::I64Const | OpCode::F64Const | OpCode::SetGlobal | OpCode::GetGlobal => {
                INDEX_OPERAND_LEN
            }
        }
    }

    pub fn has_operand(self) -> bool {
        self.operand_len() != 0
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Halt => "halt",
            OpCode::I64Const => "i64.const",
            OpCode::F64Const => "f64.const",
            OpCode::Pop => "pop",
            OpCode::SetGlobal => "global.set",
            OpCode::GetGlobal => "global.get",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
