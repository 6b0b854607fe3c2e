//! Bytecode Instruction Representation
//!
//! Encoded form: one opcode byte, followed by an 8-byte little-endian
//! index for the opcodes that take one.
//! This layer contains no execution semantics.

use std::fmt;

use crate::error::{NumbError, NumbResult};
use super::opcode::{OpCode, INDEX_OPERAND_LEN};

/// Decoded bytecode instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operand: Option<u64>,
}

impl Instruction {
    /// Create an instruction with no operand
    pub fn new(opcode: OpCode) -> Self {
        Instruction {
            opcode,
            operand: None,
        }
    }

    /// Create an instruction with an index operand
    pub fn with_operand(opcode: OpCode, operand: u64) -> Self {
        Instruction {
            opcode,
            operand: Some(operand),
        }
    }

    /// Encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        1 + self.opcode.operand_len()
    }

    /// Append the encoded instruction to `out`.
    ///
    /// Opcodes that take an operand get index 0 when none was given.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode as u8);
        if self.opcode.has_operand() {
            out.extend_from_slice(&self.operand.unwrap_or(0).to_le_bytes());
        }
    }

    /// Decode the instruction starting at `offset`. Returns it with its
    /// encoded length.
    pub fn decode(bytes: &[u8], offset: usize) -> NumbResult<(Instruction, usize)> {
        let byte = *bytes.get(offset).ok_or(NumbError::Truncated)?;
        let opcode = OpCode::from_u8(byte).ok_or(NumbError::InvalidOpcode {
            opcode: byte,
            offset,
        })?;

        if !opcode.has_operand() {
            return Ok((Instruction::new(opcode), 1));
        }

        let start = offset + 1;
        let raw: [u8; INDEX_OPERAND_LEN] = bytes
            .get(start..start + INDEX_OPERAND_LEN)
            .and_then(|s| s.try_into().ok())
            .ok_or(NumbError::Truncated)?;

        let instruction = Instruction::with_operand(opcode, u64::from_le_bytes(raw));
        Ok((instruction, instruction.encoded_len()))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Some(index) => write!(f, "{} {}", self.opcode, index),
            None => write!(f, "{}", self.opcode),
        }
    }
}

/// Decode a whole program into `(offset, instruction)` pairs.
pub fn disassemble(bytes: &[u8]) -> NumbResult<Vec<(usize, Instruction)>> {
    let mut listing = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let (instruction, len) = Instruction::decode(bytes, offset)?;
        listing.push((offset, instruction));
        offset += len;
    }
    Ok(listing)
}
