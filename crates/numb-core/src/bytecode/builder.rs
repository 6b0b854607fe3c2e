//! Program builder
//!
//! Small encoder for hand-built programs. Indices passed here must come
//! from the interpreter's registration calls (`put_i64`, `put_f64`,
//! `put_global`); nothing is validated until the program runs.

use super::instruction::Instruction;
use super::opcode::OpCode;

#[derive(Debug, Default, Clone)]
pub struct ProgramBuilder {
    bytes: Vec<u8>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instruction: Instruction) -> &mut Self {
        instruction.encode(&mut self.bytes);
        self
    }

    pub fn halt(&mut self) -> &mut Self {
        self.emit(Instruction::new(OpCode::Halt))
    }

    pub fn i64_const(&mut self, index: u64) -> &mut Self {
        self.emit(Instruction::with_operand(OpCode::I64Const, index))
    }

    pub fn f64_const(&mut self, index: u64) -> &mut Self {
        self.emit(Instruction::with_operand(OpCode::F64Const, index))
    }

    pub fn pop(&mut self) -> &mut Self {
        self.emit(Instruction::new(OpCode::Pop))
    }

    pub fn set_global(&mut self, index: u64) -> &mut Self {
        self.emit(Instruction::with_operand(OpCode::SetGlobal, index))
    }

    pub fn get_global(&mut self, index: u64) -> &mut Self {
        self.emit(Instruction::with_operand(OpCode::GetGlobal, index))
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}
