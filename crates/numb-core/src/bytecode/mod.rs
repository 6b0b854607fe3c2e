pub mod builder;
pub mod instruction;
pub mod opcode;

pub use builder::ProgramBuilder;
pub use instruction::{disassemble, Instruction};
pub use opcode::OpCode;
