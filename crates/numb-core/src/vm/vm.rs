//! Virtual Machine Core
//!
//! Defines the Numb interpreter structure and its fetch-decode-execute loop.
//! Every primitive returns `Result<(), Trap>`; the loop routes any trap
//! through `catch_trap`, which logs it and halts the run.

use std::fmt;

use log::{debug, error, trace};

use crate::bytecode::opcode::{OpCode, INDEX_OPERAND_LEN};
use crate::config::VmConfig;
use crate::error::{Fault, NumbResult, Trap};

use super::memory::Pool;
use super::stack::Stack;
use super::value::Value;

/// Numb Virtual Machine
#[derive(Debug)]
pub struct VirtualMachine {
    stack: Stack,
    program: Vec<u8>,

    // index of the last fetched byte, -1 before the first fetch
    pc: isize,
    halted: bool,
    last_fault: Option<Fault>,

    globals: Pool<Value>,
    i64_pool: Pool<i64>,
    f64_pool: Pool<f64>,
}

impl Default for VirtualMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualMachine {
    /// Create a VM with the default configuration
    pub fn new() -> Self {
        Self::build(&VmConfig::default())
    }

    /// Create a VM with custom limits, rejecting ones it cannot allocate
    pub fn with_config(config: VmConfig) -> NumbResult<Self> {
        config.validate()?;
        Ok(Self::build(&config))
    }

    fn build(config: &VmConfig) -> Self {
        VirtualMachine {
            stack: Stack::new(config.stack_capacity),
            program: Vec::new(),
            pc: -1,
            halted: true,
            last_fault: None,
            globals: Pool::new(),
            i64_pool: Pool::new(),
            f64_pool: Pool::new(),
        }
    }

    /// Register an integer constant, returning its pool index
    pub fn put_i64(&mut self, value: i64) -> u64 {
        self.i64_pool.put(value)
    }

    /// Register a float constant, returning its pool index
    pub fn put_f64(&mut self, value: f64) -> u64 {
        self.f64_pool.put(value)
    }

    /// Declare a global with an initial value, returning its slot index
    pub fn put_global(&mut self, value: Value) -> u64 {
        self.globals.put(value)
    }

    /// Install a program buffer.
    ///
    /// Pools, stack and program counter are kept as they are; the next
    /// `execute` continues from the current program counter.
    pub fn set_program(&mut self, program: Vec<u8>) {
        self.program = program;
    }

    /// Run until a `Halt` instruction or a fault.
    ///
    /// A fault is logged, halts the VM, and is returned as the error. The
    /// stack keeps whatever was pushed before it.
    pub fn execute(&mut self) -> Result<(), Fault> {
        self.last_fault = None;
        if !self.program.is_empty() {
            self.halted = false;
        }

        debug!(
            "run start: pc={} sp={} program={} bytes",
            self.pc,
            self.stack.pointer(),
            self.program.len()
        );

        while !self.halted {
            if let Err(trap) = self.eval() {
                self.catch_trap(trap);
            }
        }

        debug!("run stop: pc={} sp={}", self.pc, self.stack.pointer());

        match self.last_fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Fetch, decode and execute one instruction
    fn eval(&mut self) -> Result<(), Trap> {
        let byte = self.fetch()?;
        let opcode = OpCode::from_u8(byte).ok_or(Trap::InvalidOpcode(byte))?;
        trace!("pc={} sp={} {}", self.pc, self.stack.pointer(), opcode);

        match opcode {
            OpCode::Halt => {
                self.halted = true;
                Ok(())
            }

            OpCode::I64Const => {
                let index = self.read_index()?;
                let constant = *self.i64_pool.get(index).ok_or(Trap::InvalidOperand)?;
                self.stack.push(Value::Integer(constant))
            }

            OpCode::F64Const => {
                let index = self.read_index()?;
                let constant = *self.f64_pool.get(index).ok_or(Trap::InvalidOperand)?;
                self.stack.push(Value::Float(constant))
            }

            OpCode::Pop => self.stack.pop(),

            OpCode::SetGlobal => {
                let index = self.read_index()?;
                let global = self.globals.get_mut(index).ok_or(Trap::GlobalNotFound)?;
                *global = *self.stack.peek()?;
                self.stack.pop()
            }

            OpCode::GetGlobal => {
                let index = self.read_index()?;
                let value = *self.globals.get(index).ok_or(Trap::GlobalNotFound)?;
                self.stack.push(value)
            }
        }
    }

    /// Read next byte from the program, advancing the program counter
    fn fetch(&mut self) -> Result<u8, Trap> {
        self.pc += 1;
        usize::try_from(self.pc)
            .ok()
            .and_then(|pc| self.program.get(pc))
            .copied()
            .ok_or(Trap::ProgramOverrun)
    }

    /// Read a little-endian u64 index operand, one byte per fetch
    fn read_index(&mut self) -> Result<u64, Trap> {
        let mut index = 0u64;
        for i in 0..INDEX_OPERAND_LEN {
            index |= u64::from(self.fetch()?) << (i * 8);
        }
        Ok(index)
    }

    fn catch_trap(&mut self, trap: Trap) {
        let fault = Fault {
            trap,
            pc: self.pc,
            sp: self.stack.pointer(),
        };
        error!("[VM TRAP]: {}", fault);
        self.last_fault = Some(fault);
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Fault that ended the most recent run, if any
    pub fn last_fault(&self) -> Option<&Fault> {
        self.last_fault.as_ref()
    }

    pub fn program_counter(&self) -> isize {
        self.pc
    }

    /// Index of the topmost occupied stack slot, -1 when empty
    pub fn stack_pointer(&self) -> isize {
        self.stack.pointer()
    }

    pub fn stack_capacity(&self) -> usize {
        self.stack.capacity()
    }

    /// Live stack slots, bottom first
    pub fn stack(&self) -> &[Value] {
        self.stack.live()
    }

    pub fn stack_dump(&self) -> StackDump<'_> {
        StackDump(self.stack.live())
    }

    pub fn global(&self, index: u64) -> Option<&Value> {
        self.globals.get(index)
    }

    pub fn i64_constant(&self, index: u64) -> Option<&i64> {
        self.i64_pool.get(index)
    }

    pub fn f64_constant(&self, index: u64) -> Option<&f64> {
        self.f64_pool.get(index)
    }
}

/// Line-per-slot listing of the live operand stack
pub struct StackDump<'a>(&'a [Value]);

impl fmt::Display for StackDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if value.is_absent() {
                writeln!(f, "sp: {} -> {}", i, value)?;
            } else {
                writeln!(f, "sp: {} -> {} {}", i, value.value_type().name(), value)?;
            }
        }
        Ok(())
    }
}
