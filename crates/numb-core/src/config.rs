//! VM Configuration
//!
//! Runtime limits for the Numb interpreter.
//! Configuration specifies constraints only; enforcement is handled by the VM.

use crate::error::{NumbError, NumbResult};

/// Operand stack capacity used when none is given.
pub const DEFAULT_STACK_CAPACITY: usize = 2048;

/// Largest operand stack a VM will allocate
pub const MAX_STACK_CAPACITY: usize = 1 << 20;

/// VM Configuration
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Fixed operand stack capacity, in slots
    pub stack_capacity: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            stack_capacity: DEFAULT_STACK_CAPACITY,
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack_capacity(mut self, stack_capacity: usize) -> Self {
        self.stack_capacity = stack_capacity;
        self
    }

    /// Check the limits before a VM allocates anything from them
    pub fn validate(&self) -> NumbResult<()> {
        if self.stack_capacity > MAX_STACK_CAPACITY {
            return Err(NumbError::StackCapacity(self.stack_capacity));
        }
        Ok(())
    }
}
