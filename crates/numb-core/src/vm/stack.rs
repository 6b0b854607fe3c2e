//! VM Stack Implementation
//!
//! Fixed-capacity operand stack.
//! No execution semantics.

use crate::error::Trap;
use super::value::Value;

/// VM operand stack
///
/// Slots are allocated up front and never grow. `depth` counts the live
/// slots; a pop only moves the boundary and leaves the old value in place.
#[derive(Debug)]
pub struct Stack {
    slots: Box<[Value]>,
    depth: usize,
}

impl Stack {
    /// Create new stack with a fixed capacity
    pub fn new(capacity: usize) -> Self {
        Stack {
            slots: vec![Value::Absent; capacity].into_boxed_slice(),
            depth: 0,
        }
    }

    /// Push value onto stack
    pub fn push(&mut self, value: Value) -> Result<(), Trap> {
        if self.depth >= self.slots.len() {
            return Err(Trap::StackOverflow);
        }
        self.slots[self.depth] = value;
        self.depth += 1;
        Ok(())
    }

    /// Discard the top value
    pub fn pop(&mut self) -> Result<(), Trap> {
        if self.depth == 0 {
            return Err(Trap::StackUnderflow);
        }
        self.depth -= 1;
        Ok(())
    }

    /// Peek at top of stack without removing
    pub fn peek(&self) -> Result<&Value, Trap> {
        self.live().last().ok_or(Trap::StackUnderflow)
    }

    /// Index of the topmost occupied slot, -1 when empty
    pub fn pointer(&self) -> isize {
        self.depth as isize - 1
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    pub fn is_full(&self) -> bool {
        self.depth == self.slots.len()
    }

    /// Live slots, bottom first
    pub fn live(&self) -> &[Value] {
        &self.slots[..self.depth]
    }
}
