pub mod memory;
pub mod object;
pub mod stack;
pub mod value;
pub mod vm;

pub use memory::Pool;
pub use object::{Object, ObjectRef};
pub use value::{Value, ValueType};
pub use vm::VirtualMachine;
