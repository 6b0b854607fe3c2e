//! Numb - Core Library
//!
//! Public API surface for the Numb stack VM core.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;
pub mod loader;

// Re-export commonly used types
pub use error::{Fault, NumbError, NumbResult, Trap};
pub use config::VmConfig;
pub use bytecode::{OpCode, ProgramBuilder};
pub use vm::value::Value;
pub use vm::vm::VirtualMachine;
pub use loader::{BytecodeLoader, ProgramImage};

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn constants_land_on_stack_in_order() {
		let mut vm = VirtualMachine::new();
		let a = vm.put_i64(69);
		let b = vm.put_i64(420);
		let c = vm.put_f64(69.420);

		let program = ProgramBuilder::new()
			.i64_const(a)
			.i64_const(b)
			.f64_const(c)
			.halt()
			.finish();
		vm.set_program(program);
		vm.execute().expect("execution failed");

		assert_eq!(
			vm.stack(),
			&[Value::Integer(69), Value::Integer(420), Value::Float(69.420)]
		);
		assert_eq!(vm.stack_pointer(), 2);
		assert!(vm.is_halted());
		assert!(vm.last_fault().is_none());

		// registering more constants leaves earlier indices alone
		vm.put_i64(1);
		vm.put_f64(2.0);
		assert_eq!(vm.i64_constant(b), Some(&420));
		assert_eq!(vm.f64_constant(c), Some(&69.420));
	}

	#[test]
	fn value_round_trips_through_global() {
		let mut vm = VirtualMachine::new();
		let f = vm.put_f64(69.420);
		let g = vm.put_global(Value::Absent);

		let program = ProgramBuilder::new()
			.f64_const(f)
			.set_global(g)
			.get_global(0)
			.halt()
			.finish();
		vm.set_program(program);
		vm.execute().expect("execution failed");

		assert_eq!(vm.stack(), &[Value::Float(69.420)]);
		assert_eq!(vm.stack_pointer(), 0);
		assert_eq!(vm.global(g), Some(&Value::Float(69.420)));
	}

	#[test]
	fn set_then_get_keeps_depth() {
		let mut vm = VirtualMachine::new();
		let i = vm.put_i64(7);
		let g = vm.put_global(Value::Integer(0));

		let program = ProgramBuilder::new()
			.i64_const(i)
			.i64_const(i)
			.set_global(g)
			.get_global(g)
			.halt()
			.finish();
		vm.set_program(program);
		vm.execute().expect("execution failed");

		assert_eq!(vm.stack(), &[Value::Integer(7), Value::Integer(7)]);
	}

	#[test]
	fn pop_on_empty_stack_underflows() {
		let mut vm = VirtualMachine::new();
		vm.set_program(ProgramBuilder::new().pop().halt().finish());

		let fault = vm.execute().unwrap_err();
		assert_eq!(fault.trap, Trap::StackUnderflow);
		assert_eq!(fault.pc, 0);
		assert_eq!(fault.sp, -1);
		assert!(vm.is_halted());
		assert_eq!(vm.stack_pointer(), -1);
	}

	#[test]
	fn underflow_after_pops_at_later_pc() {
		let mut vm = VirtualMachine::new();
		let i = vm.put_i64(1);
		vm.set_program(ProgramBuilder::new().i64_const(i).pop().pop().halt().finish());

		let fault = vm.execute().unwrap_err();
		assert_eq!(fault.trap, Trap::StackUnderflow);
		assert_eq!(fault.pc, 10);
		assert!(vm.is_halted());
	}

	#[test]
	fn push_at_capacity_overflows() {
		let mut vm = VirtualMachine::with_config(VmConfig::new().with_stack_capacity(2)).unwrap();
		let i = vm.put_i64(1);
		let g = vm.put_global(Value::Integer(5));
		vm.set_program(
			ProgramBuilder::new()
				.i64_const(i)
				.i64_const(i)
				.get_global(g)
				.halt()
				.finish(),
		);

		let fault = vm.execute().unwrap_err();
		assert_eq!(fault.trap, Trap::StackOverflow);
		assert_eq!(vm.stack_pointer(), 1);
		assert_eq!(vm.stack(), &[Value::Integer(1), Value::Integer(1)]);
	}

	#[test]
	fn unknown_constant_is_invalid_operand() {
		let mut vm = VirtualMachine::new();
		vm.put_i64(1);
		vm.set_program(ProgramBuilder::new().i64_const(10).halt().finish());

		let fault = vm.execute().unwrap_err();
		assert_eq!(fault.trap, Trap::InvalidOperand);
		assert_eq!(fault.pc, 8);
		assert!(vm.stack().is_empty());
	}

	#[test]
	fn unknown_float_constant_is_invalid_operand() {
		let mut vm = VirtualMachine::new();
		vm.put_f64(1.0);
		vm.put_i64(1);
		vm.set_program(ProgramBuilder::new().f64_const(10).halt().finish());

		let fault = vm.execute().unwrap_err();
		assert_eq!(fault.trap, Trap::InvalidOperand);
		assert_eq!(fault.pc, 8);
		assert!(vm.stack().is_empty());
	}

	#[test]
	fn float_push_at_capacity_overflows() {
		let mut vm = VirtualMachine::with_config(VmConfig::new().with_stack_capacity(1)).unwrap();
		let f = vm.put_f64(2.5);
		vm.set_program(ProgramBuilder::new().f64_const(f).f64_const(f).halt().finish());

		let fault = vm.execute().unwrap_err();
		assert_eq!(fault.trap, Trap::StackOverflow);
		assert_eq!(fault.pc, 17);
		assert_eq!(vm.stack_pointer(), 0);
		assert_eq!(vm.stack(), &[Value::Float(2.5)]);
	}

	#[test]
	fn unknown_global_is_not_found() {
		let mut vm = VirtualMachine::new();
		let f = vm.put_f64(1.0);
		vm.put_global(Value::Absent);
		vm.set_program(ProgramBuilder::new().f64_const(f).set_global(10).halt().finish());

		let fault = vm.execute().unwrap_err();
		assert_eq!(fault.trap, Trap::GlobalNotFound);
		assert_eq!(vm.stack(), &[Value::Float(1.0)]);

		let mut vm = VirtualMachine::new();
		vm.put_global(Value::Absent);
		vm.set_program(ProgramBuilder::new().get_global(10).halt().finish());
		assert_eq!(vm.execute().unwrap_err().trap, Trap::GlobalNotFound);
		assert_eq!(vm.stack_pointer(), -1);
	}

	#[test]
	fn set_global_checks_slot_before_stack() {
		let mut vm = VirtualMachine::new();
		vm.set_program(ProgramBuilder::new().set_global(0).halt().finish());
		assert_eq!(vm.execute().unwrap_err().trap, Trap::GlobalNotFound);

		let mut vm = VirtualMachine::new();
		let g = vm.put_global(Value::Integer(3));
		vm.set_program(ProgramBuilder::new().set_global(g).halt().finish());
		assert_eq!(vm.execute().unwrap_err().trap, Trap::StackUnderflow);
		assert_eq!(vm.global(g), Some(&Value::Integer(3)));
	}

	#[test]
	fn running_off_the_end_faults() {
		let mut vm = VirtualMachine::new();
		let i = vm.put_i64(3);
		vm.set_program(ProgramBuilder::new().i64_const(i).finish());

		let fault = vm.execute().unwrap_err();
		assert_eq!(fault.trap, Trap::ProgramOverrun);
		assert_eq!(vm.stack(), &[Value::Integer(3)]);
	}

	#[test]
	fn unknown_opcode_faults() {
		let mut vm = VirtualMachine::new();
		vm.set_program(vec![0xEE]);
		assert_eq!(vm.execute().unwrap_err().trap, Trap::InvalidOpcode(0xEE));
	}

	#[test]
	fn empty_program_stays_idle() {
		let mut vm = VirtualMachine::new();
		assert!(vm.is_halted());
		vm.execute().expect("empty program");
		assert_eq!(vm.program_counter(), -1);
	}

	#[test]
	fn rerun_keeps_registers() {
		let mut vm = VirtualMachine::new();
		let i = vm.put_i64(1);
		let first = ProgramBuilder::new().i64_const(i).halt().finish();
		let first_len = first.len() as isize;
		vm.set_program(first);
		vm.execute().expect("first run");
		assert_eq!(vm.program_counter(), first_len - 1);

		// The second buffer is read from the old program counter onwards,
		// so its first instruction is padded out with the skipped bytes.
		let mut second = vec![0u8; first_len as usize];
		second.extend(ProgramBuilder::new().i64_const(i).halt().finish());
		vm.set_program(second);
		vm.execute().expect("second run");

		assert_eq!(vm.stack(), &[Value::Integer(1), Value::Integer(1)]);
	}

	#[test]
	fn rerun_after_fault_resumes_from_fault_pc() {
		let mut vm = VirtualMachine::new();
		let i = vm.put_i64(5);
		vm.set_program(ProgramBuilder::new().pop().halt().finish());
		assert_eq!(vm.execute().unwrap_err().trap, Trap::StackUnderflow);
		assert_eq!(vm.program_counter(), 0);
		assert!(vm.last_fault().is_some());

		// Fetching resumes at index 1, so byte 0 is skipped.
		let mut second = vec![0u8];
		second.extend(ProgramBuilder::new().i64_const(i).halt().finish());
		vm.set_program(second);
		vm.execute().expect("second run");

		assert!(vm.last_fault().is_none());
		assert!(vm.is_halted());
		assert_eq!(vm.stack(), &[Value::Integer(5)]);
		assert_eq!(vm.stack_pointer(), 0);
		assert_eq!(vm.program_counter(), 10);
	}

	#[test]
	fn stack_dump_lists_live_slots() {
		let mut vm = VirtualMachine::new();
		let i = vm.put_i64(69);
		let g = vm.put_global(Value::Absent);
		vm.set_program(ProgramBuilder::new().i64_const(i).get_global(g).halt().finish());
		vm.execute().expect("execution failed");

		assert_eq!(vm.stack_dump().to_string(), "sp: 0 -> i64 69\nsp: 1 -> undefined\n");
	}
}
