//! Numb - CLI
//!
//! Command-line interface to run, inspect and produce Numb program images.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use numb_core::bytecode::disassemble;
use numb_core::config::{DEFAULT_STACK_CAPACITY, MAX_STACK_CAPACITY};
use numb_core::{BytecodeLoader, ProgramBuilder, ProgramImage, Value, VirtualMachine, VmConfig};

#[derive(Parser, Debug)]
#[command(name = "numb", version, about = "Numb stack VM")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute an image and print the final stack
    Run {
        image: PathBuf,

        #[arg(
            long,
            default_value_t = DEFAULT_STACK_CAPACITY,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new()
                .range(1..=MAX_STACK_CAPACITY as u64)
        )]
        stack_capacity: usize,
    },
    /// Print the pools and instruction listing of an image
    Disasm { image: PathBuf },
    /// Run the built-in global round-trip program
    Demo {
        /// Also write the program as an image
        #[arg(long)]
        emit: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logger(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// Returns whether the program ran without a fault
fn run(command: Command) -> Result<bool> {
    match command {
        Command::Run { image, stack_capacity } => {
            let image = load_image(&image)?;
            let vm = image.into_vm(VmConfig::new().with_stack_capacity(stack_capacity))?;
            Ok(execute(vm))
        }
        Command::Disasm { image } => {
            let image = load_image(&image)?;
            print_image(&image)?;
            Ok(true)
        }
        Command::Demo { emit } => {
            let image = demo_image();
            if let Some(path) = emit {
                let bytes = image.encode()?;
                fs::write(&path, bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("wrote {}", path.display());
            }
            Ok(execute(image.into_vm(VmConfig::default())?))
        }
    }
}

fn load_image(path: &Path) -> Result<ProgramImage> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    BytecodeLoader::load(&bytes).with_context(|| format!("invalid image {}", path.display()))
}

fn execute(mut vm: VirtualMachine) -> bool {
    let result = vm.execute();
    print!("{}", vm.stack_dump());
    if let Err(fault) = result {
        eprintln!("Runtime fault: {}", fault);
        return false;
    }
    true
}

fn print_image(image: &ProgramImage) -> Result<()> {
    for (i, v) in image.i64_constants.iter().enumerate() {
        println!("i64[{}] = {}", i, v);
    }
    for (i, v) in image.f64_constants.iter().enumerate() {
        println!("f64[{}] = {}", i, v);
    }
    for (i, v) in image.globals.iter().enumerate() {
        println!("global[{}] = {}", i, v);
    }
    for (offset, instruction) in disassemble(&image.program)? {
        println!("{:04x}: {}", offset, instruction);
    }
    Ok(())
}

/// F64Const 69.420, SetGlobal into a fresh slot, GetGlobal it back
fn demo_image() -> ProgramImage {
    ProgramImage {
        f64_constants: vec![69.420],
        globals: vec![Value::Absent],
        program: ProgramBuilder::new()
            .f64_const(0)
            .set_global(0)
            .get_global(0)
            .halt()
            .finish(),
        ..ProgramImage::default()
    }
}
