//! Program Image Loader
//!
//! Reads and writes the `NUMB` container: constant pools, initial globals
//! and the program buffer. Structural validation only; operand indices are
//! checked when the program runs.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::config::VmConfig;
use crate::error::{NumbError, NumbResult};
use crate::vm::object::ObjectRef;
use crate::vm::value::Value;
use crate::vm::VirtualMachine;

/// Image magic: "NUMB"
pub const IMAGE_MAGIC: [u8; 4] = *b"NUMB";

/// Supported image version
pub const IMAGE_VERSION: u8 = 1;

const TAG_ABSENT: u8 = 0x00;
const TAG_INTEGER: u8 = 0x01;
const TAG_FLOAT: u8 = 0x02;
const TAG_OBJECT: u8 = 0x03;

/// Everything needed to run a program on a fresh VM
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramImage {
    pub i64_constants: Vec<i64>,
    pub f64_constants: Vec<f64>,
    pub globals: Vec<Value>,
    pub program: Vec<u8>,
}

impl ProgramImage {
    /// Build a VM, register every pool entry in order and install the program.
    ///
    /// The VM is fresh, so pool indices match positions in the image.
    pub fn into_vm(self, config: VmConfig) -> NumbResult<VirtualMachine> {
        let mut vm = VirtualMachine::with_config(config)?;
        for v in self.i64_constants {
            vm.put_i64(v);
        }
        for v in self.f64_constants {
            vm.put_f64(v);
        }
        for v in self.globals {
            vm.put_global(v);
        }
        vm.set_program(self.program);
        Ok(vm)
    }

    pub fn encode(&self) -> NumbResult<Vec<u8>> {
        let mut out = Vec::new();
        out.write_all(&IMAGE_MAGIC)?;
        out.write_u8(IMAGE_VERSION)?;
        out.write_all(&[0u8; 3])?;

        write_len(&mut out, self.i64_constants.len())?;
        for &v in &self.i64_constants {
            out.write_i64::<LittleEndian>(v)?;
        }

        write_len(&mut out, self.f64_constants.len())?;
        for &v in &self.f64_constants {
            out.write_f64::<LittleEndian>(v)?;
        }

        write_len(&mut out, self.globals.len())?;
        for v in &self.globals {
            write_value(&mut out, v)?;
        }

        write_len(&mut out, self.program.len())?;
        out.write_all(&self.program)?;
        Ok(out)
    }
}

/// Image loader
pub struct BytecodeLoader;

impl BytecodeLoader {
    /// Load an image from raw bytes
    pub fn load(bytes: &[u8]) -> NumbResult<ProgramImage> {
        let mut cursor = Cursor::new(bytes);

        let mut magic = [0u8; 4];
        read_exact(&mut cursor, &mut magic)?;
        if magic != IMAGE_MAGIC {
            return Err(NumbError::InvalidMagic);
        }

        let version = read(cursor.read_u8())?;
        if version != IMAGE_VERSION {
            return Err(NumbError::UnsupportedVersion(version));
        }

        // Reserved
        read_exact(&mut cursor, &mut [0u8; 3])?;

        let count = read_len(&mut cursor)?;
        let mut i64_constants = Vec::with_capacity(count.min(bytes.len()));
        for _ in 0..count {
            i64_constants.push(read(cursor.read_i64::<LittleEndian>())?);
        }

        let count = read_len(&mut cursor)?;
        let mut f64_constants = Vec::with_capacity(count.min(bytes.len()));
        for _ in 0..count {
            f64_constants.push(read(cursor.read_f64::<LittleEndian>())?);
        }

        let count = read_len(&mut cursor)?;
        let mut globals = Vec::with_capacity(count.min(bytes.len()));
        for _ in 0..count {
            globals.push(Self::read_value(&mut cursor)?);
        }

        let program_len = read_len(&mut cursor)?;
        let start = cursor.position() as usize;
        let program = bytes
            .get(start..start + program_len)
            .ok_or(NumbError::Truncated)?
            .to_vec();

        debug!(
            "loaded image: {} i64, {} f64, {} globals, {} program bytes",
            i64_constants.len(),
            f64_constants.len(),
            globals.len(),
            program.len()
        );

        Ok(ProgramImage {
            i64_constants,
            f64_constants,
            globals,
            program,
        })
    }

    fn read_value(cursor: &mut Cursor<&[u8]>) -> NumbResult<Value> {
        let tag = read(cursor.read_u8())?;
        match tag {
            TAG_ABSENT => Ok(Value::Absent),
            TAG_INTEGER => Ok(Value::Integer(read(cursor.read_i64::<LittleEndian>())?)),
            TAG_FLOAT => Ok(Value::Float(read(cursor.read_f64::<LittleEndian>())?)),
            TAG_OBJECT => Ok(Value::Object(ObjectRef::from_raw(read(
                cursor.read_u64::<LittleEndian>(),
            )?))),
            other => Err(NumbError::InvalidValueTag(other)),
        }
    }
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> NumbResult<()> {
    match *value {
        Value::Absent => out.write_u8(TAG_ABSENT)?,
        Value::Integer(v) => {
            out.write_u8(TAG_INTEGER)?;
            out.write_i64::<LittleEndian>(v)?;
        }
        Value::Float(v) => {
            out.write_u8(TAG_FLOAT)?;
            out.write_f64::<LittleEndian>(v)?;
        }
        Value::Object(r) => {
            out.write_u8(TAG_OBJECT)?;
            out.write_u64::<LittleEndian>(r.raw())?;
        }
    }
    Ok(())
}

fn write_len(out: &mut Vec<u8>, len: usize) -> NumbResult<()> {
    let len = u32::try_from(len).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "section too large")
    })?;
    out.write_u32::<LittleEndian>(len)?;
    Ok(())
}

fn read_len(cursor: &mut Cursor<&[u8]>) -> NumbResult<usize> {
    Ok(read(cursor.read_u32::<LittleEndian>())? as usize)
}

fn read_exact(cursor: &mut Cursor<&[u8]>, buf: &mut [u8]) -> NumbResult<()> {
    read(cursor.read_exact(buf))
}

/// Running out of input is reported as truncation, not as an io error
fn read<T>(result: std::io::Result<T>) -> NumbResult<T> {
    result.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => NumbError::Truncated,
        _ => NumbError::Io(e),
    })
}
