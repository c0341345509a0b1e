//! Decoded script model shared by every interpreter.
//!
//! Scripts arrive from the format decoders as ordered instruction lists whose
//! arguments are still packed the way the original files store them:
//! little-endian 32-bit integers and floats, and NUL-terminated strings.
//! [`Args`] is the cursor handlers use to unpack them.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::error::RuntimeError;

/// Rank mask enabling an instruction on every difficulty.
pub const RANK_ALL: u16 = 0xff00;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptFormat {
    Anm,
    EclMain,
    EclSub,
    Msg,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub frame: u32,
    pub opcode: u16,
    /// Difficulty gate; only the per-enemy interpreter reads it.
    pub rank_mask: u16,
    pub args: Vec<u8>,
}

impl Instruction {
    pub fn new(frame: u32, opcode: u16, args: Vec<u8>) -> Self {
        Self {
            frame,
            opcode,
            rank_mask: RANK_ALL,
            args,
        }
    }

    pub fn with_args(frame: u32, opcode: u16, args: &[Arg]) -> Self {
        Self::new(frame, opcode, encode_args(args))
    }

    pub fn with_rank_mask(mut self, rank_mask: u16) -> Self {
        self.rank_mask = rank_mask;
        self
    }

    pub fn args(&self) -> Args<'_> {
        Args::new(self.opcode, &self.args)
    }

    /// Whether the rank mask lets this instruction run on `difficulty`.
    pub fn enabled_for(&self, difficulty: i32) -> bool {
        let Ok(shift) = u32::try_from(difficulty) else {
            return false;
        };
        match 0x100u16.checked_shl(shift) {
            Some(bit) => self.rank_mask & bit != 0,
            None => false,
        }
    }
}

/// An immutable, frame-ordered instruction list.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub format: ScriptFormat,
    pub version: u8,
    pub instructions: Vec<Instruction>,
}

impl Script {
    pub fn new(format: ScriptFormat, version: u8, instructions: Vec<Instruction>) -> Self {
        Self {
            format,
            version,
            instructions,
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, ip: usize) -> Option<&Instruction> {
        self.instructions.get(ip)
    }

    /// Frames never decrease along the instruction list.
    pub fn is_frame_ordered(&self) -> bool {
        self.instructions
            .windows(2)
            .all(|pair| pair[0].frame <= pair[1].frame)
    }
}

/// The enemy-behavior half of a stage: the spawn timeline plus the
/// subroutines enemies execute.
#[derive(Debug, Clone)]
pub struct EclProgram {
    pub main: Rc<Script>,
    pub subs: Vec<Rc<Script>>,
}

impl EclProgram {
    pub fn new(main: Script, subs: Vec<Script>) -> Self {
        Self {
            main: Rc::new(main),
            subs: subs.into_iter().map(Rc::new).collect(),
        }
    }

    pub fn sub(&self, id: u16) -> Option<&Rc<Script>> {
        self.subs.get(usize::from(id))
    }
}

/// A typed argument, as written by tooling and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Int(i32),
    Float(f32),
    Text(String),
}

/// Pack typed arguments into the decoder byte layout.
pub fn encode_args(args: &[Arg]) -> Vec<u8> {
    let mut out = Vec::with_capacity(args.len() * 4);
    for arg in args {
        let mut word = [0u8; 4];
        match arg {
            Arg::Int(v) => {
                LittleEndian::write_i32(&mut word, *v);
                out.extend_from_slice(&word);
            }
            Arg::Float(v) => {
                LittleEndian::write_f32(&mut word, *v);
                out.extend_from_slice(&word);
            }
            Arg::Text(s) => {
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
        }
    }
    out
}

/// Sequential reader over an instruction's packed arguments.
#[derive(Debug, Clone)]
pub struct Args<'a> {
    opcode: u16,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Args<'a> {
    pub fn new(opcode: u16, bytes: &'a [u8]) -> Self {
        Self {
            opcode,
            bytes,
            pos: 0,
        }
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn rest(&self) -> &'a [u8] {
        let bytes: &'a [u8] = self.bytes;
        &bytes[self.pos..]
    }

    fn truncated(&self, needed: usize) -> RuntimeError {
        RuntimeError::TruncatedArgs {
            opcode: self.opcode,
            needed: self.pos + needed,
            available: self.bytes.len(),
        }
    }

    pub fn i32(&mut self) -> Result<i32, RuntimeError> {
        let mut rest = self.rest();
        let v = rest
            .read_i32::<LittleEndian>()
            .map_err(|_| self.truncated(4))?;
        self.pos += 4;
        Ok(v)
    }

    pub fn f32(&mut self) -> Result<f32, RuntimeError> {
        let mut rest = self.rest();
        let v = rest
            .read_f32::<LittleEndian>()
            .map_err(|_| self.truncated(4))?;
        self.pos += 4;
        Ok(v)
    }

    /// A float argument widened to `f64`.
    pub fn f64(&mut self) -> Result<f64, RuntimeError> {
        self.f32().map(f64::from)
    }

    /// A 32-bit argument used as a frame count, duration or index.
    pub fn u32(&mut self) -> Result<u32, RuntimeError> {
        let value = self.i32()?;
        u32::try_from(value).map_err(|_| RuntimeError::NegativeArgument {
            opcode: self.opcode,
            value,
        })
    }

    /// A NUL-terminated (or argument-terminated) UTF-8 string.
    pub fn text(&mut self) -> Result<String, RuntimeError> {
        let rest = self.rest();
        let len = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        let text = std::str::from_utf8(&rest[..len])
            .map_err(|_| RuntimeError::InvalidText(self.opcode))?
            .to_string();
        self.pos += (len + 1).min(rest.len());
        Ok(text)
    }

    /// Render the remaining bytes as 32-bit words for disassembly.
    pub fn words(&self) -> Vec<i32> {
        self.rest()
            .chunks_exact(4)
            .map(LittleEndian::read_i32)
            .collect()
    }
}
