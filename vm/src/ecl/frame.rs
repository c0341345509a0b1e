use std::cmp::Ordering;

use primitives::Value;
use serde::Serialize;

pub const REGISTER_COUNT: usize = 12;

/// The 12 local slots of an enemy interpreter.
///
/// Slots 0-3 and 8-11 start as integers, 4-7 as floats. Slots are not typed
/// at rest: any store replaces the slot with whatever value was computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Registers(pub [Value; REGISTER_COUNT]);

impl Default for Registers {
    fn default() -> Self {
        let mut slots = [Value::Int(0); REGISTER_COUNT];
        for slot in &mut slots[4..8] {
            *slot = Value::Float(0.0);
        }
        Self(slots)
    }
}

impl Registers {
    pub fn get(&self, slot: usize) -> Value {
        self.0[slot]
    }

    pub fn set(&mut self, slot: usize, value: Value) {
        self.0[slot] = value;
    }
}

/// Saved interpreter state, pushed by `call` and restored verbatim by `ret`.
#[derive(Debug, Clone)]
pub struct CallFrame {
    pub sub: u16,
    pub frame: u32,
    pub ip: usize,
    pub registers: Registers,
    pub comparison: Ordering,
}
