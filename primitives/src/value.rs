use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A numeric register value.
///
/// Registers are not typed by the instruction that writes them: an integer
/// opcode applied to a float slot operates on the float, and vice versa.
/// The variant only records which numeric domain the last write came from.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Float(f64),
}

impl Value {
    // --- Constructors ---

    #[inline]
    pub fn int(val: i32) -> Self {
        Value::Int(val)
    }

    #[inline]
    pub fn float(val: f64) -> Self {
        Value::Float(val)
    }

    // --- Checks ---

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    // --- Accessors ---

    /// Float view of the value.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Int(i) => f64::from(i),
            Value::Float(f) => f,
        }
    }

    /// Integer view of the value, truncating toward zero.
    #[inline]
    pub fn as_i32(&self) -> i32 {
        match *self {
            Value::Int(i) => i,
            Value::Float(f) => f as i32,
        }
    }

    /// Returns the value as an exact integer if it has no fractional part.
    ///
    /// Used for variable addressing, where float operands may carry an id.
    pub fn as_exact_int(&self) -> Option<i32> {
        match *self {
            Value::Int(i) => Some(i),
            Value::Float(f) if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) => {
                Some(f as i32)
            }
            Value::Float(_) => None,
        }
    }

    // --- Arithmetic ---

    fn binary(self, other: Value, int_op: fn(i32, i32) -> i32, float_op: fn(f64, f64) -> f64) -> Value {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Value::Int(int_op(a, b)),
            (a, b) => Value::Float(float_op(a.as_f64(), b.as_f64())),
        }
    }

    pub fn add(self, other: Value) -> Value {
        self.binary(other, i32::wrapping_add, |a, b| a + b)
    }

    pub fn sub(self, other: Value) -> Value {
        self.binary(other, i32::wrapping_sub, |a, b| a - b)
    }

    pub fn mul(self, other: Value) -> Value {
        self.binary(other, i32::wrapping_mul, |a, b| a * b)
    }

    /// Division. Integer operands divide with truncation; `None` on an
    /// integer division by zero.
    pub fn checked_div(self, other: Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(_), Value::Int(0)) => None,
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_div(b))),
            (a, b) => Some(Value::Float(a.as_f64() / b.as_f64())),
        }
    }

    /// Remainder with the sign of the dividend; `None` on an integer zero divisor.
    pub fn checked_rem(self, other: Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(_), Value::Int(0)) => None,
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_rem(b))),
            (a, b) => Some(Value::Float(a.as_f64() % b.as_f64())),
        }
    }

    /// Signed three-way comparison. NaN compares equal to everything.
    pub fn compare(self, other: Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(&b),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(v) => write!(f, "Float({:?})", v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}
