//! Stores, random draws and arithmetic on addressed variables.
//!
//! Integer and float opcodes differ only in how their operands are decoded;
//! the computation itself follows whatever value type the operands hold.

use std::f64::consts::PI;

use primitives::Value;

use super::vm::EclContext;
use crate::error::RuntimeError;
use crate::script::Args;

type Op = Result<(), RuntimeError>;

pub(super) fn set_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let value = ctx.int_operand(args)?;
    ctx.write(var, value)
}

pub(super) fn set_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let value = ctx.float_operand(args)?;
    ctx.write(var, value)
}

fn draw_below(ctx: &mut EclContext<'_>, bound: Value) -> Result<i32, RuntimeError> {
    let draw = ctx.game.prng().rand_u32();
    let bound = bound.as_i32();
    if bound == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok((i64::from(draw) % i64::from(bound)) as i32)
}

pub(super) fn set_random_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let max = ctx.int_operand(args)?;
    let value = draw_below(ctx, max)?;
    ctx.write(var, Value::Int(value))
}

pub(super) fn set_random_int2(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let min = ctx.int_operand(args)?;
    let amp = ctx.int_operand(args)?;
    let value = draw_below(ctx, amp)?;
    ctx.write(var, Value::Int(min.as_i32().wrapping_add(value)))
}

pub(super) fn set_random_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let max = ctx.float_operand(args)?;
    let value = max.as_f64() * ctx.game.prng().rand_double();
    ctx.write(var, Value::Float(value))
}

pub(super) fn set_random_float2(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let amp = ctx.float_operand(args)?;
    let min = ctx.float_operand(args)?;
    let value = min.as_f64() + amp.as_f64() * ctx.game.prng().rand_double();
    ctx.write(var, Value::Float(value))
}

pub(super) fn store_x(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let x = ctx.enemy.x;
    ctx.write(var, Value::Float(x))
}

#[derive(Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

fn apply(op: BinOp, a: Value, b: Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => Ok(a.add(b)),
        BinOp::Sub => Ok(a.sub(b)),
        BinOp::Mul => Ok(a.mul(b)),
        BinOp::Div => a.checked_div(b).ok_or(RuntimeError::DivisionByZero),
        BinOp::Rem => a.checked_rem(b).ok_or(RuntimeError::DivisionByZero),
    }
}

fn binary(ctx: &mut EclContext<'_>, args: &mut Args<'_>, op: BinOp, float: bool) -> Op {
    let var = args.i32()?;
    let (a, b) = if float {
        (ctx.float_operand(args)?, ctx.float_operand(args)?)
    } else {
        (ctx.int_operand(args)?, ctx.int_operand(args)?)
    };
    let result = apply(op, a, b)?;
    ctx.write(var, result)
}

pub(super) fn add_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Add, false)
}

pub(super) fn sub_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Sub, false)
}

pub(super) fn mul_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Mul, false)
}

pub(super) fn div_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Div, false)
}

pub(super) fn mod_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Rem, false)
}

pub(super) fn add_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Add, true)
}

pub(super) fn sub_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Sub, true)
}

pub(super) fn mul_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Mul, true)
}

pub(super) fn div_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Div, true)
}

pub(super) fn mod_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    binary(ctx, args, BinOp::Rem, true)
}

pub(super) fn inc_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let value = ctx.read(var)?.add(Value::Int(1));
    ctx.write(var, value)
}

pub(super) fn inc_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let value = ctx.read(var)?.add(Value::Float(1.0));
    ctx.write(var, value)
}

pub(super) fn get_direction(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let x1 = ctx.float_operand(args)?.as_f64();
    let y1 = ctx.float_operand(args)?.as_f64();
    let x2 = ctx.float_operand(args)?.as_f64();
    let y2 = ctx.float_operand(args)?.as_f64();
    ctx.write(var, Value::Float((y2 - y1).atan2(x2 - x1)))
}

/// Wrap an angle into `[-π, π)`.
pub(crate) fn normalize(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

pub(super) fn normalize_angle(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let var = args.i32()?;
    let angle = ctx.read(var)?.as_f64();
    ctx.write(var, Value::Float(normalize(angle)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_wraps_into_half_open_range() {
        assert_eq!(normalize(0.0), 0.0);
        assert!((normalize(-PI / 2.0) - -PI / 2.0).abs() < 1e-12);
        assert!((normalize(2.5 * PI) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_integer_division_by_zero_is_fatal() {
        assert_eq!(
            apply(BinOp::Div, Value::Int(4), Value::Int(0)),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(apply(BinOp::Rem, Value::Int(7), Value::Int(4)), Ok(Value::Int(3)));
    }
}
