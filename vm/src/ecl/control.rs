use std::cmp::Ordering;

use primitives::Value;

use super::vm::EclContext;
use crate::error::RuntimeError;
use crate::script::Args;

type Op = Result<(), RuntimeError>;

/// Decode a `(frame, ip)` jump target.
fn target(args: &mut Args<'_>) -> Result<(u32, usize), RuntimeError> {
    let frame = args.u32()?;
    let ip = args.u32()? as usize;
    Ok((frame, ip))
}

fn sub_id(args: &mut Args<'_>) -> Result<u16, RuntimeError> {
    let raw = args.i32()?;
    u16::try_from(raw).map_err(|_| RuntimeError::UnknownSubroutine(raw as u16))
}

pub(super) fn jump(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let (frame, ip) = target(args)?;
    ctx.vm.jump(frame, ip);
    Ok(())
}

/// Decrement the counter, then jump while it stays positive.
pub(super) fn jump_counter(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let (frame, ip) = target(args)?;
    let var = args.i32()?;
    let counter = ctx.read(var)?.sub(Value::Int(1));
    ctx.write(var, counter)?;
    if counter.as_f64() > 0.0 {
        ctx.vm.jump(frame, ip);
    }
    Ok(())
}

pub(super) fn compare_int(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let a = ctx.int_operand(args)?;
    let b = ctx.int_operand(args)?;
    ctx.vm.comparison = a.compare(b);
    Ok(())
}

pub(super) fn compare_float(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let a = ctx.float_operand(args)?;
    let b = ctx.float_operand(args)?;
    ctx.vm.comparison = a.compare(b);
    Ok(())
}

fn jump_if(ctx: &mut EclContext<'_>, args: &mut Args<'_>, holds: fn(Ordering) -> bool) -> Op {
    let (frame, ip) = target(args)?;
    if holds(ctx.vm.comparison) {
        ctx.vm.jump(frame, ip);
    }
    Ok(())
}

pub(super) fn jump_if_less(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    jump_if(ctx, args, Ordering::is_lt)
}

pub(super) fn jump_if_less_equal(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    jump_if(ctx, args, Ordering::is_le)
}

pub(super) fn jump_if_equal(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    jump_if(ctx, args, Ordering::is_eq)
}

pub(super) fn jump_if_greater(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    jump_if(ctx, args, Ordering::is_gt)
}

pub(super) fn jump_if_greater_equal(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    jump_if(ctx, args, Ordering::is_ge)
}

pub(super) fn jump_if_not_equal(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    jump_if(ctx, args, Ordering::is_ne)
}

pub(super) fn call(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let sub = sub_id(args)?;
    let p1 = ctx.int_operand(args)?.as_i32();
    let p2 = ctx.float_operand(args)?.as_f64();
    ctx.vm.call(sub, p1, p2)
}

pub(super) fn ret(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.vm.ret()
}

pub(super) fn call_if_equal(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let sub = sub_id(args)?;
    let p1 = ctx.int_operand(args)?.as_i32();
    let p2 = ctx.float_operand(args)?.as_f64();
    let a = ctx.int_operand(args)?;
    let b = ctx.int_operand(args)?;
    if a.compare(b) == Ordering::Equal {
        ctx.vm.call(sub, p1, p2)?;
    }
    Ok(())
}

pub(super) fn skip_frames(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let frames = args.u32()?;
    ctx.vm.frame += frames;
    Ok(())
}
