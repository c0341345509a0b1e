use primitives::{easing, Easing};

use super::vm::EclContext;
use crate::error::RuntimeError;
use crate::script::Args;

type Op = Result<(), RuntimeError>;

fn position(ctx: &EclContext<'_>, args: &mut Args<'_>) -> Result<(f64, f64, f64), RuntimeError> {
    let x = ctx.float_operand(args)?.as_f64();
    let y = ctx.float_operand(args)?.as_f64();
    let z = ctx.float_operand(args)?.as_f64();
    Ok((x, y, z))
}

pub(super) fn set_pos(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let (x, y, z) = position(ctx, args)?;
    ctx.enemy.set_pos(x, y, z);
    Ok(())
}

pub(super) fn set_angle_and_speed(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.angle = ctx.float_operand(args)?.as_f64();
    ctx.enemy.speed = ctx.float_operand(args)?.as_f64();
    Ok(())
}

pub(super) fn set_rotation_speed(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.rotation_speed = ctx.float_operand(args)?.as_f64();
    Ok(())
}

pub(super) fn set_speed(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.speed = ctx.float_operand(args)?.as_f64();
    Ok(())
}

pub(super) fn set_acceleration(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.acceleration = ctx.float_operand(args)?.as_f64();
    Ok(())
}

pub(super) fn set_random_angle(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let min = ctx.float_operand(args)?.as_f64();
    let max = ctx.float_operand(args)?.as_f64();
    ctx.enemy.angle = min + (max - min) * ctx.game.prng().rand_double();
    Ok(())
}

pub(super) fn target_player(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let _unused = args.i32()?;
    let speed = ctx.float_operand(args)?.as_f64();
    ctx.enemy.angle = ctx.game.angle_to_player(ctx.enemy.x, ctx.enemy.y);
    ctx.enemy.speed = speed;
    Ok(())
}

fn move_to(ctx: &mut EclContext<'_>, args: &mut Args<'_>, curve: Option<Easing>) -> Op {
    let duration = args.u32()?;
    let (x, y, z) = position(ctx, args)?;
    ctx.enemy.move_to(duration, x, y, z, curve);
    Ok(())
}

pub(super) fn move_to_linear(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    move_to(ctx, args, None)
}

pub(super) fn move_to_decel(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    move_to(ctx, args, Some(easing::decelerate))
}

pub(super) fn move_to_accel(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    move_to(ctx, args, Some(easing::accelerate))
}

fn stop_in(ctx: &mut EclContext<'_>, args: &mut Args<'_>, curve: Option<Easing>) -> Op {
    let duration = args.u32()?;
    ctx.enemy.stop_in(duration, curve);
    Ok(())
}

pub(super) fn stop_in_linear(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    stop_in(ctx, args, None)
}

pub(super) fn stop_in_decel(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    stop_in(ctx, args, Some(easing::decelerate))
}

pub(super) fn stop_in_accel(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    stop_in(ctx, args, Some(easing::accelerate))
}

pub(super) fn set_screen_box(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let min_x = args.f64()?;
    let min_y = args.f64()?;
    let max_x = args.f64()?;
    let max_y = args.f64()?;
    ctx.enemy.screen_box = Some((min_x, min_y, max_x, max_y));
    Ok(())
}

pub(super) fn clear_screen_box(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.enemy.screen_box = None;
    Ok(())
}
