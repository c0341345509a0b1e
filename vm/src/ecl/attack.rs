use tracing::debug;

use super::enemy::{BulletAttributes, BulletPattern};
use super::vm::EclContext;
use crate::error::RuntimeError;
use crate::game::{LaserCommand, LaserSpawn};
use crate::script::Args;

type Op = Result<(), RuntimeError>;

/// Shared by opcodes 67-73; the opcode selects the pattern.
pub(super) fn set_bullet_attributes(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let Some(pattern) = BulletPattern::from_opcode(args.opcode()) else {
        return Ok(());
    };
    let anim = args.i32()?;
    let sprite_offset = args.i32()?;
    let per_shot = ctx.int_operand(args)?.as_i32();
    let shots = ctx.int_operand(args)?.as_i32();
    let speed = ctx.float_operand(args)?.as_f64();
    let speed2 = ctx.float_operand(args)?.as_f64();
    let launch_angle = ctx.float_operand(args)?.as_f64();
    let angle = ctx.float_operand(args)?.as_f64();
    let flags = args.i32()?;

    ctx.enemy.bullet_attributes = Some(BulletAttributes {
        pattern,
        anim,
        sprite_offset,
        per_shot,
        shots,
        speed,
        speed2,
        launch_angle,
        angle,
        flags,
    });
    if !ctx.enemy.delay_attack {
        ctx.enemy.fire(&mut *ctx.game);
    }
    Ok(())
}

pub(super) fn set_bullet_interval(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.bullet_interval = args.u32()?;
    ctx.enemy.fire_timer = 0;
    Ok(())
}

pub(super) fn set_bullet_interval_random_start(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let interval = args.u32()?;
    ctx.enemy.bullet_interval = interval;
    ctx.enemy.fire_timer = if interval > 0 {
        ctx.game.prng().rand_u32() % interval
    } else {
        0
    };
    Ok(())
}

pub(super) fn delay_attack(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.enemy.delay_attack = true;
    Ok(())
}

pub(super) fn no_delay_attack(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.enemy.delay_attack = false;
    Ok(())
}

pub(super) fn set_bullet_launch_offset(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let x = ctx.float_operand(args)?.as_f64();
    let y = ctx.float_operand(args)?.as_f64();
    let z = ctx.float_operand(args)?.as_f64();
    ctx.enemy.bullet_launch_offset = (x, y, z);
    Ok(())
}

pub(super) fn fire(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.enemy.fire(&mut *ctx.game);
    Ok(())
}

fn new_laser_with(ctx: &mut EclContext<'_>, args: &mut Args<'_>, aimed: bool) -> Op {
    let laser_type = args.i32()?;
    let sprite = args.i32()?;
    let mut angle = ctx.float_operand(args)?.as_f64();
    let speed = ctx.float_operand(args)?.as_f64();
    let start_offset = ctx.float_operand(args)?.as_f64();
    let end_offset = ctx.float_operand(args)?.as_f64();
    let max_length = ctx.float_operand(args)?.as_f64();
    let width = ctx.float_operand(args)?.as_f64();
    let start_duration = ctx.int_operand(args)?.as_i32();
    let duration = ctx.int_operand(args)?.as_i32();
    let end_duration = ctx.int_operand(args)?.as_i32();

    if aimed {
        angle += ctx.enemy.angle_to_player(&*ctx.game);
    }
    let (ox, oy, oz) = ctx.enemy.bullet_launch_offset;
    let handle = ctx.game.fire_laser(LaserSpawn {
        x: ctx.enemy.x + ox,
        y: ctx.enemy.y + oy,
        z: ctx.enemy.z + oz,
        laser_type,
        sprite,
        angle,
        speed,
        start_offset,
        end_offset,
        max_length,
        width,
        start_duration,
        duration,
        end_duration,
    });
    let id = ctx.enemy.upcoming_laser_id;
    ctx.enemy.lasers.insert(id, handle);
    Ok(())
}

pub(super) fn new_laser(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    new_laser_with(ctx, args, false)
}

pub(super) fn new_laser_towards_player(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    new_laser_with(ctx, args, true)
}

pub(super) fn set_upcoming_laser_id(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.upcoming_laser_id = args.u32()?;
    Ok(())
}

fn laser_command(ctx: &mut EclContext<'_>, id: u32, command: LaserCommand) {
    match ctx.enemy.lasers.get(&id) {
        Some(&handle) => ctx.game.laser_command(handle, command),
        None => debug!(enemy = ctx.enemy.id.0, laser = id, "no laser under this id"),
    }
}

pub(super) fn alter_laser_angle(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let id = args.u32()?;
    let delta = ctx.float_operand(args)?.as_f64();
    laser_command(ctx, id, LaserCommand::Rotate(delta));
    Ok(())
}

pub(super) fn reposition_laser(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let id = args.u32()?;
    let ox = ctx.float_operand(args)?.as_f64();
    let oy = ctx.float_operand(args)?.as_f64();
    let oz = ctx.float_operand(args)?.as_f64();
    let command = LaserCommand::Reposition {
        x: ctx.enemy.x + ox,
        y: ctx.enemy.y + oy,
        z: ctx.enemy.z + oz,
    };
    laser_command(ctx, id, command);
    Ok(())
}

pub(super) fn cancel_laser(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let id = args.u32()?;
    laser_command(ctx, id, LaserCommand::Cancel);
    ctx.enemy.lasers.remove(&id);
    Ok(())
}
