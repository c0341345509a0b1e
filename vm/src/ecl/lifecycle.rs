//! Appearance, hit flags, life and callbacks, spellcards and spawning.

use tracing::{debug, warn};

use super::vm::EclContext;
use crate::error::RuntimeError;
use crate::game::{EnemySpawn, ItemKind};
use crate::script::Args;

type Op = Result<(), RuntimeError>;

/// Subroutine id argument; negative values disarm.
fn callback_sub(args: &mut Args<'_>) -> Result<Option<u16>, RuntimeError> {
    Ok(u16::try_from(args.i32()?).ok())
}

fn flag(args: &mut Args<'_>) -> Result<bool, RuntimeError> {
    Ok(args.i32()? != 0)
}

pub(super) fn nop(_: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    Ok(())
}

pub(super) fn destroy(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.enemy.removed = true;
    ctx.vm.running = false;
    Ok(())
}

pub(super) fn set_spellcard(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let face = args.i32()?;
    let number = args.i32()?;
    let name = args.text()?;
    debug!(enemy = ctx.enemy.id.0, number, %name, "spellcard");
    ctx.game.start_spellcard(face, number, name);
    Ok(())
}

pub(super) fn end_spellcard(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.game.end_spellcard();
    Ok(())
}

pub(super) fn spawn_enemy(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let raw_sub = args.i32()?;
    let sub = u16::try_from(raw_sub).map_err(|_| RuntimeError::UnknownSubroutine(raw_sub as u16))?;
    let x = ctx.float_operand(args)?.as_f64();
    let y = ctx.float_operand(args)?.as_f64();
    let z = ctx.float_operand(args)?.as_f64();
    let life = ctx.int_operand(args)?.as_i32();
    let bonus = ctx.int_operand(args)?.as_i32();
    let score = ctx.int_operand(args)?.as_i32();
    ctx.game.spawn_enemy(EnemySpawn {
        sub,
        x,
        y,
        z,
        life,
        bonus,
        score,
        mirrored: false,
    });
    Ok(())
}

pub(super) fn kill_all_enemies(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.game.kill_all_enemies();
    Ok(())
}

fn anm_id(args: &mut Args<'_>) -> Result<u32, RuntimeError> {
    let raw = args.i32()?;
    u32::try_from(raw).map_err(|_| RuntimeError::UnknownScript(raw as u32))
}

pub(super) fn set_anim(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let id = anm_id(args)?;
    ctx.enemy.set_anim(&*ctx.game, id)
}

pub(super) fn set_movement_anims(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let default = anm_id(args)?;
    let left = anm_id(args)?;
    let right = anm_id(args)?;
    ctx.enemy.movement_anims = Some((default, left, right));
    ctx.enemy.set_anim(&*ctx.game, default)
}

pub(super) fn set_aux_anim(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let slot = args.i32()?;
    let id = anm_id(args)?;
    ctx.enemy.set_aux_anim(&*ctx.game, slot, id)
}

pub(super) fn set_death_anim(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.death_anim = args.i32()?;
    Ok(())
}

/// Non-negative values make this enemy the boss; negative values release it.
pub(super) fn set_boss_mode(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let value = args.i32()?;
    let id = ctx.enemy.id;
    if value >= 0 {
        ctx.enemy.boss = true;
        ctx.game.set_boss(Some(id));
        debug!(enemy = id.0, "boss mode on");
    } else {
        ctx.enemy.boss = false;
        if ctx.game.boss() == Some(id) {
            ctx.game.set_boss(None);
        }
        debug!(enemy = id.0, "boss mode off");
    }
    Ok(())
}

pub(super) fn set_hitbox(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.hitbox = (args.f64()?, args.f64()?, args.f64()?);
    Ok(())
}

pub(super) fn set_collidable(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.collidable = flag(args)?;
    Ok(())
}

pub(super) fn set_damageable(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.damageable = flag(args)?;
    Ok(())
}

pub(super) fn set_touchable(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.touchable = flag(args)?;
    Ok(())
}

pub(super) fn set_death_flags(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.death_flags = args.i32()?;
    Ok(())
}

pub(super) fn set_death_callback(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.callbacks.death = callback_sub(args)?;
    Ok(())
}

pub(super) fn set_boss_resume_callback(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.callbacks.boss_resume = callback_sub(args)?;
    Ok(())
}

pub(super) fn set_low_life_callback(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.callbacks.low_life = callback_sub(args)?;
    Ok(())
}

pub(super) fn set_timeout_callback(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.callbacks.timeout = callback_sub(args)?;
    Ok(())
}

pub(super) fn set_life(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let life = ctx.int_operand(args)?.as_i32();
    ctx.enemy.life = life;
    ctx.enemy.max_life = life;
    ctx.game.refresh_gauge(ctx.enemy.gauge());
    Ok(())
}

pub(super) fn set_elapsed_time(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.frame = args.u32()?;
    Ok(())
}

pub(super) fn set_low_life_trigger(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.low_life_trigger = Some(ctx.int_operand(args)?.as_i32());
    ctx.game.refresh_gauge(ctx.enemy.gauge());
    Ok(())
}

/// Restart the enemy clock and arm a timeout that many frames away.
pub(super) fn set_timeout(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let timeout = args.u32()?;
    ctx.enemy.frame = 0;
    ctx.enemy.timeout = Some(timeout);
    ctx.game.refresh_gauge(ctx.enemy.gauge());
    Ok(())
}

/// Scatter `count` power items around the enemy.
pub(super) fn drop_bonus(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let count = args.i32()?;
    let (x, y) = (ctx.enemy.x, ctx.enemy.y);
    for n in 0..count {
        let (dx, dy) = if n == 0 {
            (0.0, 0.0)
        } else {
            let prng = ctx.game.prng();
            let dx = prng.rand_double() * 48.0 - 24.0;
            let dy = prng.rand_double() * 48.0 - 24.0;
            (dx, dy)
        };
        ctx.game.drop_item(x + dx, y + dy, ItemKind::Power);
    }
    Ok(())
}

pub(super) fn drop_specific_bonus(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let index = args.i32()?;
    match ItemKind::from_index(index) {
        Some(kind) => ctx.game.drop_item(ctx.enemy.x, ctx.enemy.y, kind),
        None => warn!(index, "unknown bonus kind, skipping"),
    }
    Ok(())
}

pub(super) fn set_remaining_lives(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.enemy.remaining_lives = args.i32()?;
    Ok(())
}

pub(super) fn call_special_function(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let function = args.i32()?;
    let arg = ctx.int_operand(args)?.as_i32();
    let behaviors = ctx.vm.behaviors();
    behaviors.call(function, arg, &mut *ctx.enemy, &mut *ctx.game)
}

pub(super) fn set_special_function_callback(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let function = args.i32()?;
    ctx.enemy.special_callback = (function >= 0).then_some(function);
    Ok(())
}

pub(super) fn interrupt(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let event = args.i32()?;
    if let Some(anim) = ctx.enemy.anim.as_mut() {
        anim.interrupt(event);
    }
    Ok(())
}

pub(super) fn interrupt_aux(ctx: &mut EclContext<'_>, args: &mut Args<'_>) -> Op {
    let slot = args.i32()?;
    let event = args.i32()?;
    if let Some(anim) = ctx.enemy.aux_anims.get_mut(&slot) {
        anim.interrupt(event);
    }
    Ok(())
}

pub(super) fn enable_spellcard_effect(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.game.set_spellcard_effect(true);
    Ok(())
}

pub(super) fn disable_spellcard_effect(ctx: &mut EclContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.game.set_spellcard_effect(false);
    Ok(())
}
