//! Animation opcode handlers and the per-version tables that name them.

use std::sync::OnceLock;

use primitives::{easing, Easing};

use super::vm::AnmContext;
use crate::error::RuntimeError;
use crate::registry::{OpTable, Registry};
use crate::script::{Args, ScriptFormat};

pub type AnmHandler = fn(&mut AnmContext<'_>, &mut Args<'_>) -> Result<(), RuntimeError>;

type Op = Result<(), RuntimeError>;
type Table = OpTable<AnmHandler>;

/// Opcode of the interrupt-label marker in each version.
pub fn label_opcode(version: u8) -> Option<u16> {
    match version {
        0 => Some(22),
        2 => Some(21),
        _ => None,
    }
}

pub fn registry() -> &'static Registry<AnmHandler> {
    static REGISTRY: OnceLock<Registry<AnmHandler>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        Registry::<AnmHandler>::new(ScriptFormat::Anm)
            .with_version(
                0,
                Table::new()
                    .op(0, "remove", remove)
                    .op(1, "load_sprite", load_sprite)
                    .op(2, "set_scale", set_scale)
                    .op(3, "set_alpha", set_alpha)
                    .op(4, "set_color", set_color)
                    .op(5, "jump", jump)
                    .op(7, "toggle_mirrored", toggle_mirrored)
                    .op(9, "set_rotations", set_rotations)
                    .op(10, "set_rotations_speed", set_rotations_speed)
                    .op(11, "set_scale_speed", set_scale_speed)
                    .op(12, "fade", fade)
                    .op(13, "set_blendmode_add", set_blendmode_add)
                    .op(14, "set_blendmode_alpha", set_blendmode_alpha)
                    .op(15, "keep_still", keep_still)
                    .op(16, "load_random_sprite", load_random_sprite)
                    .op(17, "move", move_to)
                    .op(18, "move_in_linear", move_in_linear)
                    .op(19, "move_in_decel", move_in_decel)
                    .op(20, "move_in_accel", move_in_accel)
                    .op(21, "wait", wait)
                    .op(22, "interrupt_label", nop)
                    .op(23, "set_corner_relative", set_corner_relative)
                    .op(24, "wait_ex", wait_ex)
                    .op(25, "set_allow_offset", set_allow_offset)
                    .op(26, "set_automatic_orientation", set_automatic_orientation)
                    .op(27, "shift_texture_x", shift_texture_x)
                    .op(28, "shift_texture_y", shift_texture_y)
                    .op(29, "set_visible", set_visible)
                    .op(30, "scale_in", scale_in)
                    .op(31, "color_in", color_in)
            )
            .with_version(
                2,
                Table::new()
                    .op(0, "nop", nop)
                    .op(1, "remove", remove)
                    .op(2, "keep_still", keep_still)
                    .op(3, "load_sprite", load_sprite)
                    .op(4, "jump", jump)
                    .op(7, "move", move_to)
                    .op(8, "set_color", set_color)
                    .op(9, "set_alpha", set_alpha)
                    .op(10, "set_rotations", set_rotations)
                    .op(11, "set_rotations_speed", set_rotations_speed)
                    .op(12, "set_scale", set_scale)
                    .op(13, "set_scale_speed", set_scale_speed)
                    .op(14, "fade", fade)
                    .op(15, "set_blendmode", set_blendmode)
                    .op(16, "move_in", move_in)
                    .op(18, "scale_in", scale_in)
                    .op(19, "color_in", color_in)
                    .op(20, "wait_ex", wait_ex)
                    .op(21, "interrupt_label", nop)
                    .op(22, "wait", wait)
                    .op(23, "set_visible", set_visible)
                    .op(24, "toggle_mirrored", toggle_mirrored)
                    .op(25, "load_random_sprite", load_random_sprite)
            )
    })
}

/// Easing selected by a numeric mode argument.
pub(crate) fn easing_mode(mode: i32) -> Option<Easing> {
    match mode {
        1 => Some(easing::decelerate),
        2 => Some(easing::accelerate),
        _ => None,
    }
}

fn channel(v: i32) -> u8 {
    (v & 0xff) as u8
}

fn nop(_: &mut AnmContext<'_>, _: &mut Args<'_>) -> Op {
    Ok(())
}

fn remove(ctx: &mut AnmContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.sprite.removed = true;
    ctx.vm.running = false;
    Ok(())
}

fn keep_still(ctx: &mut AnmContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.vm.running = false;
    Ok(())
}

fn load_sprite(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.sprite_index = Some(args.i32()?);
    ctx.sprite.changed = true;
    Ok(())
}

fn load_random_sprite(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    let min = args.i32()?;
    let amp = args.i32()?;
    let draw = i32::from(ctx.prng.rand_u16());
    let index = if amp > 0 { min + draw % amp } else { min };
    ctx.sprite.sprite_index = Some(index);
    ctx.sprite.changed = true;
    Ok(())
}

fn set_scale(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.scale = (args.f64()?, args.f64()?);
    ctx.sprite.changed = true;
    Ok(())
}

fn set_scale_speed(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.scale_speed = (args.f64()?, args.f64()?);
    Ok(())
}

fn set_alpha(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.alpha = channel(args.i32()?);
    ctx.sprite.changed = true;
    Ok(())
}

fn set_color(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.color = [channel(args.i32()?), channel(args.i32()?), channel(args.i32()?)];
    ctx.sprite.changed = true;
    Ok(())
}

fn jump(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    let ip = args.u32()?;
    ctx.vm.jump(ip as usize);
    Ok(())
}

fn toggle_mirrored(ctx: &mut AnmContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.sprite.mirrored = !ctx.sprite.mirrored;
    ctx.sprite.changed = true;
    Ok(())
}

fn set_rotations(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.rotations = [args.f64()?, args.f64()?, args.f64()?];
    ctx.sprite.changed = true;
    Ok(())
}

fn set_rotations_speed(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.rotation_speeds = [args.f64()?, args.f64()?, args.f64()?];
    Ok(())
}

fn fade(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    let alpha = channel(args.i32()?);
    let duration = args.u32()?;
    ctx.sprite.fade(duration, alpha, None);
    Ok(())
}

fn set_blendmode_add(ctx: &mut AnmContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.sprite.blend_add = true;
    ctx.sprite.changed = true;
    Ok(())
}

fn set_blendmode_alpha(ctx: &mut AnmContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.sprite.blend_add = false;
    ctx.sprite.changed = true;
    Ok(())
}

fn set_blendmode(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.blend_add = args.i32()? & 1 != 0;
    ctx.sprite.changed = true;
    Ok(())
}

fn move_to(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.dest_offset = [args.f64()?, args.f64()?, args.f64()?];
    ctx.sprite.changed = true;
    Ok(())
}

fn move_in_with(ctx: &mut AnmContext<'_>, args: &mut Args<'_>, curve: Option<Easing>) -> Op {
    let (x, y, z) = (args.f64()?, args.f64()?, args.f64()?);
    let duration = args.u32()?;
    ctx.sprite.move_in(duration, x, y, z, curve);
    Ok(())
}

fn move_in_linear(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    move_in_with(ctx, args, None)
}

fn move_in_decel(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    move_in_with(ctx, args, Some(easing::decelerate))
}

fn move_in_accel(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    move_in_with(ctx, args, Some(easing::accelerate))
}

fn move_in(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    let mode = args.i32()?;
    move_in_with(ctx, args, easing_mode(mode))
}

fn wait(ctx: &mut AnmContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.vm.waiting = true;
    Ok(())
}

fn wait_ex(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    let duration = args.u32()?;
    ctx.vm.waiting = true;
    ctx.vm.timeout = Some(ctx.sprite.frame + duration);
    Ok(())
}

fn set_corner_relative(ctx: &mut AnmContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.sprite.corner_relative = true;
    ctx.sprite.changed = true;
    Ok(())
}

fn set_allow_offset(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.allow_offset = args.i32()? != 0;
    Ok(())
}

fn set_automatic_orientation(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.automatic_orientation = args.i32()? != 0;
    Ok(())
}

fn shift_texture_x(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.texture_offset.0 += args.f64()?;
    ctx.sprite.changed = true;
    Ok(())
}

fn shift_texture_y(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.texture_offset.1 += args.f64()?;
    ctx.sprite.changed = true;
    Ok(())
}

fn set_visible(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.sprite.visible = args.i32()? & 1 != 0;
    ctx.sprite.changed = true;
    Ok(())
}

fn scale_in(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    let (sx, sy) = (args.f64()?, args.f64()?);
    let duration = args.u32()?;
    ctx.sprite.scale_in(duration, sx, sy, None);
    Ok(())
}

fn color_in(ctx: &mut AnmContext<'_>, args: &mut Args<'_>) -> Op {
    let (r, g, b) = (channel(args.i32()?), channel(args.i32()?), channel(args.i32()?));
    let duration = args.u32()?;
    ctx.sprite.color_in(duration, r, g, b, None);
    Ok(())
}
