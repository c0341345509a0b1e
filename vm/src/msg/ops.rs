use std::sync::OnceLock;

use super::vm::MsgContext;
use crate::error::RuntimeError;
use crate::registry::{OpTable, Registry};
use crate::script::{Args, ScriptFormat};

pub type MsgHandler = fn(&mut MsgContext<'_>, &mut Args<'_>) -> Result<(), RuntimeError>;

type Op = Result<(), RuntimeError>;

pub fn registry() -> &'static Registry<MsgHandler> {
    static REGISTRY: OnceLock<Registry<MsgHandler>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        Registry::<MsgHandler>::new(ScriptFormat::Msg).with_version(
            0,
            OpTable::<MsgHandler>::new()
                .op(0, "end", end)
                .op(1, "enter", enter)
                .op(2, "change_face", change_face)
                .op(3, "display_text", display_text)
                .op(4, "pause", pause)
                .op(5, "animate", animate)
                .op(6, "release_main", release_main)
                .op(10, "freeze", freeze)
                .op(12, "exit", exit)
                .op(13, "set_allow_skip", set_allow_skip),
        )
    })
}

fn end(ctx: &mut MsgContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.vm.end(&mut *ctx.game);
    Ok(())
}

fn enter(ctx: &mut MsgContext<'_>, args: &mut Args<'_>) -> Op {
    let side = args.i32()?;
    let effect = args.i32()?;
    ctx.vm.enter(side, effect)
}

fn change_face(ctx: &mut MsgContext<'_>, args: &mut Args<'_>) -> Op {
    let side = args.i32()?;
    let index = args.i32()?;
    if let Some(portrait) = ctx.vm.portrait_mut(side) {
        portrait.sprite.sprite_index = Some(index);
        portrait.sprite.changed = true;
    }
    Ok(())
}

fn display_text(ctx: &mut MsgContext<'_>, args: &mut Args<'_>) -> Op {
    let side = args.i32()?;
    let line = args.i32()?;
    let text = args.text()?;
    ctx.vm.set_text(line, side, text);
    Ok(())
}

fn pause(ctx: &mut MsgContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.vm.sleep_time = args.u32()?;
    Ok(())
}

fn animate(ctx: &mut MsgContext<'_>, args: &mut Args<'_>) -> Op {
    let side = args.i32()?;
    let effect = args.i32()?;
    if let Some(portrait) = ctx.vm.portrait_mut(side) {
        portrait.interrupt(effect);
    }
    Ok(())
}

fn release_main(ctx: &mut MsgContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.game.set_msg_wait(false);
    Ok(())
}

/// Halt the dialogue clock. The message gate keeps its state until released.
fn freeze(ctx: &mut MsgContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.vm.frozen = true;
    Ok(())
}

fn exit(ctx: &mut MsgContext<'_>, args: &mut Args<'_>) -> Op {
    let side = args.i32()?;
    ctx.vm.exit(side);
    Ok(())
}

fn set_allow_skip(ctx: &mut MsgContext<'_>, args: &mut Args<'_>) -> Op {
    ctx.vm.allow_skip = args.i32()? != 0;
    Ok(())
}
