use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::ops::{self, MainHandler};
use crate::error::RuntimeError;
use crate::game::{EnemySpawn, Game};
use crate::registry::OpTable;
use crate::script::{Args, Instruction, Script};

/// Spawn coordinates below this are replaced by a random position.
const RANDOM_COORD: f64 = -990.0;
/// Extent of the random position on each axis.
const RANDOM_EXTENT: [f64; 3] = [368.0, 416.0, 800.0];

pub struct MainContext<'a> {
    pub vm: &'a mut MainVm,
    pub game: &'a mut dyn Game,
}

/// The stage timeline: spawns enemies and starts dialogues.
pub struct MainVm {
    script: Rc<Script>,
    table: &'static OpTable<MainHandler>,
    pub frame: u32,
    pub ip: usize,
    pub boss_wait: bool,
}

impl MainVm {
    pub fn new(script: Rc<Script>) -> Result<Self, RuntimeError> {
        let table = ops::main_registry().table(script.version)?;
        Ok(Self {
            script,
            table,
            frame: 0,
            ip: 0,
            boss_wait: false,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.ip >= self.script.len()
    }

    fn gated(&self, game: &dyn Game) -> bool {
        game.msg_wait() || self.boss_wait
    }

    /// Run every entry due this frame unless a message or boss gate holds.
    ///
    /// A gate armed by one of this frame's entries stops the drain without
    /// advancing the frame; the rest of the frame's entries run on release.
    pub fn run_iter(&mut self, game: &mut dyn Game) -> Result<(), RuntimeError> {
        if game.msg_wait() {
            return Ok(());
        }
        if self.boss_wait {
            if game.boss().is_some() {
                return Ok(());
            }
            debug!(frame = self.frame, "boss gone, timeline resumes");
            self.boss_wait = false;
        }

        let script = Rc::clone(&self.script);
        while let Some(instr) = script.get(self.ip) {
            if instr.frame > self.frame {
                break;
            }
            self.ip += 1;
            if instr.frame == self.frame {
                self.dispatch(instr, game)?;
                if self.gated(game) {
                    return Ok(());
                }
            }
        }

        self.frame += 1;
        Ok(())
    }

    fn dispatch(&mut self, instr: &Instruction, game: &mut dyn Game) -> Result<(), RuntimeError> {
        let table = self.table;
        let Some(entry) = table.get(instr.opcode) else {
            warn!(opcode = instr.opcode, frame = self.frame, "unhandled timeline opcode, skipping");
            return Ok(());
        };
        trace!(frame = self.frame, op = entry.name, "timeline");
        let handler = entry.handler;
        let mut args: Args<'_> = instr.args();
        let mut ctx = MainContext { vm: self, game };
        handler(&mut ctx, &mut args)
    }
}

type Op = Result<(), RuntimeError>;

/// Opcodes 0, 2, 4 and 6; bit 2 of the opcode mirrors the enemy.
pub(super) fn spawn_enemy(ctx: &mut MainContext<'_>, args: &mut Args<'_>) -> Op {
    let mirrored = args.opcode() & 4 != 0;
    let raw_sub = args.i32()?;
    let sub = u16::try_from(raw_sub).map_err(|_| RuntimeError::UnknownSubroutine(raw_sub as u16))?;
    let mut coords = [args.f64()?, args.f64()?, args.f64()?];
    let life = args.i32()?;
    let bonus = args.i32()?;
    let score = args.i32()?;

    if let Some(boss) = ctx.game.boss() {
        debug!(sub, boss = boss.0, "boss alive, spawn skipped");
        return Ok(());
    }

    for (coord, extent) in coords.iter_mut().zip(RANDOM_EXTENT) {
        if *coord < RANDOM_COORD {
            *coord = ctx.game.prng().rand_double() * extent;
        }
    }
    let [x, y, z] = coords;
    let id = ctx.game.spawn_enemy(EnemySpawn {
        sub,
        x,
        y,
        z,
        life,
        bonus,
        score,
        mirrored,
    });
    debug!(enemy = id.0, sub, x, y, "spawn");
    Ok(())
}

pub(super) fn call_msg(ctx: &mut MainContext<'_>, args: &mut Args<'_>) -> Op {
    let id = args.u32()?;
    debug!(dialogue = id, "dialogue starts");
    ctx.game.start_dialogue(id);
    Ok(())
}

pub(super) fn wait_msg(ctx: &mut MainContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.game.set_msg_wait(true);
    Ok(())
}

pub(super) fn resume_boss(ctx: &mut MainContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.game.set_msg_wait(false);
    ctx.game.resume_boss();
    ctx.game.release_dialogue();
    Ok(())
}

pub(super) fn wait_for_boss_death(ctx: &mut MainContext<'_>, _: &mut Args<'_>) -> Op {
    ctx.vm.boss_wait = true;
    Ok(())
}
