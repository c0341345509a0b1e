use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::ops::{self, MsgHandler};
use crate::anm::AnimatedSprite;
use crate::error::RuntimeError;
use crate::game::Game;
use crate::registry::OpTable;
use crate::script::{Args, Instruction, Script};

/// Portrait slots: 0 is the player side, 1 the opponent side.
pub const SIDES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueText {
    pub side: i32,
    pub text: String,
}

pub struct MsgContext<'a> {
    pub vm: &'a mut DialogueVm,
    pub game: &'a mut dyn Game,
}

/// One running conversation.
pub struct DialogueVm {
    script: Rc<Script>,
    table: &'static OpTable<MsgHandler>,
    pub frame: u32,
    pub ip: usize,
    pub sleep_time: u32,
    pub frozen: bool,
    pub ended: bool,
    pub allow_skip: bool,
    portraits: [Option<AnimatedSprite>; SIDES],
    portrait_scripts: [Option<Rc<Script>>; SIDES],
    texts: BTreeMap<i32, DialogueText>,
}

impl DialogueVm {
    pub fn new(
        script: Rc<Script>,
        portrait_scripts: [Option<Rc<Script>>; SIDES],
    ) -> Result<Self, RuntimeError> {
        let table = ops::registry().table(script.version)?;
        Ok(Self {
            script,
            table,
            frame: 0,
            ip: 0,
            sleep_time: 0,
            frozen: false,
            ended: false,
            allow_skip: true,
            portraits: [None, None],
            portrait_scripts,
            texts: BTreeMap::new(),
        })
    }

    pub fn portrait(&self, side: usize) -> Option<&AnimatedSprite> {
        self.portraits.get(side).and_then(Option::as_ref)
    }

    pub fn text(&self, line: i32) -> Option<&DialogueText> {
        self.texts.get(&line)
    }

    pub fn texts(&self) -> &BTreeMap<i32, DialogueText> {
        &self.texts
    }

    /// Cut the current pause short, if the script allows it.
    pub fn skip(&mut self) {
        if self.allow_skip {
            self.sleep_time = 0;
        }
    }

    /// Restart the clock and open the message gate.
    pub fn unfreeze(&mut self, game: &mut dyn Game) {
        debug!(frame = self.frame, "dialogue released");
        self.frozen = false;
        game.set_msg_wait(false);
    }

    pub(crate) fn end(&mut self, game: &mut dyn Game) {
        debug!(frame = self.frame, "dialogue ends");
        self.ended = true;
        game.set_msg_wait(false);
    }

    pub(crate) fn slot(&self, side: i32) -> Option<usize> {
        usize::try_from(side).ok().filter(|&s| s < SIDES)
    }

    pub(crate) fn enter(&mut self, side: i32, effect: i32) -> Result<(), RuntimeError> {
        let Some(slot) = self.slot(side) else {
            warn!(side, "no such portrait side");
            return Ok(());
        };
        let Some(script) = self.portrait_scripts[slot].clone() else {
            warn!(side, "no portrait script for this side");
            return Ok(());
        };
        let mut portrait = AnimatedSprite::new(script)?;
        portrait.interrupt(effect);
        self.portraits[slot] = Some(portrait);
        Ok(())
    }

    pub(crate) fn portrait_mut(&mut self, side: i32) -> Option<&mut AnimatedSprite> {
        let slot = self.slot(side)?;
        self.portraits[slot].as_mut()
    }

    pub(crate) fn exit(&mut self, side: i32) {
        if let Some(slot) = self.slot(side) {
            self.portraits[slot] = None;
        }
    }

    pub(crate) fn set_text(&mut self, line: i32, side: i32, text: String) {
        self.texts.insert(line, DialogueText { side, text });
    }

    /// Drain due instructions, then advance the clock or the pause.
    pub fn run_iteration(&mut self, game: &mut dyn Game) -> Result<(), RuntimeError> {
        if self.ended {
            return Ok(());
        }

        let script = Rc::clone(&self.script);
        loop {
            let Some(instr) = script.get(self.ip) else {
                self.end(game);
                return Ok(());
            };
            if instr.frame > self.frame {
                break;
            }
            self.ip += 1;
            if instr.frame == self.frame {
                self.dispatch(instr, game)?;
                if self.ended {
                    return Ok(());
                }
            }
        }

        if !self.frozen {
            if self.sleep_time > 0 {
                self.sleep_time -= 1;
            } else {
                self.frame += 1;
            }
        }

        for portrait in self.portraits.iter_mut().flatten() {
            portrait.update(game.prng())?;
        }
        Ok(())
    }

    fn dispatch(&mut self, instr: &Instruction, game: &mut dyn Game) -> Result<(), RuntimeError> {
        let table = self.table;
        let Some(entry) = table.get(instr.opcode) else {
            warn!(opcode = instr.opcode, frame = self.frame, "unhandled msg opcode, skipping");
            return Ok(());
        };
        trace!(frame = self.frame, op = entry.name, "msg");
        let handler = entry.handler;
        let mut args: Args<'_> = instr.args();
        let mut ctx = MsgContext { vm: self, game };
        handler(&mut ctx, &mut args)
    }
}
