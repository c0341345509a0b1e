use std::collections::HashMap;
use std::rc::Rc;

use primitives::Prng;
use tracing::{trace, warn};

use super::ops::{self, AnmHandler};
use super::sprite::Sprite;
use crate::error::RuntimeError;
use crate::registry::OpTable;
use crate::script::{Args, Instruction, Script};

/// Everything an animation handler may touch.
pub struct AnmContext<'a> {
    pub vm: &'a mut AnmVm,
    pub sprite: &'a mut Sprite,
    pub prng: &'a mut Prng,
}

/// Cursor over one animation script, bound to one sprite by its owner.
pub struct AnmVm {
    script: Rc<Script>,
    table: &'static OpTable<AnmHandler>,
    pub frame: u32,
    pub ip: usize,
    pub running: bool,
    pub waiting: bool,
    /// Sprite frame at which a timed wait resumes.
    pub timeout: Option<u32>,
    /// Interrupt id -> (frame, ip) of the instruction after the marker.
    labels: HashMap<i32, (u32, usize)>,
}

impl AnmVm {
    pub fn new(script: Rc<Script>) -> Result<Self, RuntimeError> {
        let table = ops::registry().table(script.version)?;
        let marker = ops::label_opcode(script.version);
        let labels = script
            .instructions
            .iter()
            .enumerate()
            .filter(|(_, instr)| Some(instr.opcode) == marker)
            .map(|(ip, instr)| {
                let id = instr.args().i32()?;
                let frame = script.get(ip + 1).map_or(instr.frame, |next| next.frame);
                Ok((id, (frame, ip + 1)))
            })
            .collect::<Result<HashMap<_, _>, RuntimeError>>()?;

        Ok(Self {
            script,
            table,
            frame: 0,
            ip: 0,
            running: true,
            waiting: false,
            timeout: None,
            labels,
        })
    }

    pub fn script(&self) -> &Rc<Script> {
        &self.script
    }

    pub fn has_label(&self, id: i32) -> bool {
        self.labels.contains_key(&id)
    }

    /// Execute everything due this frame, then advance unless blocked.
    ///
    /// Returns `false` once the script is exhausted or has stopped itself; the
    /// owner should then drop the VM.
    pub fn run_frame(&mut self, sprite: &mut Sprite, prng: &mut Prng) -> Result<bool, RuntimeError> {
        if !self.running {
            return Ok(false);
        }

        let script = Rc::clone(&self.script);
        while self.running && !self.waiting {
            let Some(instr) = script.get(self.ip) else {
                self.running = false;
                break;
            };
            if instr.frame > self.frame {
                break;
            }
            self.ip += 1;
            if instr.frame == self.frame {
                self.dispatch(instr, sprite, prng)?;
            }
        }

        if !self.waiting {
            self.frame += 1;
        } else if self.timeout == Some(sprite.frame) {
            self.waiting = false;
            self.timeout = None;
        }

        sprite.update();
        Ok(self.running)
    }

    fn dispatch(
        &mut self,
        instr: &Instruction,
        sprite: &mut Sprite,
        prng: &mut Prng,
    ) -> Result<(), RuntimeError> {
        let table = self.table;
        let Some(entry) = table.get(instr.opcode) else {
            warn!(
                opcode = instr.opcode,
                version = self.script.version,
                frame = self.frame,
                "unhandled anm opcode, skipping"
            );
            return Ok(());
        };
        trace!(frame = self.frame, op = entry.name, "anm");
        let handler = entry.handler;
        let mut args: Args<'_> = instr.args();
        let mut ctx = AnmContext {
            vm: self,
            sprite,
            prng,
        };
        handler(&mut ctx, &mut args)
    }

    /// Relocate to the label registered for `id`, or the default label.
    pub fn interrupt(&mut self, sprite: &mut Sprite, id: i32) -> bool {
        let Some(&(frame, ip)) = self.labels.get(&id).or_else(|| self.labels.get(&-1)) else {
            return false;
        };
        self.frame = frame;
        self.ip = ip;
        self.waiting = false;
        self.timeout = None;
        sprite.visible = true;
        true
    }

    /// Move the cursor to `ip`, adopting that instruction's frame.
    pub fn jump(&mut self, ip: usize) {
        if let Some(instr) = self.script.get(ip) {
            self.frame = instr.frame;
        }
        self.ip = ip;
    }
}

/// A sprite together with the animation currently driving it.
pub struct AnimatedSprite {
    pub sprite: Sprite,
    pub vm: Option<AnmVm>,
}

impl AnimatedSprite {
    pub fn new(script: Rc<Script>) -> Result<Self, RuntimeError> {
        Ok(Self {
            sprite: Sprite::new(),
            vm: Some(AnmVm::new(script)?),
        })
    }

    pub fn is_active(&self) -> bool {
        self.vm.is_some()
    }

    pub fn update(&mut self, prng: &mut Prng) -> Result<(), RuntimeError> {
        if let Some(vm) = self.vm.as_mut() {
            if !vm.run_frame(&mut self.sprite, prng)? {
                self.vm = None;
            }
        }
        Ok(())
    }

    pub fn interrupt(&mut self, id: i32) -> bool {
        match self.vm.as_mut() {
            Some(vm) => vm.interrupt(&mut self.sprite, id),
            None => false,
        }
    }
}
