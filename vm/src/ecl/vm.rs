use std::cmp::Ordering;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::enemy::Enemy;
use super::frame::{CallFrame, Registers};
use super::ops::{self, EclHandler};
use super::special::BossBehaviors;
use crate::error::RuntimeError;
use crate::game::Game;
use crate::registry::OpTable;
use crate::script::{Args, EclProgram, Instruction, Script};

/// Everything a per-enemy handler may touch.
pub struct EclContext<'a> {
    pub vm: &'a mut EnemyVm,
    pub enemy: &'a mut Enemy,
    pub game: &'a mut dyn Game,
}

/// Register-machine interpreter bound to one enemy.
pub struct EnemyVm {
    program: Rc<EclProgram>,
    behaviors: Rc<BossBehaviors>,
    table: &'static OpTable<EclHandler>,
    script: Rc<Script>,
    pub sub: u16,
    pub frame: u32,
    pub ip: usize,
    pub running: bool,
    pub registers: Registers,
    pub comparison: Ordering,
    pub stack: Vec<CallFrame>,
}

impl EnemyVm {
    pub fn new(
        program: Rc<EclProgram>,
        behaviors: Rc<BossBehaviors>,
        sub: u16,
    ) -> Result<Self, RuntimeError> {
        let script = Rc::clone(program.sub(sub).ok_or(RuntimeError::UnknownSubroutine(sub))?);
        let table = ops::sub_registry().table(script.version)?;
        Ok(Self {
            program,
            behaviors,
            table,
            script,
            sub,
            frame: 0,
            ip: 0,
            running: true,
            registers: Registers::default(),
            comparison: Ordering::Equal,
            stack: Vec::new(),
        })
    }

    pub fn behaviors(&self) -> Rc<BossBehaviors> {
        Rc::clone(&self.behaviors)
    }

    /// Rebind to the start of subroutine `sub`.
    pub fn switch_to_sub(&mut self, sub: u16) -> Result<(), RuntimeError> {
        let script = self
            .program
            .sub(sub)
            .ok_or(RuntimeError::UnknownSubroutine(sub))?;
        self.script = Rc::clone(script);
        self.sub = sub;
        self.frame = 0;
        self.ip = 0;
        self.running = true;
        Ok(())
    }

    pub fn jump(&mut self, frame: u32, ip: usize) {
        self.frame = frame;
        self.ip = ip;
    }

    /// Push the current state and enter `sub` with its two parameters seeded.
    pub fn call(&mut self, sub: u16, p1: i32, p2: f64) -> Result<(), RuntimeError> {
        self.stack.push(CallFrame {
            sub: self.sub,
            frame: self.frame,
            ip: self.ip,
            registers: self.registers,
            comparison: self.comparison,
        });
        self.switch_to_sub(sub)?;
        self.registers.set(0, p1.into());
        self.registers.set(4, p2.into());
        Ok(())
    }

    pub fn ret(&mut self) -> Result<(), RuntimeError> {
        let saved = self.stack.pop().ok_or(RuntimeError::CallStackUnderflow)?;
        self.switch_to_sub(saved.sub)?;
        self.frame = saved.frame;
        self.ip = saved.ip;
        self.registers = saved.registers;
        self.comparison = saved.comparison;
        Ok(())
    }

    /// Fire the boss-resume callback if one is armed.
    pub fn resume_boss(&mut self, enemy: &mut Enemy) -> Result<bool, RuntimeError> {
        match enemy.callbacks.boss_resume.take() {
            Some(sub) => {
                debug!(enemy = enemy.id.0, sub, "boss resumes");
                self.switch_to_sub(sub)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Evaluate death, low-life and timeout triggers; the first that holds
    /// fires and disarms itself.
    fn handle_callbacks(&mut self, enemy: &mut Enemy, game: &mut dyn Game) -> Result<(), RuntimeError> {
        if enemy.life <= 0 && enemy.touchable {
            if enemy.die(game) {
                if let Some(sub) = enemy.callbacks.death.take() {
                    self.switch_to_sub(sub)?;
                }
            } else {
                self.running = false;
            }
        } else if enemy.low_life_trigger.is_some_and(|t| enemy.life <= t)
            && enemy.callbacks.low_life.is_some()
        {
            if let Some(sub) = enemy.callbacks.low_life.take() {
                self.switch_to_sub(sub)?;
            }
        } else if enemy.timeout.is_some_and(|t| enemy.frame == t) {
            enemy.timeout = None;
            if let Some(sub) = enemy.callbacks.timeout.take() {
                self.switch_to_sub(sub)?;
            } else if enemy.touchable {
                enemy.life = 0;
            }
            game.refresh_gauge(enemy.gauge());
        }
        Ok(())
    }

    /// Execute one frame of the bound subroutine.
    pub fn run_iteration(&mut self, enemy: &mut Enemy, game: &mut dyn Game) -> Result<(), RuntimeError> {
        if enemy.removed {
            self.running = false;
        }
        if !self.running {
            return Ok(());
        }

        self.handle_callbacks(enemy, game)?;
        if !self.running {
            return Ok(());
        }

        if let Some(function) = enemy.special_callback {
            let behaviors = Rc::clone(&self.behaviors);
            behaviors.call(function, 0, enemy, game)?;
        }

        let difficulty = game.difficulty();
        while self.running {
            let script = Rc::clone(&self.script);
            let Some(instr) = script.get(self.ip) else {
                self.running = false;
                break;
            };
            if instr.frame > self.frame {
                break;
            }
            self.ip += 1;
            if instr.frame == self.frame && instr.enabled_for(difficulty) {
                self.dispatch(instr, enemy, game)?;
            }
        }

        self.frame += 1;
        Ok(())
    }

    fn dispatch(
        &mut self,
        instr: &Instruction,
        enemy: &mut Enemy,
        game: &mut dyn Game,
    ) -> Result<(), RuntimeError> {
        let table = self.table;
        let Some(entry) = table.get(instr.opcode) else {
            warn!(
                opcode = instr.opcode,
                sub = self.sub,
                frame = self.frame,
                "unhandled ecl opcode, skipping"
            );
            return Ok(());
        };
        trace!(sub = self.sub, frame = self.frame, op = entry.name, "ecl");
        let handler = entry.handler;
        let mut args: Args<'_> = instr.args();
        let mut ctx = EclContext {
            vm: self,
            enemy,
            game,
        };
        handler(&mut ctx, &mut args)
    }
}
