//! Reference stage driver.
//!
//! Owns the timeline, the live enemies and the running dialogue, and steps
//! them in a fixed order against a [`World`].

mod player;
mod world;

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anm::Sprite;
use crate::ecl::{BossBehaviors, Enemy, EnemyVm, MainVm};
use crate::error::RuntimeError;
use crate::game::{EnemyId, Game};
use crate::msg::{DialogueText, DialogueVm, SIDES};
use crate::script::{EclProgram, Script};

pub use player::{Player, PlayerProfile};
pub use world::{Effects, ItemDrop, Laser, Spellcard, World};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub seed: u16,
    pub difficulty: i32,
    pub rank: i32,
    pub stage: u8,
    pub players: Vec<Player>,
}

/// An enemy and the interpreter bound to it.
pub struct LiveEnemy {
    pub enemy: Enemy,
    pub vm: EnemyVm,
}

pub struct Stage {
    world: World,
    main: MainVm,
    program: Rc<EclProgram>,
    behaviors: Rc<BossBehaviors>,
    enemies: Vec<LiveEnemy>,
    dialogue: Option<DialogueVm>,
    msg_scripts: HashMap<u32, Rc<Script>>,
    portraits: [Option<u32>; SIDES],
}

impl Stage {
    pub fn new(config: StageConfig, program: EclProgram) -> Result<Self, RuntimeError> {
        let program = Rc::new(program);
        let main = MainVm::new(Rc::clone(&program.main))?;
        Ok(Self {
            world: World::new(config.seed, config.rank, config.difficulty, config.players),
            main,
            program,
            behaviors: Rc::new(BossBehaviors::for_stage(config.stage)),
            enemies: Vec::new(),
            dialogue: None,
            msg_scripts: HashMap::new(),
            portraits: [None; SIDES],
        })
    }

    pub fn with_anm(mut self, id: u32, script: Script) -> Self {
        self.world.add_anm(id, Rc::new(script));
        self
    }

    pub fn with_msg(mut self, id: u32, script: Script) -> Self {
        self.msg_scripts.insert(id, Rc::new(script));
        self
    }

    /// Animation script ids used for the two dialogue portraits.
    pub fn with_portraits(mut self, portraits: [Option<u32>; SIDES]) -> Self {
        self.portraits = portraits;
        self
    }

    pub fn with_behaviors(mut self, behaviors: BossBehaviors) -> Self {
        self.behaviors = Rc::new(behaviors);
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn main(&self) -> &MainVm {
        &self.main
    }

    pub fn enemies(&self) -> &[LiveEnemy] {
        &self.enemies
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&LiveEnemy> {
        self.enemies.iter().find(|e| e.enemy.id == id)
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut LiveEnemy> {
        self.enemies.iter_mut().find(|e| e.enemy.id == id)
    }

    pub fn dialogue(&self) -> Option<&DialogueVm> {
        self.dialogue.as_ref()
    }

    pub fn dialogue_mut(&mut self) -> Option<&mut DialogueVm> {
        self.dialogue.as_mut()
    }

    pub fn frame(&self) -> u32 {
        self.world.frame
    }

    /// Unfreeze the running dialogue and let the timeline continue.
    pub fn release_dialogue(&mut self) {
        if let Some(dialogue) = self.dialogue.as_mut() {
            dialogue.unfreeze(&mut self.world);
        }
    }

    /// Advance the whole stage by one frame.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        self.main.run_iter(&mut self.world)?;
        self.adopt_spawns()?;

        for live in &mut self.enemies {
            live.vm.run_iteration(&mut live.enemy, &mut self.world)?;
            live.enemy.update(&mut self.world)?;
        }
        self.adopt_spawns()?;

        self.apply_requests()?;

        let boss = self.world.boss();
        self.enemies.retain(|live| {
            if live.enemy.removed {
                debug!(enemy = live.enemy.id.0, "enemy removed");
            }
            !live.enemy.removed
        });
        if boss.is_some_and(|id| !self.enemies.iter().any(|e| e.enemy.id == id)) {
            self.world.set_boss(None);
        }

        if let Some(dialogue) = self.dialogue.as_mut() {
            dialogue.run_iteration(&mut self.world)?;
            if dialogue.ended {
                self.dialogue = None;
            }
        }

        self.world.frame += 1;
        Ok(())
    }

    pub fn run(&mut self, frames: u32) -> Result<(), RuntimeError> {
        for _ in 0..frames {
            self.step()?;
        }
        Ok(())
    }

    fn adopt_spawns(&mut self) -> Result<(), RuntimeError> {
        for (id, spawn) in std::mem::take(&mut self.world.pending.spawns) {
            let vm = EnemyVm::new(Rc::clone(&self.program), Rc::clone(&self.behaviors), spawn.sub)?;
            self.enemies.push(LiveEnemy {
                enemy: Enemy::new(id, &spawn),
                vm,
            });
        }
        Ok(())
    }

    fn apply_requests(&mut self) -> Result<(), RuntimeError> {
        let pending = std::mem::take(&mut self.world.pending);

        if pending.kill_all {
            for live in self.enemies.iter_mut().filter(|e| !e.enemy.boss) {
                if live.enemy.touchable {
                    live.enemy.life = 0;
                } else {
                    live.enemy.removed = true;
                }
            }
        }

        if pending.boss_resume {
            let boss = self.world.boss();
            match self.enemies.iter_mut().find(|e| Some(e.enemy.id) == boss) {
                Some(live) => {
                    live.vm.resume_boss(&mut live.enemy)?;
                }
                None => debug!("boss resume requested without a boss"),
            }
        }

        if pending.release_dialogue {
            self.release_dialogue();
        }

        if let Some(id) = pending.dialogue {
            let script = self
                .msg_scripts
                .get(&id)
                .cloned()
                .ok_or(RuntimeError::UnknownScript(id))?;
            let portraits = self.portraits.map(|p| p.and_then(|id| self.world.anm_script(id)));
            self.dialogue = Some(DialogueVm::new(script, portraits)?);
        }
        self.world.pending.spawns = pending.spawns;
        Ok(())
    }

    pub fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            frame: self.world.frame,
            seed: self.world.prng_state().seed(),
            boss: self.world.boss(),
            msg_wait: self.world.msg_wait(),
            timeline_finished: self.main.is_finished(),
            enemies: self.enemies.iter().map(EnemySnapshot::from).collect(),
            dialogue: self.dialogue.as_ref().map(DialogueSnapshot::from),
            effects: self.world.effects.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageSnapshot {
    pub frame: u32,
    pub seed: u16,
    pub boss: Option<EnemyId>,
    pub msg_wait: bool,
    pub timeline_finished: bool,
    pub enemies: Vec<EnemySnapshot>,
    pub dialogue: Option<DialogueSnapshot>,
    pub effects: Effects,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemySnapshot {
    pub id: EnemyId,
    pub sub: u16,
    pub vm_frame: u32,
    pub running: bool,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub life: i32,
    pub boss: bool,
    pub anim: Option<Sprite>,
    pub anim_active: bool,
}

impl From<&LiveEnemy> for EnemySnapshot {
    fn from(live: &LiveEnemy) -> Self {
        let enemy = &live.enemy;
        Self {
            id: enemy.id,
            sub: live.vm.sub,
            vm_frame: live.vm.frame,
            running: live.vm.running,
            x: enemy.x,
            y: enemy.y,
            z: enemy.z,
            life: enemy.life,
            boss: enemy.boss,
            anim: enemy.anim.as_ref().map(|a| a.sprite.clone()),
            anim_active: enemy.anim.as_ref().is_some_and(|a| a.is_active()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DialogueSnapshot {
    pub frame: u32,
    pub frozen: bool,
    pub portraits: Vec<Option<Sprite>>,
    pub texts: BTreeMap<i32, DialogueText>,
}

impl From<&DialogueVm> for DialogueSnapshot {
    fn from(vm: &DialogueVm) -> Self {
        Self {
            frame: vm.frame,
            frozen: vm.frozen,
            portraits: (0..SIDES)
                .map(|side| vm.portrait(side).map(|p| p.sprite.clone()))
                .collect(),
            texts: vm.texts().clone(),
        }
    }
}
