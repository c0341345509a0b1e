//! Reference `Game` aggregate.
//!
//! `World` records every effect the interpreters request so tooling and tests
//! can inspect them, and queues structural requests for the `Stage` driver.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use primitives::Prng;
use serde::Serialize;

use super::player::Player;
use crate::game::{
    BulletConversion, BulletSpawn, EnemyId, EnemySpawn, Game, Gauge, ItemKind, LaserCommand,
    LaserHandle, LaserSpawn,
};
use crate::script::Script;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Laser {
    pub spawn: LaserSpawn,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDrop {
    pub x: f64,
    pub y: f64,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spellcard {
    pub face: i32,
    pub number: i32,
    pub name: String,
}

/// Everything the interpreters produced so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Effects {
    pub bullets: Vec<BulletSpawn>,
    pub lasers: BTreeMap<u32, Laser>,
    pub items: Vec<ItemDrop>,
    pub conversions: Vec<BulletConversion>,
    pub score: i64,
    pub gauge: Option<Gauge>,
    pub spellcard: Option<Spellcard>,
    pub spellcard_effect: bool,
}

/// Requests applied by the driver between interpreter steps.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    pub spawns: Vec<(EnemyId, EnemySpawn)>,
    pub dialogue: Option<u32>,
    pub boss_resume: bool,
    pub release_dialogue: bool,
    pub kill_all: bool,
}

pub struct World {
    prng: Prng,
    rank: i32,
    difficulty: i32,
    pub(crate) frame: u32,
    players: Vec<Player>,
    anm_scripts: HashMap<u32, Rc<Script>>,
    boss: Option<EnemyId>,
    msg_wait: bool,
    next_enemy: u32,
    next_laser: u32,
    pub effects: Effects,
    pub(crate) pending: Pending,
}

impl World {
    pub fn new(seed: u16, rank: i32, difficulty: i32, players: Vec<Player>) -> Self {
        let players = if players.is_empty() {
            vec![Player::default()]
        } else {
            players
        };
        Self {
            prng: Prng::new(seed),
            rank,
            difficulty,
            frame: 0,
            players,
            anm_scripts: HashMap::new(),
            boss: None,
            msg_wait: false,
            next_enemy: 0,
            next_laser: 0,
            effects: Effects::default(),
            pending: Pending::default(),
        }
    }

    pub fn add_anm(&mut self, id: u32, script: Rc<Script>) {
        self.anm_scripts.insert(id, script);
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn prng_state(&self) -> &Prng {
        &self.prng
    }
}

impl Game for World {
    fn rank(&self) -> i32 {
        self.rank
    }

    fn difficulty(&self) -> i32 {
        self.difficulty
    }

    fn frame(&self) -> u32 {
        self.frame
    }

    fn prng(&mut self) -> &mut Prng {
        &mut self.prng
    }

    fn player_position(&self) -> (f64, f64, f64) {
        self.players
            .first()
            .map_or((0.0, 0.0, 0.0), |p| (p.x, p.y, 0.0))
    }

    fn player_character(&self) -> i32 {
        self.players.first().map_or(0, |p| p.character)
    }

    fn spawn_enemy(&mut self, spawn: EnemySpawn) -> EnemyId {
        let id = EnemyId(self.next_enemy);
        self.next_enemy += 1;
        self.pending.spawns.push((id, spawn));
        id
    }

    fn fire_bullet(&mut self, bullet: BulletSpawn) {
        self.effects.bullets.push(bullet);
    }

    fn fire_laser(&mut self, laser: LaserSpawn) -> LaserHandle {
        let handle = LaserHandle(self.next_laser);
        self.next_laser += 1;
        self.effects.lasers.insert(
            handle.0,
            Laser {
                spawn: laser,
                cancelled: false,
            },
        );
        handle
    }

    fn laser_command(&mut self, laser: LaserHandle, command: LaserCommand) {
        let Some(state) = self.effects.lasers.get_mut(&laser.0) else {
            return;
        };
        match command {
            LaserCommand::Rotate(delta) => state.spawn.angle += delta,
            LaserCommand::Reposition { x, y, z } => {
                state.spawn.x = x;
                state.spawn.y = y;
                state.spawn.z = z;
            }
            LaserCommand::Cancel => state.cancelled = true,
        }
    }

    fn convert_bullets(&mut self, conversion: BulletConversion) {
        if conversion == BulletConversion::ToItems {
            for bullet in self.effects.bullets.drain(..) {
                self.effects.items.push(ItemDrop {
                    x: bullet.x,
                    y: bullet.y,
                    kind: ItemKind::Star,
                });
            }
        }
        self.effects.conversions.push(conversion);
    }

    fn drop_item(&mut self, x: f64, y: f64, kind: ItemKind) {
        self.effects.items.push(ItemDrop { x, y, kind });
    }

    fn add_score(&mut self, score: i32) {
        self.effects.score += i64::from(score);
    }

    fn refresh_gauge(&mut self, gauge: Gauge) {
        self.effects.gauge = Some(gauge);
    }

    fn start_spellcard(&mut self, face: i32, number: i32, name: String) {
        self.effects.spellcard = Some(Spellcard { face, number, name });
    }

    fn end_spellcard(&mut self) {
        self.effects.spellcard = None;
    }

    fn set_spellcard_effect(&mut self, enabled: bool) {
        self.effects.spellcard_effect = enabled;
    }

    fn anm_script(&self, id: u32) -> Option<Rc<Script>> {
        self.anm_scripts.get(&id).cloned()
    }

    fn boss(&self) -> Option<EnemyId> {
        self.boss
    }

    fn set_boss(&mut self, boss: Option<EnemyId>) {
        self.boss = boss;
    }

    fn msg_wait(&self) -> bool {
        self.msg_wait
    }

    fn set_msg_wait(&mut self, wait: bool) {
        self.msg_wait = wait;
    }

    fn start_dialogue(&mut self, id: u32) {
        self.pending.dialogue = Some(id);
    }

    fn resume_boss(&mut self) {
        self.pending.boss_resume = true;
    }

    fn release_dialogue(&mut self) {
        self.pending.release_dialogue = true;
    }

    fn kill_all_enemies(&mut self) {
        self.pending.kill_all = true;
    }
}
