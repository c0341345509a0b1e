//! The surface the interpreters consume from the surrounding game.
//!
//! Interpreters never own bullets, lasers, items or other enemies. They ask the
//! `Game` aggregate to create them, and query it for rank, difficulty, the
//! current frame, player state and the shared generator. Structural requests
//! (starting a dialogue, killing every enemy, resuming a boss) are queued by the
//! aggregate and applied by the driver between steps.

use std::rc::Rc;

use primitives::Prng;
use serde::Serialize;

use crate::script::Script;

/// Stable handle of a live enemy inside the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EnemyId(pub u32);

/// Handle of a laser owned by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LaserHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemySpawn {
    pub sub: u16,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub life: i32,
    /// Item kind dropped on death, negative for none.
    pub bonus: i32,
    pub score: i32,
    pub mirrored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulletSpawn {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub speed: f64,
    pub anim: i32,
    pub sprite_offset: i32,
    pub flags: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaserSpawn {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub laser_type: i32,
    pub sprite: i32,
    pub angle: f64,
    pub speed: f64,
    pub start_offset: f64,
    pub end_offset: f64,
    pub max_length: f64,
    pub width: f64,
    pub start_duration: i32,
    pub duration: i32,
    pub end_duration: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LaserCommand {
    Rotate(f64),
    Reposition { x: f64, y: f64, z: f64 },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BulletConversion {
    /// Re-aim every live bullet at the player.
    ToHoming { speed: f64 },
    /// Turn every live bullet into a star item.
    ToItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemKind {
    Power,
    Point,
    BigPower,
    Bomb,
    FullPower,
    Life,
    Star,
}

impl ItemKind {
    pub fn from_index(index: i32) -> Option<Self> {
        Some(match index {
            0 => Self::Power,
            1 => Self::Point,
            2 => Self::BigPower,
            3 => Self::Bomb,
            4 => Self::FullPower,
            5 => Self::Life,
            6 => Self::Star,
            _ => return None,
        })
    }
}

/// Life/spell gauge state pushed to the interface layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gauge {
    pub life: i32,
    pub low_life_trigger: Option<i32>,
    pub timeout: Option<u32>,
}

pub trait Game {
    fn rank(&self) -> i32;
    fn difficulty(&self) -> i32;
    fn frame(&self) -> u32;
    fn prng(&mut self) -> &mut Prng;
    fn player_position(&self) -> (f64, f64, f64);
    fn player_character(&self) -> i32;

    fn spawn_enemy(&mut self, spawn: EnemySpawn) -> EnemyId;
    fn fire_bullet(&mut self, bullet: BulletSpawn);
    fn fire_laser(&mut self, laser: LaserSpawn) -> LaserHandle;
    fn laser_command(&mut self, laser: LaserHandle, command: LaserCommand);
    fn convert_bullets(&mut self, conversion: BulletConversion);
    fn drop_item(&mut self, x: f64, y: f64, kind: ItemKind);
    fn add_score(&mut self, score: i32);

    fn refresh_gauge(&mut self, gauge: Gauge);
    fn start_spellcard(&mut self, face: i32, number: i32, name: String);
    fn end_spellcard(&mut self);
    fn set_spellcard_effect(&mut self, enabled: bool);

    fn anm_script(&self, id: u32) -> Option<Rc<Script>>;

    fn boss(&self) -> Option<EnemyId>;
    fn set_boss(&mut self, boss: Option<EnemyId>);
    fn msg_wait(&self) -> bool;
    fn set_msg_wait(&mut self, wait: bool);

    fn start_dialogue(&mut self, id: u32);
    /// Fire the boss-resume callback on the current boss.
    fn resume_boss(&mut self);
    /// Release a frozen dialogue.
    fn release_dialogue(&mut self);
    fn kill_all_enemies(&mut self);

    /// Angle from `(x, y)` towards the player.
    fn angle_to_player(&self, x: f64, y: f64) -> f64 {
        let (px, py, _) = self.player_position();
        (py - y).atan2(px - x)
    }
}
