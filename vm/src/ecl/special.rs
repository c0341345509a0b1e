//! Boss-specific attack patterns behind the "special function" opcodes.
//!
//! Each stage gets its own table from function id to behavior, so the
//! interpreter itself never branches on boss identity.

use std::collections::HashMap;
use std::f64::consts::PI;

use tracing::warn;

use super::enemy::Enemy;
use crate::error::RuntimeError;
use crate::game::{BulletConversion, Game, LaserSpawn};

pub trait SpecialFunction {
    fn name(&self) -> &'static str;

    fn call(&self, enemy: &mut Enemy, game: &mut dyn Game, arg: i32) -> Result<(), RuntimeError>;
}

/// Re-aims every live bullet at the player; `arg` is the speed in tenths.
pub struct BulletsToHoming;

impl SpecialFunction for BulletsToHoming {
    fn name(&self) -> &'static str {
        "bullets_to_homing"
    }

    fn call(&self, _: &mut Enemy, game: &mut dyn Game, arg: i32) -> Result<(), RuntimeError> {
        let speed = if arg > 0 { f64::from(arg) / 10.0 } else { 2.0 };
        game.convert_bullets(BulletConversion::ToHoming { speed });
        Ok(())
    }
}

/// Cancels every live bullet into a star item.
pub struct BulletsToItems;

impl SpecialFunction for BulletsToItems {
    fn name(&self) -> &'static str {
        "bullets_to_items"
    }

    fn call(&self, _: &mut Enemy, game: &mut dyn Game, _: i32) -> Result<(), RuntimeError> {
        game.convert_bullets(BulletConversion::ToItems);
        Ok(())
    }
}

/// Spreads `arg` lasers evenly around the boss, registered under laser ids
/// `0..arg` in the enemy's laser map.
pub struct RingLaserFan {
    pub laser_type: i32,
    pub sprite: i32,
    pub length: f64,
    pub width: f64,
}

impl SpecialFunction for RingLaserFan {
    fn name(&self) -> &'static str {
        "ring_laser_fan"
    }

    fn call(&self, enemy: &mut Enemy, game: &mut dyn Game, arg: i32) -> Result<(), RuntimeError> {
        let count = u32::try_from(arg).unwrap_or(0);
        if count == 0 {
            return Ok(());
        }
        let base = enemy.angle_to_player(game);
        for n in 0..count {
            let angle = base + 2.0 * PI * f64::from(n) / f64::from(count);
            let handle = game.fire_laser(LaserSpawn {
                x: enemy.x,
                y: enemy.y,
                z: enemy.z,
                laser_type: self.laser_type,
                sprite: self.sprite,
                angle,
                speed: 0.0,
                start_offset: 0.0,
                end_offset: self.length,
                max_length: self.length,
                width: self.width,
                start_duration: 30,
                duration: 120,
                end_duration: 30,
            });
            enemy.lasers.insert(n, handle);
        }
        Ok(())
    }
}

/// Function id -> behavior for one stage.
#[derive(Default)]
pub struct BossBehaviors {
    functions: HashMap<i32, Box<dyn SpecialFunction>>,
}

impl BossBehaviors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: i32, function: Box<dyn SpecialFunction>) -> Self {
        self.functions.insert(id, function);
        self
    }

    /// The table used by `stage`. Every stage can cancel bullets into items;
    /// the later stages swap homing bullets for the laser fan.
    pub fn for_stage(stage: u8) -> Self {
        let table = Self::new().with(0, Box::new(BulletsToItems));
        if stage >= 4 {
            table.with(
                1,
                Box::new(RingLaserFan {
                    laser_type: 0,
                    sprite: 2,
                    length: 400.0,
                    width: 16.0,
                }),
            )
        } else {
            table.with(1, Box::new(BulletsToHoming))
        }
    }

    pub fn name(&self, id: i32) -> Option<&'static str> {
        self.functions.get(&id).map(|f| f.name())
    }

    pub fn call(
        &self,
        id: i32,
        arg: i32,
        enemy: &mut Enemy,
        game: &mut dyn Game,
    ) -> Result<(), RuntimeError> {
        match self.functions.get(&id) {
            Some(function) => function.call(enemy, game, arg),
            None => {
                warn!(function = id, arg, "unknown special function, skipping");
                Ok(())
            }
        }
    }
}
