use std::collections::BTreeMap;
use std::f64::consts::PI;

use primitives::{Easing, Interpolator};
use serde::Serialize;
use tracing::debug;

use crate::anm::AnimatedSprite;
use crate::error::RuntimeError;
use crate::game::{BulletSpawn, EnemyId, EnemySpawn, Game, Gauge, LaserHandle};

/// Minimum launch speed of an enemy bullet.
const MIN_BULLET_SPEED: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Left,
    Right,
}

/// The bullet pattern armed by the last `set_bullet_attributes` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BulletPattern {
    AimedFan,
    FixedFan,
    AimedRing,
    FixedRing,
    AimedRingOffset,
    RandomSpeedRing,
    RandomAngleAndSpeed,
}

impl BulletPattern {
    pub fn from_opcode(opcode: u16) -> Option<Self> {
        Some(match opcode {
            67 => Self::AimedFan,
            68 => Self::FixedFan,
            69 => Self::AimedRing,
            70 => Self::FixedRing,
            71 => Self::AimedRingOffset,
            72 => Self::RandomSpeedRing,
            73 => Self::RandomAngleAndSpeed,
            _ => return None,
        })
    }

    fn is_aimed(self) -> bool {
        matches!(self, Self::AimedFan | Self::AimedRing | Self::AimedRingOffset)
    }

    fn is_ring(self) -> bool {
        !matches!(self, Self::AimedFan | Self::FixedFan)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulletAttributes {
    pub pattern: BulletPattern,
    pub anim: i32,
    pub sprite_offset: i32,
    pub per_shot: i32,
    pub shots: i32,
    pub speed: f64,
    pub speed2: f64,
    pub launch_angle: f64,
    pub angle: f64,
    pub flags: i32,
}

/// Screen clamp box: `(min_x, min_y, max_x, max_y)`.
pub type ScreenBox = (f64, f64, f64, f64);

/// One-shot callbacks, each a subroutine id disarmed when it fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Callbacks {
    pub death: Option<u16>,
    pub low_life: Option<u16>,
    pub timeout: Option<u16>,
    pub boss_resume: Option<u16>,
}

pub struct Enemy {
    pub id: EnemyId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub mirrored: bool,
    pub frame: u32,

    pub life: i32,
    pub max_life: i32,
    pub bonus: i32,
    pub score: i32,
    pub remaining_lives: i32,

    pub angle: f64,
    pub speed: f64,
    pub rotation_speed: f64,
    pub acceleration: f64,
    pub movement: Option<Interpolator<3>>,
    pub speed_interpolator: Option<Interpolator<1>>,
    pub screen_box: Option<ScreenBox>,
    direction: Option<Direction>,

    pub bullet_attributes: Option<BulletAttributes>,
    pub bullet_launch_offset: (f64, f64, f64),
    pub bullet_interval: u32,
    pub fire_timer: u32,
    pub delay_attack: bool,

    pub anim: Option<AnimatedSprite>,
    pub movement_anims: Option<(u32, u32, u32)>,
    pub aux_anims: BTreeMap<i32, AnimatedSprite>,
    pub death_anim: i32,

    pub boss: bool,
    pub hitbox: (f64, f64, f64),
    pub collidable: bool,
    pub damageable: bool,
    pub touchable: bool,

    pub death_flags: i32,
    pub callbacks: Callbacks,
    pub low_life_trigger: Option<i32>,
    pub timeout: Option<u32>,
    pub special_callback: Option<i32>,

    /// Script-visible laser ids mapped to game lasers.
    pub lasers: BTreeMap<u32, LaserHandle>,
    pub upcoming_laser_id: u32,

    pub removed: bool,
}

impl Enemy {
    pub fn new(id: EnemyId, spawn: &EnemySpawn) -> Self {
        Self {
            id,
            x: spawn.x,
            y: spawn.y,
            z: spawn.z,
            mirrored: spawn.mirrored,
            frame: 0,
            life: spawn.life,
            max_life: spawn.life,
            bonus: spawn.bonus,
            score: spawn.score,
            remaining_lives: 0,
            angle: 0.0,
            speed: 0.0,
            rotation_speed: 0.0,
            acceleration: 0.0,
            movement: None,
            speed_interpolator: None,
            screen_box: None,
            direction: None,
            bullet_attributes: None,
            bullet_launch_offset: (0.0, 0.0, 0.0),
            bullet_interval: 0,
            fire_timer: 0,
            delay_attack: false,
            anim: None,
            movement_anims: None,
            aux_anims: BTreeMap::new(),
            death_anim: 0,
            boss: false,
            hitbox: (0.0, 0.0, 0.0),
            collidable: true,
            damageable: true,
            touchable: true,
            death_flags: 0,
            callbacks: Callbacks::default(),
            low_life_trigger: None,
            timeout: None,
            special_callback: None,
            lasers: BTreeMap::new(),
            upcoming_laser_id: 0,
            removed: false,
        }
    }

    pub fn gauge(&self) -> Gauge {
        Gauge {
            life: self.life,
            low_life_trigger: self.low_life_trigger,
            timeout: self.timeout,
        }
    }

    pub fn set_pos(&mut self, x: f64, y: f64, z: f64) {
        self.x = x;
        self.y = y;
        self.z = z;
        self.movement = None;
    }

    pub fn move_to(&mut self, duration: u32, x: f64, y: f64, z: f64, easing: Option<Easing>) {
        self.movement = Some(Interpolator::new(
            [self.x, self.y, self.z],
            self.frame,
            [x, y, z],
            self.frame + duration,
            easing,
        ));
    }

    pub fn stop_in(&mut self, duration: u32, easing: Option<Easing>) {
        self.speed_interpolator = Some(Interpolator::new(
            [self.speed],
            self.frame,
            [0.0],
            self.frame + duration,
            easing,
        ));
    }

    /// Bind the main animation to the script registered under `id`.
    pub fn set_anim(&mut self, game: &dyn Game, id: u32) -> Result<(), RuntimeError> {
        self.anim = Some(load_anim(game, id)?);
        Ok(())
    }

    pub fn set_aux_anim(&mut self, game: &dyn Game, slot: i32, id: u32) -> Result<(), RuntimeError> {
        self.aux_anims.insert(slot, load_anim(game, id)?);
        Ok(())
    }

    pub fn angle_to_player(&self, game: &dyn Game) -> f64 {
        let (ox, oy, _) = self.bullet_launch_offset;
        game.angle_to_player(self.x + ox, self.y + oy)
    }

    /// Launch the armed bullet pattern.
    pub fn fire(&mut self, game: &mut dyn Game) {
        self.fire_timer = 0;
        let Some(attrs) = self.bullet_attributes.clone() else {
            return;
        };

        let (ox, oy, _) = self.bullet_launch_offset;
        let (lx, ly) = (self.x + ox, self.y + oy);
        let per_shot = attrs.per_shot.max(1);
        let shots = attrs.shots.max(1);
        let speed = attrs.speed.max(MIN_BULLET_SPEED);
        let speed2 = attrs.speed2.max(MIN_BULLET_SPEED);

        let mut base = attrs.launch_angle;
        if attrs.pattern.is_aimed() {
            base += game.angle_to_player(lx, ly);
        }
        let step = if attrs.pattern.is_ring() {
            2.0 * PI / f64::from(per_shot)
        } else {
            attrs.angle
        };
        match attrs.pattern {
            BulletPattern::AimedFan | BulletPattern::FixedFan => {
                base -= attrs.angle * f64::from(per_shot - 1) / 2.0;
            }
            BulletPattern::AimedRingOffset => base += PI / f64::from(per_shot),
            _ => {}
        }

        for shot in 0..shots {
            let shot_speed = speed + (speed2 - speed) * f64::from(shot) / f64::from(shots);
            for n in 0..per_shot {
                let mut angle = base + step * f64::from(n);
                let mut bullet_speed = shot_speed;
                match attrs.pattern {
                    BulletPattern::RandomSpeedRing => {
                        bullet_speed = speed2 + game.prng().rand_double() * (speed - speed2);
                    }
                    BulletPattern::RandomAngleAndSpeed => {
                        angle = base + (game.prng().rand_double() * 2.0 - 1.0) * attrs.angle;
                        bullet_speed = speed2 + game.prng().rand_double() * (speed - speed2);
                    }
                    _ => {}
                }
                game.fire_bullet(BulletSpawn {
                    x: lx,
                    y: ly,
                    angle,
                    speed: bullet_speed,
                    anim: attrs.anim,
                    sprite_offset: attrs.sprite_offset,
                    flags: attrs.flags,
                });
            }
        }
    }

    /// Per-frame physics, firing and animation, run after the interpreter.
    ///
    /// A removed enemy is left untouched.
    pub fn update(&mut self, game: &mut dyn Game) -> Result<(), RuntimeError> {
        if self.removed {
            return Ok(());
        }
        let old_x = self.x;

        if let Some(interp) = self.speed_interpolator.as_mut() {
            interp.update(self.frame);
            self.speed = interp.values()[0];
            if interp.is_finished(self.frame) {
                self.speed_interpolator = None;
            }
        } else {
            self.speed += self.acceleration;
        }

        if let Some(interp) = self.movement.as_mut() {
            interp.update(self.frame);
            [self.x, self.y, self.z] = interp.values();
            if interp.is_finished(self.frame) {
                self.movement = None;
            }
        } else {
            self.angle += self.rotation_speed;
            let dx = self.angle.cos() * self.speed;
            let dy = self.angle.sin() * self.speed;
            if self.mirrored {
                self.x -= dx;
            } else {
                self.x += dx;
            }
            self.y += dy;
        }

        if let Some((min_x, min_y, max_x, max_y)) = self.screen_box {
            self.x = self.x.clamp(min_x, max_x.max(min_x));
            self.y = self.y.clamp(min_y, max_y.max(min_y));
        }

        if self.bullet_interval > 0 {
            self.fire_timer += 1;
            if self.fire_timer >= self.bullet_interval {
                self.fire(game);
            }
        }

        self.select_movement_anim(game, old_x)?;

        if let Some(anim) = self.anim.as_mut() {
            anim.update(game.prng())?;
        }
        for anim in self.aux_anims.values_mut() {
            anim.update(game.prng())?;
        }
        self.aux_anims.retain(|_, anim| anim.is_active());

        self.frame += 1;
        Ok(())
    }

    fn select_movement_anim(&mut self, game: &dyn Game, old_x: f64) -> Result<(), RuntimeError> {
        let Some((default, left, right)) = self.movement_anims else {
            return Ok(());
        };
        let direction = if self.x < old_x {
            Some(Direction::Left)
        } else if self.x > old_x {
            Some(Direction::Right)
        } else {
            None
        };
        if direction == self.direction {
            return Ok(());
        }
        let id = match direction {
            Some(Direction::Left) => left,
            Some(Direction::Right) => right,
            None => default,
        };
        self.direction = direction;
        self.set_anim(game, id)
    }

    /// Score, drops and death-flag handling when life runs out.
    ///
    /// Returns whether the enemy survives to run its death callback.
    pub(crate) fn die(&mut self, game: &mut dyn Game) -> bool {
        game.add_score(self.score);
        if let Some(kind) = crate::game::ItemKind::from_index(self.bonus) {
            game.drop_item(self.x, self.y, kind);
        }
        if let Some(anim) = self.anim.as_mut() {
            anim.interrupt(self.death_anim);
        }
        debug!(enemy = self.id.0, flags = self.death_flags, "enemy died");

        match self.death_flags & 7 {
            0 => {
                self.removed = true;
                false
            }
            1 => {
                self.touchable = false;
                true
            }
            2 => {
                self.life = self.max_life;
                true
            }
            3 => {
                game.end_spellcard();
                self.removed = true;
                false
            }
            _ => {
                self.touchable = false;
                true
            }
        }
    }
}

fn load_anim(game: &dyn Game, id: u32) -> Result<AnimatedSprite, RuntimeError> {
    let script = game.anm_script(id).ok_or(RuntimeError::UnknownScript(id))?;
    AnimatedSprite::new(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn() -> EnemySpawn {
        EnemySpawn {
            sub: 0,
            x: 100.0,
            y: 50.0,
            z: 0.0,
            life: 10,
            bonus: -1,
            score: 0,
            mirrored: false,
        }
    }

    #[test]
    fn test_bullet_pattern_classes() {
        assert!(BulletPattern::from_opcode(67).is_some_and(BulletPattern::is_aimed));
        assert!(!BulletPattern::FixedFan.is_ring());
        assert!(BulletPattern::AimedRingOffset.is_ring());
        assert_eq!(BulletPattern::from_opcode(74), None);
    }

    #[test]
    fn test_move_to_then_stop() {
        let mut enemy = Enemy::new(EnemyId(1), &spawn());
        enemy.move_to(4, 140.0, 90.0, 0.0, None);
        assert_eq!(enemy.movement.as_ref().map(|m| m.end_frame()), Some(4));
        enemy.set_pos(0.0, 0.0, 0.0);
        assert!(enemy.movement.is_none());
    }
}
