//! Variable addressing for per-enemy handlers.
//!
//! Negative ids in `-10012..=-10001` address the local registers; ids in
//! `-10025..=-10013` address live enemy and environment values. Any other id
//! read as an operand is a literal.

use primitives::Value;

use super::frame::REGISTER_COUNT;
use super::vm::EclContext;
use crate::error::RuntimeError;
use crate::script::Args;

const REGISTER_BASE: i32 = -10001;
const SPECIAL_LAST: i32 = -10025;

pub const RANK: i32 = -10013;
pub const DIFFICULTY: i32 = -10014;
pub const ENEMY_X: i32 = -10015;
pub const ENEMY_Y: i32 = -10016;
pub const ENEMY_Z: i32 = -10017;
pub const PLAYER_X: i32 = -10018;
pub const PLAYER_Y: i32 = -10019;
pub const PLAYER_Z: i32 = -10020;
pub const PLAYER_ANGLE: i32 = -10021;
pub const ENEMY_FRAME: i32 = -10022;
pub const ENEMY_LIFE: i32 = -10024;
pub const PLAYER_CHARACTER: i32 = -10025;

/// Whether `id` falls in the reserved variable range.
pub fn is_variable(id: i32) -> bool {
    (SPECIAL_LAST..=REGISTER_BASE).contains(&id)
}

fn register_slot(id: i32) -> Option<usize> {
    let slot = usize::try_from(REGISTER_BASE - id).ok()?;
    (slot < REGISTER_COUNT).then_some(slot)
}

impl EclContext<'_> {
    pub fn read(&self, id: i32) -> Result<Value, RuntimeError> {
        if let Some(slot) = register_slot(id) {
            return Ok(self.vm.registers.get(slot));
        }
        let value = match id {
            RANK => Value::Int(self.game.rank()),
            DIFFICULTY => Value::Int(self.game.difficulty()),
            ENEMY_X => Value::Float(self.enemy.x),
            ENEMY_Y => Value::Float(self.enemy.y),
            ENEMY_Z => Value::Float(self.enemy.z),
            PLAYER_X => Value::Float(self.game.player_position().0),
            PLAYER_Y => Value::Float(self.game.player_position().1),
            PLAYER_Z => Value::Float(self.game.player_position().2),
            PLAYER_ANGLE => Value::Float(self.enemy.angle_to_player(&*self.game)),
            ENEMY_FRAME => Value::Int(i32::try_from(self.enemy.frame).unwrap_or(i32::MAX)),
            ENEMY_LIFE => Value::Int(self.enemy.life),
            PLAYER_CHARACTER => Value::Int(self.game.player_character()),
            _ if is_variable(id) => return Err(RuntimeError::UnmappedVariable(id)),
            _ => Value::Int(id),
        };
        Ok(value)
    }

    pub fn write(&mut self, id: i32, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = register_slot(id) {
            self.vm.registers.set(slot, value);
            return Ok(());
        }
        match id {
            ENEMY_X => self.enemy.x = value.as_f64(),
            ENEMY_Y => self.enemy.y = value.as_f64(),
            ENEMY_Z => self.enemy.z = value.as_f64(),
            ENEMY_FRAME => self.enemy.frame = u32::try_from(value.as_i32()).unwrap_or(0),
            ENEMY_LIFE => self.enemy.life = value.as_i32(),
            RANK | DIFFICULTY | PLAYER_X | PLAYER_Y | PLAYER_Z | PLAYER_ANGLE | PLAYER_CHARACTER => {
                return Err(RuntimeError::ReadOnlyVariable(id))
            }
            _ => return Err(RuntimeError::UnmappedVariable(id)),
        }
        Ok(())
    }

    /// An integer operand: a variable id or a literal.
    pub fn int_operand(&self, args: &mut Args<'_>) -> Result<Value, RuntimeError> {
        let raw = args.i32()?;
        self.read(raw)
    }

    /// A float operand; integral floats in the reserved range address variables.
    pub fn float_operand(&self, args: &mut Args<'_>) -> Result<Value, RuntimeError> {
        let raw = args.f64()?;
        match Value::Float(raw).as_exact_int() {
            Some(id) if is_variable(id) => self.read(id),
            _ => Ok(Value::Float(raw)),
        }
    }
}
