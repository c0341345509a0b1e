//! Enemy-behavior interpreters: the stage timeline and one register machine
//! per enemy.

mod arithmetic;
mod attack;
mod control;
mod enemy;
mod frame;
mod lifecycle;
mod movement;
pub mod ops;
mod special;
mod timeline;
pub mod variables;
mod vm;

pub use enemy::{BulletAttributes, BulletPattern, Callbacks, Direction, Enemy, ScreenBox};
pub use frame::{CallFrame, Registers, REGISTER_COUNT};
pub use special::{BossBehaviors, BulletsToHoming, BulletsToItems, RingLaserFan, SpecialFunction};
pub use timeline::{MainContext, MainVm};
pub use vm::{EclContext, EnemyVm};
