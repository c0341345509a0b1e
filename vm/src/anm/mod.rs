//! Per-sprite animation interpreter.

pub mod ops;
mod sprite;
mod vm;

pub use sprite::Sprite;
pub use vm::{AnimatedSprite, AnmContext, AnmVm};
