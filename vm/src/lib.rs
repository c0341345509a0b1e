pub mod anm;
pub mod ecl;
pub mod error;
pub mod game;
pub mod msg;
pub mod registry;
pub mod script;
pub mod stage;

pub use anm::{AnimatedSprite, AnmVm, Sprite};
pub use ecl::{BossBehaviors, CallFrame, Enemy, EnemyVm, MainVm, Registers};
pub use error::RuntimeError;
pub use game::{EnemyId, Game};
pub use msg::DialogueVm;
pub use script::{Arg, Args, EclProgram, Instruction, Script, ScriptFormat};
pub use stage::{Stage, StageConfig, World};
