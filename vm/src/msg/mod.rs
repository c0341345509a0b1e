//! Dialogue interpreter driving two portrait slots and the text box.

pub mod ops;
mod vm;

pub use vm::{DialogueText, DialogueVm, MsgContext, SIDES};
