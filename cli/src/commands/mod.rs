pub mod disassemble;
pub mod run;
