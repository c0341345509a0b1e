//! Static opcode tables.
//!
//! Each interpreter family owns one `Registry`, assembled once behind a
//! `OnceLock` from an explicit list of `(opcode, name, handler)` entries per
//! format version. A VM resolves its `OpTable` once when it is constructed, so
//! dispatch never looks at the version again.

use std::collections::HashMap;
use std::fmt::Write;

use crate::error::RuntimeError;
use crate::script::{Script, ScriptFormat};

pub struct OpEntry<H> {
    pub name: &'static str,
    pub handler: H,
}

pub struct OpTable<H> {
    entries: HashMap<u16, OpEntry<H>>,
}

impl<H> Default for OpTable<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H> OpTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, opcode: u16, name: &'static str, handler: H) -> Self {
        self.entries.insert(opcode, OpEntry { name, handler });
        self
    }

    pub fn get(&self, opcode: u16) -> Option<&OpEntry<H>> {
        self.entries.get(&opcode)
    }

    pub fn name(&self, opcode: u16) -> Option<&'static str> {
        self.entries.get(&opcode).map(|entry| entry.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Registry<H> {
    format: ScriptFormat,
    versions: HashMap<u8, OpTable<H>>,
}

impl<H> Registry<H> {
    pub fn new(format: ScriptFormat) -> Self {
        Self {
            format,
            versions: HashMap::new(),
        }
    }

    pub fn with_version(mut self, version: u8, table: OpTable<H>) -> Self {
        self.versions.insert(version, table);
        self
    }

    pub fn format(&self) -> ScriptFormat {
        self.format
    }

    /// Resolve the table for `version`.
    pub fn table(&self, version: u8) -> Result<&OpTable<H>, RuntimeError> {
        self.versions
            .get(&version)
            .ok_or(RuntimeError::UnsupportedVersion {
                format: self.format,
                version,
            })
    }
}

/// Opcode names for one format version, independent of handler type.
pub trait OpNames {
    fn op_name(&self, opcode: u16) -> Option<&'static str>;
}

impl<H> OpNames for OpTable<H> {
    fn op_name(&self, opcode: u16) -> Option<&'static str> {
        self.name(opcode)
    }
}

/// Look up the name table matching a script's format and version.
pub fn names_for(script: &Script) -> Result<&'static dyn OpNames, RuntimeError> {
    let table: &'static dyn OpNames = match script.format {
        ScriptFormat::Anm => crate::anm::ops::registry().table(script.version)?,
        ScriptFormat::EclMain => crate::ecl::ops::main_registry().table(script.version)?,
        ScriptFormat::EclSub => crate::ecl::ops::sub_registry().table(script.version)?,
        ScriptFormat::Msg => crate::msg::ops::registry().table(script.version)?,
    };
    Ok(table)
}

/// Render one `frame op name args` line per instruction.
///
/// Arguments are shown as raw 32-bit words; trailing bytes that do not fill
/// a word are shown in hex.
pub fn disassemble(script: &Script) -> Result<String, RuntimeError> {
    let names = names_for(script)?;
    let mut out = String::new();
    for instr in &script.instructions {
        let name = names.op_name(instr.opcode).unwrap_or("<unknown>");
        let args = instr.args();
        let mut line = format!("{:>6} {:>4} {:<28}", instr.frame, instr.opcode, name);
        for word in args.words() {
            let _ = write!(line, " {word}");
        }
        let tail = instr.args.len() % 4;
        if tail != 0 {
            let _ = write!(line, " ");
            for byte in &instr.args[instr.args.len() - tail..] {
                let _ = write!(line, "{byte:02x}");
            }
        }
        if instr.rank_mask != crate::script::RANK_ALL {
            let _ = write!(line, " [rank {:#06x}]", instr.rank_mask);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Arg, Instruction};

    #[test]
    fn test_unknown_version_is_rejected() {
        let registry = Registry::<fn()>::new(ScriptFormat::Anm).with_version(0, OpTable::new());
        assert!(registry.table(0).is_ok());
        assert!(matches!(
            registry.table(7),
            Err(RuntimeError::UnsupportedVersion {
                format: ScriptFormat::Anm,
                version: 7
            })
        ));
    }

    #[test]
    fn test_disassemble_names_opcodes() {
        let script = Script::new(
            ScriptFormat::Anm,
            0,
            vec![
                Instruction::with_args(0, 1, &[Arg::Int(4)]),
                Instruction::new(10, 250, vec![]),
            ],
        );
        let text = disassemble(&script).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("load_sprite"));
        assert!(lines[0].ends_with(" 4"));
        assert!(lines[1].contains("<unknown>"));
    }
}
