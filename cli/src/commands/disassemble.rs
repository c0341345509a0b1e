use std::fmt::Write;

use anyhow::{Context, Result};
use vm::registry::disassemble;

use crate::config::Scenario;

/// Render every script of a scenario through the opcode registries.
pub fn disassemble_file(path: &str) -> Result<String> {
    let scenario = Scenario::load(path)?;
    let mut out = String::new();
    for (label, script) in scenario.scripts()? {
        let listing = disassemble(&script).with_context(|| format!("Cannot disassemble {label}"))?;
        writeln!(out, "== {label} (v{}) ==", script.version)?;
        out.push_str(&listing);
    }
    Ok(out)
}
