//! TOML scenario files.
//!
//! A scenario bundles the engine settings, the players and every script a
//! stage needs. Instruction arguments are written as typed values and packed
//! into the same byte layout the format decoders produce; integer literals
//! pack as i32, so float arguments must be written with a decimal point.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use vm::stage::Player;
use vm::{Arg, EclProgram, Instruction, Script, ScriptFormat, Stage, StageConfig};

const DEFAULT_FRAMES: u32 = 600;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Animation script ids of the left and right dialogue portraits.
    #[serde(default)]
    pub portraits: Vec<u32>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default, rename = "player")]
    pub players: Vec<Player>,
    #[serde(default)]
    pub anm: Vec<NumberedScript>,
    pub ecl: EclConfig,
    #[serde(default)]
    pub msg: Vec<NumberedScript>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub seed: u16,
    pub difficulty: i32,
    pub rank: i32,
    pub frames: u32,
    pub stage: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            difficulty: 0,
            rank: 0,
            frames: DEFAULT_FRAMES,
            stage: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptConfig {
    #[serde(default)]
    pub version: u8,
    #[serde(default)]
    pub instructions: Vec<InstructionConfig>,
}

/// An animation or dialogue script addressed by id.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumberedScript {
    pub id: u32,
    #[serde(default)]
    pub version: u8,
    #[serde(default)]
    pub instructions: Vec<InstructionConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EclConfig {
    pub main: ScriptConfig,
    #[serde(default)]
    pub subs: Vec<ScriptConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstructionConfig {
    pub frame: u32,
    pub op: u16,
    #[serde(default)]
    pub args: Vec<Arg>,
    pub rank_mask: Option<u16>,
}

impl InstructionConfig {
    fn build(&self) -> Instruction {
        let instr = Instruction::with_args(self.frame, self.op, &self.args);
        match self.rank_mask {
            Some(mask) => instr.with_rank_mask(mask),
            None => instr,
        }
    }
}

/// Pack a script, rejecting instruction lists whose frames go backwards.
fn build_script(
    format: ScriptFormat,
    version: u8,
    instructions: &[InstructionConfig],
    label: &str,
) -> Result<Script> {
    let script = Script::new(
        format,
        version,
        instructions.iter().map(InstructionConfig::build).collect(),
    );
    if !script.is_frame_ordered() {
        bail!("{label} is not ordered by frame");
    }
    Ok(script)
}

impl ScriptConfig {
    pub fn build(&self, format: ScriptFormat, label: &str) -> Result<Script> {
        build_script(format, self.version, &self.instructions, label)
    }
}

impl NumberedScript {
    pub fn build(&self, format: ScriptFormat) -> Result<Script> {
        let label = match format {
            ScriptFormat::Anm => format!("anm {}", self.id),
            _ => format!("msg {}", self.id),
        };
        build_script(format, self.version, &self.instructions, &label)
    }
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Every script of the scenario, labelled for display.
    pub fn scripts(&self) -> Result<Vec<(String, Script)>> {
        let mut scripts = Vec::new();
        for anm in &self.anm {
            scripts.push((format!("anm {}", anm.id), anm.build(ScriptFormat::Anm)?));
        }
        scripts.push((
            "ecl main".to_string(),
            self.ecl.main.build(ScriptFormat::EclMain, "ecl main")?,
        ));
        for (n, sub) in self.ecl.subs.iter().enumerate() {
            let label = format!("ecl sub {n}");
            scripts.push((label.clone(), sub.build(ScriptFormat::EclSub, &label)?));
        }
        for msg in &self.msg {
            scripts.push((format!("msg {}", msg.id), msg.build(ScriptFormat::Msg)?));
        }
        Ok(scripts)
    }

    pub fn frames(&self) -> u32 {
        self.engine.frames
    }

    pub fn into_stage(self) -> Result<Stage> {
        let config = StageConfig {
            seed: self.engine.seed,
            difficulty: self.engine.difficulty,
            rank: self.engine.rank,
            stage: self.engine.stage,
            players: self.players,
        };
        let main = self.ecl.main.build(ScriptFormat::EclMain, "ecl main")?;
        let subs = self
            .ecl
            .subs
            .iter()
            .enumerate()
            .map(|(n, sub)| sub.build(ScriptFormat::EclSub, &format!("ecl sub {n}")))
            .collect::<Result<Vec<_>>>()?;

        let mut stage =
            Stage::new(config, EclProgram::new(main, subs)).context("Failed to start the timeline")?;
        for anm in &self.anm {
            stage = stage.with_anm(anm.id, anm.build(ScriptFormat::Anm)?);
        }
        for msg in &self.msg {
            stage = stage.with_msg(msg.id, msg.build(ScriptFormat::Msg)?);
        }
        match self.portraits.as_slice() {
            [] => {}
            [left, right] => stage = stage.with_portraits([Some(*left), Some(*right)]),
            other => bail!("portraits takes two animation ids, got {}", other.len()),
        }
        Ok(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [ecl.main]
        instructions = [{ frame = 0, op = 0, args = [0, 10.0, 20.0, 0.0, 1, -1, 0] }]

        [[ecl.subs]]
        instructions = [{ frame = 50, op = 0 }]
    "#;

    #[test]
    fn test_defaults_fill_engine() {
        let scenario = Scenario::parse(MINIMAL).unwrap();
        assert_eq!(scenario.frames(), DEFAULT_FRAMES);
        assert!(scenario.players.is_empty());
        assert_eq!(
            scenario.ecl.main.instructions[0].args[1],
            Arg::Float(10.0)
        );
        assert_eq!(scenario.ecl.main.instructions[0].args[0], Arg::Int(0));
    }

    #[test]
    fn test_out_of_order_script_is_rejected() {
        let scenario = Scenario::parse(
            r#"
            [ecl.main]
            instructions = [{ frame = 5, op = 9 }, { frame = 1, op = 9 }]
            "#,
        )
        .unwrap();
        let err = scenario.into_stage().err().expect("rejected");
        assert!(err.to_string().contains("not ordered by frame"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = Scenario::parse(
            r#"
            [engine]
            sede = 3
            [ecl.main]
            "#,
        );
        assert!(result.is_err());
    }
}
