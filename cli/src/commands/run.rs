use anyhow::{Context, Result};
use tracing::info;
use vm::stage::StageSnapshot;

use crate::config::Scenario;

/// Step a scenario and return its final state.
pub fn run_scenario(path: &str, frames: Option<u32>) -> Result<StageSnapshot> {
    let scenario = Scenario::load(path)?;
    let frames = frames.unwrap_or_else(|| scenario.frames());
    let mut stage = scenario.into_stage()?;

    info!(frames, "running scenario");
    for _ in 0..frames {
        stage
            .step()
            .with_context(|| format!("Runtime error at frame {}", stage.frame()))?;
    }
    Ok(stage.snapshot())
}

pub fn run_file(path: &str, frames: Option<u32>, json: bool) -> Result<()> {
    let snapshot = run_scenario(path, frames)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", summary(&snapshot));
    }
    Ok(())
}

/// Human-readable digest of a snapshot.
pub fn summary(snapshot: &StageSnapshot) -> String {
    let mut out = format!(
        "frame {}  seed {:#06x}  score {}\n",
        snapshot.frame, snapshot.seed, snapshot.effects.score
    );
    out.push_str(&format!(
        "bullets {}  lasers {}  items {}\n",
        snapshot.effects.bullets.len(),
        snapshot.effects.lasers.len(),
        snapshot.effects.items.len()
    ));
    for enemy in &snapshot.enemies {
        out.push_str(&format!(
            "enemy {:>3}  sub {:>3}  ({:.2}, {:.2})  life {}{}\n",
            enemy.id.0,
            enemy.sub,
            enemy.x,
            enemy.y,
            enemy.life,
            if enemy.boss { "  boss" } else { "" }
        ));
    }
    if let Some(dialogue) = &snapshot.dialogue {
        out.push_str(&format!("dialogue frame {}", dialogue.frame));
        if dialogue.frozen {
            out.push_str(" (frozen)");
        }
        out.push('\n');
        for (line, text) in &dialogue.texts {
            out.push_str(&format!("  [{line}] {}: {}\n", text.side, text.text));
        }
    }
    out
}
