use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shmup")]
#[command(about = "Shmup script interpreter CLI", long_about = None)]
pub struct Cli {
    /// Tracing filter, e.g. `debug` or `vm=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Step a scenario and print the final state
    Run {
        /// Path to the scenario (.toml)
        path: String,
        /// Number of frames to step (defaults to the scenario's `frames`)
        #[arg(long)]
        frames: Option<u32>,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Disassemble every script of a scenario
    Disassemble {
        /// Path to the scenario (.toml)
        path: String,
    },
}
