use anyhow::Result;
use clap::Parser;

mod args;

use args::{Cli, Commands};
use cli::commands::{disassemble, run};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.log.as_deref())?;

    match &cli.command {
        Commands::Run { path, frames, json } => run::run_file(path, *frames, *json),
        Commands::Disassemble { path } => {
            print!("{}", disassemble::disassemble_file(path)?);
            Ok(())
        }
    }
}
