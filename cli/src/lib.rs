pub mod commands;
pub mod config;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber.
///
/// An explicit `filter` wins over `RUST_LOG`; without either only warnings
/// (skipped opcodes, unknown special functions) are shown.
pub fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
