//! Full-screen terminal UI for ledger-term.

pub mod effects;
pub mod events;
pub mod input;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr, stdout};

use anyhow::{Context, Result};
use ledger_core::config::Config;
use ledger_core::services::Services;
pub use runtime::TuiRuntime;
use tracing::info;

/// Runs the interactive terminal until the user quits.
///
/// # Errors
/// Returns an error if stdout is not a terminal, the services cannot be
/// built, or terminal I/O fails.
pub async fn run_interactive(config: &Config) -> Result<()> {
    // The TUI renders to stdout
    if !stdout().is_terminal() {
        anyhow::bail!(
            "Interactive mode requires a terminal.\n\
             Use `ledger-term exec <input>` for non-interactive execution."
        );
    }

    let services = Services::from_config(config).context("build services")?;

    info!(model = %config.chat.model, "starting interactive session");
    let mut runtime = TuiRuntime::new(config, services)?;
    runtime.run()?;
    drop(runtime);

    // Terminal restored
    writeln!(stderr(), "Goodbye!")?;

    Ok(())
}
