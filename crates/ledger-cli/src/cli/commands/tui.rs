//! Interactive mode handler.

use anyhow::Result;
use ledger_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: &Config) -> Result<()> {
    use anyhow::Context;

    ledger_tui::run_interactive(config)
        .await
        .context("interactive session failed")
}

#[cfg(not(feature = "tui"))]
#[allow(clippy::unused_async)]
pub async fn run(_config: &Config) -> Result<()> {
    anyhow::bail!("Interactive mode is not available in this build. Use `ledger-term exec <input>`.")
}
