//! Exec command handler.
//!
//! Submits one line the way the interactive prompt would and prints the
//! reply to stdout. The typing animation is kept when stdout is a terminal.

use std::io::{IsTerminal, Write, stderr, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use ledger_core::config::Config;
use ledger_core::dispatch::{Dispatch, Dispatcher};
use ledger_core::services::Services;
use ledger_core::typing::{RevealStep, TypingSession};
use tracing::debug;

pub async fn run(line: &str, config: &Config, instant: bool) -> Result<()> {
    let dispatcher = Dispatcher::from_config(config);
    let Some(dispatch) = dispatcher.dispatch(line) else {
        debug!("blank input, nothing to do");
        return Ok(());
    };

    let text = match dispatch {
        // Nothing on screen to clear.
        Dispatch::Clear => return Ok(()),
        Dispatch::Reply(text) => text,
        Dispatch::Pending { job, placeholder } => {
            let services = Services::from_config(config).context("build services")?;
            if stderr().is_terminal() {
                eprintln!("{placeholder}");
            }
            services.run(&job).await
        }
    };

    let delay = if instant || !stdout().is_terminal() {
        Duration::ZERO
    } else {
        config.char_delay()
    };

    let mut out = stdout();
    writeln!(out, "> {}", line.trim())?;
    reveal(&mut out, &text, delay).await?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Writes `text` one reveal step at a time, pausing `delay` between steps.
async fn reveal(out: &mut impl Write, text: &str, delay: Duration) -> Result<()> {
    if delay.is_zero() {
        out.write_all(text.as_bytes())?;
        return Ok(());
    }

    for step in TypingSession::new(text, 0) {
        match step {
            RevealStep::Char(ch) => write!(out, "{ch}")?,
            RevealStep::LineBreak => writeln!(out)?,
        }
        out.flush()?;
        tokio::time::sleep(delay).await;
    }
    Ok(())
}
