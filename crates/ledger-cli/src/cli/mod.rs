//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use ledger_core::config;
use tracing::info;

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "ledger-term")]
#[command(version)]
#[command(about = "Ledger AI terminal: XRP ledger lookups and chat")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Runs one input line non-interactively and prints the reply
    Exec {
        /// The line to submit, exactly as typed at the prompt
        #[arg(required = true, num_args = 1.., value_name = "INPUT")]
        input: Vec<String>,

        /// Print the reply at once instead of typing it out
        #[arg(long)]
        instant: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

/// What to do once config commands are out of the way.
enum Mode {
    Interactive,
    Exec { line: String, instant: bool },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // default to interactive mode
    let mode = match cli.command {
        // Config commands work on the filesystem only.
        Some(Commands::Config { command }) => {
            return match command {
                ConfigCommands::Path => {
                    commands::config::path();
                    Ok(())
                }
                ConfigCommands::Init => commands::config::init(),
            };
        }
        Some(Commands::Exec { input, instant }) => Mode::Exec {
            line: input.join(" "),
            instant,
        },
        None => Mode::Interactive,
    };

    let _guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(mode).await })
}

async fn dispatch(mode: Mode) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    info!(mode = mode.label(), "ledger-term starting");

    match mode {
        Mode::Interactive => commands::tui::run(&config).await,
        Mode::Exec { line, instant } => commands::exec::run(&line, &config, instant).await,
    }
}

impl Mode {
    fn label(&self) -> &'static str {
        match self {
            Mode::Interactive => "interactive",
            Mode::Exec { .. } => "exec",
        }
    }
}
