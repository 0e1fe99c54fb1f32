//! Command routing.
//!
//! Maps a parsed [`CommandInvocation`] to either a static reply or a [`Job`]
//! whose text is produced asynchronously by [`crate::services::Services`].
//! Unrecognised input falls back to an issuer scan (when the whole line is an
//! address) or to the chat backend.

use std::fmt::Write as _;

use tracing::debug;

use crate::address::is_valid_address;
use crate::config::Config;
use crate::parser::{CommandInvocation, parse_line};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// What a routed command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    ContractAddress,
    Telegram,
    Twitter,
    Clear,
    AccountLookup,
    IssuerScan,
    ContractLookup,
}

/// One row of the routing table.
#[derive(Debug, Clone)]
pub struct Command {
    /// Primary token.
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Argument placeholder for commands that require one.
    pub argument: Option<&'static str>,
    /// Example used in the missing-argument usage block.
    pub example: Option<&'static str>,
    pub icon: &'static str,
    pub description: &'static str,
    pub kind: CommandKind,
}

impl Command {
    /// Returns true if `token` (already lower-cased) names this command.
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.contains(&token)
    }

    /// Returns the help entry name, e.g. `"ca (or address)"`.
    pub fn display_name(&self) -> String {
        let mut name = self.name.to_string();
        if let Some(arg) = self.argument {
            let _ = write!(name, " {arg}");
        }
        if !self.aliases.is_empty() {
            let _ = write!(name, " (or {})", self.aliases.join(", "));
        }
        name
    }
}

/// Routing table, in help order.
pub const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        aliases: &[],
        argument: None,
        example: None,
        icon: "❓",
        description: "Show this help message",
        kind: CommandKind::Help,
    },
    Command {
        name: "ca",
        aliases: &["address"],
        argument: None,
        example: None,
        icon: "📋",
        description: "Show contract address for Ledger AI",
        kind: CommandKind::ContractAddress,
    },
    Command {
        name: "twitter",
        aliases: &[],
        argument: None,
        example: None,
        icon: "🐦",
        description: "Get Twitter link for Ledger AI",
        kind: CommandKind::Twitter,
    },
    Command {
        name: "telegram",
        aliases: &[],
        argument: None,
        example: None,
        icon: "💬",
        description: "Get Telegram link for Ledger AI",
        kind: CommandKind::Telegram,
    },
    Command {
        name: "clear",
        aliases: &["cls"],
        argument: None,
        example: None,
        icon: "🧹",
        description: "Clear terminal",
        kind: CommandKind::Clear,
    },
    Command {
        name: "addressinfo",
        aliases: &[],
        argument: Some("<address-to-check>"),
        example: Some("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"),
        icon: "💎",
        description: "Simple XRP address lookup",
        kind: CommandKind::AccountLookup,
    },
    Command {
        name: "scan",
        aliases: &[],
        argument: Some("<issuer-address>"),
        example: Some("rHEwCxE7GHjwXEpZwPSHLqh4Qf1N6C8M9N"),
        icon: "🪙",
        description: "Issuer tokens, trustlines and security flags",
        kind: CommandKind::IssuerScan,
    },
    Command {
        name: "contract",
        aliases: &[],
        argument: Some("<address>"),
        example: Some("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"),
        icon: "📄",
        description: "Contract metadata lookup",
        kind: CommandKind::ContractLookup,
    },
];

pub fn find_command(token: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.matches(token))
}

/// Returns true if `raw` is a clear command, which bypasses queueing.
pub fn is_clear(raw: &str) -> bool {
    find_command(&parse_line(raw).token).is_some_and(|c| c.kind == CommandKind::Clear)
}

/// Asynchronous work produced by dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    AccountLookup(String),
    IssuerScan(String),
    ContractLookup(String),
    Chat(String),
}

impl Job {
    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Job::AccountLookup(_) => "account_lookup",
            Job::IssuerScan(_) => "issuer_scan",
            Job::ContractLookup(_) => "contract_lookup",
            Job::Chat(_) => "chat",
        }
    }
}

/// Outcome of routing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Empty the transcript; no echo, no reply.
    Clear,
    /// Text available immediately.
    Reply(String),
    /// Text produced by `job`; `placeholder` is revealed while it runs.
    Pending {
        job: Job,
        placeholder: &'static str,
    },
}

/// Static data needed by the synchronous commands.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    contract_address: String,
    telegram_url: String,
    twitter_url: String,
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            contract_address: config.contract_address.clone(),
            telegram_url: config.community.telegram_url.clone(),
            twitter_url: config.community.twitter_url.clone(),
        }
    }

    /// Routes one raw input line. Returns `None` for blank input.
    pub fn dispatch(&self, raw: &str) -> Option<Dispatch> {
        let invocation = parse_line(raw);
        if invocation.token.is_empty() {
            return None;
        }

        let Some(command) = find_command(&invocation.token) else {
            return Some(fallback(raw));
        };
        debug!(command = command.name, "routed");

        if command.argument.is_some() && !invocation.has_argument() {
            return Some(Dispatch::Reply(usage_block(command)));
        }

        Some(self.route(command, invocation))
    }

    fn route(&self, command: &Command, invocation: CommandInvocation) -> Dispatch {
        let CommandInvocation { argument, .. } = invocation;
        match command.kind {
            CommandKind::Clear => Dispatch::Clear,
            CommandKind::Help => Dispatch::Reply(help_text()),
            CommandKind::ContractAddress => Dispatch::Reply(format!(
                "
📋 Contract Address
━━━━━━━━━━━━━━━━━

🔑 {}
━━━━━━━━━━━━━━━━━",
                self.contract_address
            )),
            CommandKind::Telegram => Dispatch::Reply(format!(
                "
💬 Telegram Community
━━━━━━━━━━━━━━━━━━

➜ Join us: {}
━━━━━━━━━━━━━━━━━━",
                self.telegram_url
            )),
            CommandKind::Twitter => Dispatch::Reply(format!(
                "
🐦 Twitter Profile
━━━━━━━━━━━━━━━

➜ Follow us: {}
━━━━━━━━━━━━━━━━━━",
                self.twitter_url
            )),
            CommandKind::AccountLookup => Dispatch::Pending {
                job: Job::AccountLookup(argument),
                placeholder: "🔍 Fetching XRP address information...",
            },
            CommandKind::IssuerScan => Dispatch::Pending {
                job: Job::IssuerScan(argument),
                placeholder: "🔍 Fetching token information...",
            },
            CommandKind::ContractLookup => Dispatch::Pending {
                job: Job::ContractLookup(argument),
                placeholder: "🔍 Fetching contract information...",
            },
        }
    }
}

/// Unknown token: a bare address is scanned, anything else goes to chat.
fn fallback(raw: &str) -> Dispatch {
    let trimmed = raw.trim();
    if is_valid_address(trimmed) {
        debug!("bare address, scanning issuer");
        return Dispatch::Pending {
            job: Job::IssuerScan(trimmed.to_string()),
            placeholder: "🔍 Scanning XRP address...",
        };
    }
    debug!("unrecognised input, forwarding to chat");
    Dispatch::Pending {
        job: Job::Chat(trimmed.to_string()),
        placeholder: "🤔 Thinking...",
    }
}

fn usage_block(command: &Command) -> String {
    format!(
        "
❌ Missing Address
━━━━━━━━━━━━━━━

Usage: {name} {arg}
Example: {name} {example}
{RULE}",
        name = command.name,
        arg = command.argument.unwrap_or_default(),
        example = command.example.unwrap_or_default(),
    )
}

/// Help text built from [`COMMANDS`].
pub fn help_text() -> String {
    let mut text = String::from("\n📚 Available Commands\n━━━━━━━━━━━━━━━━━━\n\n");
    for command in COMMANDS {
        let _ = writeln!(
            text,
            "{}  {} - {}",
            command.icon,
            command.display_name(),
            command.description
        );
    }
    text.push_str("\n🪙  <address-to-scan> - Much detailed XRP address lookup\n");
    text.push_str("\n💡 Any other input will be sent to AI for a response.\n");
    text.push_str(RULE);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    fn dispatcher() -> Dispatcher {
        Dispatcher::from_config(&Config::default())
    }

    #[test]
    fn test_blank_input_is_rejected() {
        assert_eq!(dispatcher().dispatch(""), None);
        assert_eq!(dispatcher().dispatch("   \t"), None);
    }

    #[test]
    fn test_unknown_word_goes_to_chat() {
        assert_eq!(
            dispatcher().dispatch("xyz"),
            Some(Dispatch::Pending {
                job: Job::Chat("xyz".to_string()),
                placeholder: "🤔 Thinking...",
            })
        );
    }

    #[test]
    fn test_chat_receives_whole_input() {
        let Some(Dispatch::Pending { job, .. }) = dispatcher().dispatch("what is  XRP?") else {
            panic!("expected a job");
        };
        assert_eq!(job, Job::Chat("what is  XRP?".to_string()));
    }

    #[test]
    fn test_bare_address_is_scanned() {
        let Some(Dispatch::Pending { job, placeholder }) =
            dispatcher().dispatch(&format!("  {ADDR} "))
        else {
            panic!("expected a job");
        };
        assert_eq!(job, Job::IssuerScan(ADDR.to_string()));
        assert_eq!(placeholder, "🔍 Scanning XRP address...");
    }

    #[test]
    fn test_address_plus_words_goes_to_chat() {
        let Some(Dispatch::Pending { job, .. }) = dispatcher().dispatch(&format!("{ADDR} please"))
        else {
            panic!("expected a job");
        };
        assert!(matches!(job, Job::Chat(_)));
    }

    #[test]
    fn test_tokens_are_case_insensitive() {
        assert_eq!(dispatcher().dispatch("CLS"), Some(Dispatch::Clear));
        assert_eq!(dispatcher().dispatch("Clear"), Some(Dispatch::Clear));
        assert!(matches!(dispatcher().dispatch("HELP"), Some(Dispatch::Reply(_))));
    }

    #[test]
    fn test_argument_commands_route_to_jobs() {
        let d = dispatcher();
        assert!(matches!(
            d.dispatch(&format!("addressinfo {ADDR}")),
            Some(Dispatch::Pending { job: Job::AccountLookup(a), .. }) if a == ADDR
        ));
        assert!(matches!(
            d.dispatch(&format!("scan {ADDR}")),
            Some(Dispatch::Pending { job: Job::IssuerScan(a), .. }) if a == ADDR
        ));
        assert!(matches!(
            d.dispatch(&format!("contract {ADDR}")),
            Some(Dispatch::Pending { job: Job::ContractLookup(a), .. }) if a == ADDR
        ));
    }

    #[test]
    fn test_missing_argument_yields_usage() {
        let Some(Dispatch::Reply(text)) = dispatcher().dispatch("scan") else {
            panic!("expected usage");
        };
        assert!(text.contains("❌ Missing Address"));
        assert!(text.contains("Usage: scan <issuer-address>"));
        assert!(text.contains("Example: scan rHEwCxE7GHjwXEpZwPSHLqh4Qf1N6C8M9N"));

        let Some(Dispatch::Reply(text)) = dispatcher().dispatch("addressinfo   ") else {
            panic!("expected usage");
        };
        assert!(text.contains("Usage: addressinfo <address-to-check>"));
    }

    #[test]
    fn test_static_replies_use_config() {
        let mut config = Config::default();
        config.contract_address = "rCONTRACT".to_string();
        config.community.telegram_url = "https://t.me/example".to_string();
        let d = Dispatcher::from_config(&config);

        let Some(Dispatch::Reply(ca)) = d.dispatch("address") else {
            panic!("expected reply");
        };
        assert!(ca.contains("🔑 rCONTRACT"));

        let Some(Dispatch::Reply(tg)) = d.dispatch("telegram") else {
            panic!("expected reply");
        };
        assert!(tg.contains("➜ Join us: https://t.me/example"));
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for command in COMMANDS {
            assert!(help.contains(&command.display_name()), "{}", command.name);
        }
        assert!(help.contains("📋  ca (or address) - Show contract address for Ledger AI"));
        assert!(help.contains("🧹  clear (or cls) - Clear terminal"));
        assert!(help.contains("💡 Any other input will be sent to AI for a response."));
    }

    #[test]
    fn test_is_clear() {
        assert!(is_clear("cls"));
        assert!(is_clear("  CLEAR now"));
        assert!(!is_clear("help"));
        assert!(!is_clear(""));
    }
}
