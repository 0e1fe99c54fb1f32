//! Configuration management for ledger-term.
//!
//! Loads configuration from ${LEDGER_TERM_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for ledger-term configuration and log directories.
    //!
    //! LEDGER_TERM_HOME resolution order:
    //! 1. LEDGER_TERM_HOME environment variable (if set)
    //! 2. ~/.config/ledger-term (default)
    //! 3. ./.ledger-term when no home directory can be determined

    use std::path::PathBuf;

    pub fn home() -> PathBuf {
        if let Ok(home) = std::env::var("LEDGER_TERM_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".ledger-term"),
            |h| h.join(".config").join("ledger-term"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        home().join("config.toml")
    }

    /// Returns the directory that holds rolling log files.
    pub fn logs_dir() -> PathBuf {
        home().join("logs")
    }
}

/// Base URLs of the external services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Address-info service (`GET {account_api}/account/{address}`).
    pub account_api: String,
    /// Contract-metadata service (`GET {contracts_api}/contracts/{address}`).
    pub contracts_api: String,
    /// Ledger node WebSocket URL.
    pub ledger_ws: String,
    /// OpenAI-compatible base URL (`POST {chat_api}/chat/completions`).
    pub chat_api: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            account_api: "https://api.xrpscan.com/api/v1".to_string(),
            contracts_api: "https://api.firstledger.info/api/v1".to_string(),
            ledger_ws: "wss://xrplcluster.com/".to_string(),
            chat_api: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Conversational-AI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub model: String,
    /// Optional API key (overrides OPENAI_API_KEY).
    pub api_key: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
        }
    }
}

impl ChatConfig {
    /// Returns the API key if set and non-empty.
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Links printed by the `telegram` and `twitter` commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    pub telegram_url: String,
    pub twitter_url: String,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            telegram_url: "https://t.me/LedgerAIXRP".to_string(),
            twitter_url: "https://x.com/ledgeraionxrp".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Delay between reveal steps in milliseconds.
    pub char_delay_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            char_delay_ms: Config::DEFAULT_CHAR_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Timeout for a single round trip in seconds (0 disables).
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: Config::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address shown by the `ca` command.
    pub contract_address: String,
    pub endpoints: EndpointsConfig,
    pub chat: ChatConfig,
    pub community: CommunityConfig,
    pub typing: TypingConfig,
    pub network: NetworkConfig,
}

impl Config {
    const DEFAULT_CONTRACT_ADDRESS: &str = "000000000000000000000";
    const DEFAULT_CHAR_DELAY_MS: u64 = 25;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Delay between two reveal steps.
    pub fn char_delay(&self) -> Duration {
        Duration::from_millis(self.typing.char_delay_ms)
    }

    /// Per-request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.network.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contract_address: Self::DEFAULT_CONTRACT_ADDRESS.to_string(),
            endpoints: EndpointsConfig::default(),
            chat: ChatConfig::default(),
            community: CommunityConfig::default(),
            typing: TypingConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}
