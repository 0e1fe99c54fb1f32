//! Network aggregators.
//!
//! Each aggregator validates its input, performs one or more round trips and
//! renders the result (or the failure) as display text. Failures never
//! propagate past this module: [`Services::run`] always yields a string.
//!
//! Structure:
//! - `account.rs`: simple address lookup (address-info HTTP service)
//! - `contract.rs`: contract metadata lookup (HTTP)
//! - `ledger.rs`: ledger node WebSocket round trips
//! - `issuer.rs`: issuer/token aggregation over two concurrent ledger queries
//! - `chat.rs`: OpenAI-compatible chat completions

pub mod account;
pub mod chat;
pub mod contract;
pub mod issuer;
pub mod ledger;

use std::fmt;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::dispatch::Job;

/// User-Agent sent with every HTTP request.
pub const USER_AGENT: &str = concat!("ledger-term/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Errors
// ============================================================================

/// Categories of service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// HTTP status error (4xx, 5xx) without a usable error payload
    HttpStatus,
    /// Request or connection timed out
    Timeout,
    /// Connection failed, socket closed, or the request could not be sent
    Transport,
    /// Response body could not be decoded
    Parse,
    /// The service answered with an explicit error field
    Api,
    /// Local configuration is missing (e.g. API key)
    Config,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceErrorKind::HttpStatus => write!(f, "http_status"),
            ServiceErrorKind::Timeout => write!(f, "timeout"),
            ServiceErrorKind::Transport => write!(f, "transport"),
            ServiceErrorKind::Parse => write!(f, "parse"),
            ServiceErrorKind::Api => write!(f, "api_error"),
            ServiceErrorKind::Config => write!(f, "config"),
        }
    }
}

/// Structured error from a service round trip.
#[derive(Debug, Clone)]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw response body)
    pub details: Option<String>,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// An error reported by the service itself; `message` is shown to the user.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Api, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Transport, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Parse, message)
    }

    /// Creates an HTTP status error, keeping the body as details.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self {
            kind: ServiceErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn is_api(&self) -> bool {
        self.kind == ServiceErrorKind::Api
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

pub(crate) fn classify_reqwest_error(e: &reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ServiceError::transport(format!("Connection failed: {e}"))
    } else if e.is_decode() {
        ServiceError::parse(format!("Invalid response body: {e}"))
    } else if e.is_request() {
        ServiceError::transport(format!("Request error: {e}"))
    } else {
        ServiceError::transport(format!("Network error: {e}"))
    }
}

/// Extracts an `error` field from a JSON payload.
///
/// Accepts `{"error": "text"}` and `{"error": {"message": "text"}}`; the
/// ledger node's `error_message` wins over its terse `error` code.
pub(crate) fn payload_error(payload: &Value) -> Option<String> {
    if let Some(message) = payload.get("error_message").and_then(Value::as_str)
        && !message.is_empty()
    {
        return Some(message.to_string());
    }
    match payload.get("error")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        Value::Null | Value::Bool(false) | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Reads a JSON body, turning error payloads and bad statuses into errors.
///
/// A body carrying an `error` field is an [`ServiceErrorKind::Api`] error
/// regardless of the HTTP status.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ServiceResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| classify_reqwest_error(&e))?;

    let value: Option<Value> = serde_json::from_str(&body).ok();
    if let Some(message) = value.as_ref().and_then(payload_error) {
        return Err(ServiceError::api(message));
    }
    if !status.is_success() {
        return Err(ServiceError::http_status(status.as_u16(), &body));
    }

    let value = value.ok_or_else(|| ServiceError::parse("Response body is not JSON"))?;
    serde_json::from_value(value).map_err(|e| ServiceError::parse(format!("Unexpected response shape: {e}")))
}

// ============================================================================
// Config resolution helpers
// ============================================================================

/// Resolves an API key with precedence: config > env.
///
/// Returns `None` when neither is set; the chat client reports that lazily so
/// the terminal still starts without a key.
pub fn resolve_api_key(config_api_key: Option<&str>, env_var: &str) -> Option<String> {
    if let Some(key) = config_api_key {
        let trimmed = key.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves a base URL with precedence: env > config.
///
/// # Errors
/// Returns an error if the chosen URL does not parse.
pub fn resolve_base_url(config_base_url: &str, env_var: &str, service_name: &str) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    let trimmed = config_base_url.trim();
    validate_url(trimmed, service_name)?;
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn validate_url(url: &str, service_name: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid {service_name} URL: {url}"))?;
    Ok(())
}

// ============================================================================
// Services
// ============================================================================

/// All aggregators, built once from config and shared by the runtime.
#[derive(Debug, Clone)]
pub struct Services {
    pub account: account::AccountClient,
    pub contracts: contract::ContractClient,
    pub issuer: issuer::IssuerAggregator,
    pub chat: chat::ChatClient,
}

impl Services {
    /// Builds every client from config (env overrides applied).
    ///
    /// # Errors
    /// Returns an error if an endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        let account_base = resolve_base_url(
            &config.endpoints.account_api,
            "LEDGER_ACCOUNT_API",
            "address-info service",
        )?;
        let contracts_base = resolve_base_url(
            &config.endpoints.contracts_api,
            "LEDGER_CONTRACTS_API",
            "contract-metadata service",
        )?;
        let ledger_url =
            resolve_base_url(&config.endpoints.ledger_ws, "LEDGER_WS_URL", "ledger node")?;
        let chat_base =
            resolve_base_url(&config.endpoints.chat_api, "OPENAI_BASE_URL", "chat completions")?;

        Ok(Self {
            account: account::AccountClient::new(account_base, http.clone()),
            contracts: contract::ContractClient::new(contracts_base, http.clone()),
            issuer: issuer::IssuerAggregator::new(ledger::LedgerClient::new(
                ledger_url,
                config.request_timeout(),
            )),
            chat: chat::ChatClient::new(
                chat::ChatConfig {
                    api_key: resolve_api_key(config.chat.effective_api_key(), "OPENAI_API_KEY"),
                    base_url: chat_base,
                    model: config.chat.model.clone(),
                },
                http,
            ),
        })
    }

    /// Runs one dispatched job to completion and renders its display text.
    pub async fn run(&self, job: &Job) -> String {
        info!(job = job.label(), "job started");
        let text = match job {
            Job::AccountLookup(arg) => self.account.report(arg).await,
            Job::IssuerScan(arg) => self.issuer.report(arg).await,
            Job::ContractLookup(arg) => self.contracts.report(arg).await,
            Job::Chat(prompt) => self.chat.reply(prompt).await,
        };
        info!(job = job.label(), chars = text.chars().count(), "job finished");
        text
    }
}

/// Logs a failed lookup and renders it: service-reported errors are shown
/// verbatim, anything else collapses to `fallback`.
pub(crate) fn render_failure(context: &str, err: &ServiceError, fallback: &str) -> String {
    warn!(
        service = context,
        kind = %err.kind,
        details = err.details.as_deref().unwrap_or(""),
        "{err}"
    );
    if err.is_api() {
        format!("❌ Error: {}", err.message)
    } else {
        fallback.to_string()
    }
}
