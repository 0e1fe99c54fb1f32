//! Contract metadata lookup.

use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;
use serde_json::Value;

use super::{ServiceResult, classify_reqwest_error, read_json, render_failure};
use crate::address::Address;

const INVALID_ADDRESS: &str =
    "❌ Invalid contract address format. Addresses start with 'r' and are 25-34 characters long.";
const LOOKUP_FAILED: &str = "❌ Error fetching contract information. Please try again.";

/// Display format for timestamps, in the local time zone.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Payload of `GET /contracts/{address}`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractInfo {
    pub name: Option<Value>,
    pub symbol: Option<Value>,
    pub total_supply: Option<Value>,
    pub decimals: Option<Value>,
    pub creator: Option<Value>,
    pub created_at: Option<Value>,
    pub website: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContractClient {
    base_url: String,
    http: reqwest::Client,
}

impl ContractClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// # Errors
    /// Returns an error on transport failure, an `error` payload, or a body
    /// that cannot be decoded.
    pub async fn fetch(&self, address: &Address) -> ServiceResult<ContractInfo> {
        let url = format!("{}/contracts/{}", self.base_url, address);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        read_json(response).await
    }

    pub async fn report(&self, raw_address: &str) -> String {
        let Some(address) = Address::parse(raw_address) else {
            return INVALID_ADDRESS.to_string();
        };
        match self.fetch(&address).await {
            Ok(info) => format_contract_report(&address, &info),
            Err(err) => render_failure("contracts", &err, LOOKUP_FAILED),
        }
    }
}

/// Renders an optional scalar field, `N/A` when absent, null or empty.
fn field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders `createdAt` (RFC 3339 string or epoch milliseconds) in local time.
///
/// Unparseable strings are shown as-is.
pub fn format_created_at(value: Option<&Value>) -> String {
    let parsed: Option<DateTime<Local>> = match value {
        Some(Value::String(s)) if !s.trim().is_empty() => {
            match DateTime::parse_from_rfc3339(s.trim()) {
                Ok(dt) => Some(dt.with_timezone(&Local)),
                Err(_) => return s.clone(),
            }
        }
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|millis| Local.timestamp_millis_opt(millis).single()),
        _ => None,
    };

    parsed.map_or_else(
        || "N/A".to_string(),
        |dt| dt.format(CREATED_AT_FORMAT).to_string(),
    )
}

pub fn format_contract_report(address: &Address, info: &ContractInfo) -> String {
    let website = info
        .website
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(|w| format!("\n🌐 Website: {w}"))
        .unwrap_or_default();

    format!(
        "
📄 Contract Information
━━━━━━━━━━━━━━━━━━━━

📍 Address: {address}

ℹ️ Details:
  • Name: {name}
  • Symbol: {symbol}
  • Supply: {supply}
  • Decimals: {decimals}

👤 Creator: {creator}

📅 Created: {created}
{website}
━━━━━━━━━━━━━━━━━━━━",
        name = field(info.name.as_ref()),
        symbol = field(info.symbol.as_ref()),
        supply = field(info.total_supply.as_ref()),
        decimals = field(info.decimals.as_ref()),
        creator = field(info.creator.as_ref()),
        created = format_created_at(info.created_at.as_ref()),
    )
}
