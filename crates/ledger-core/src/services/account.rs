//! Simple account lookup against the address-info HTTP service.

use serde::Deserialize;
use serde_json::Value;

use super::{ServiceError, ServiceResult, classify_reqwest_error, read_json, render_failure};
use crate::address::Address;

/// The address-info service reports `xrpBalance` in units of 1/100 000 XRP.
///
/// Not interchangeable with the ledger node's drops (see `issuer::DROPS_PER_XRP`).
pub const ACCOUNT_BALANCE_DIVISOR: f64 = 100_000.0;

const INVALID_ADDRESS: &str =
    "❌ Invalid XRP address format. XRP addresses start with 'r' and are 25-34 characters long.";
const LOOKUP_FAILED: &str = "❌ Error fetching XRP account information. Please try again.";

/// Raw payload of `GET /account/{address}`.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "Account")]
    account: Option<String>,
    #[serde(rename = "xrpBalance")]
    xrp_balance: Option<Value>,
    #[serde(rename = "PreviousTxnID")]
    previous_txn_id: Option<String>,
}

/// Extracted account fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountInfo {
    pub account: String,
    /// Balance in XRP (raw units already divided).
    pub balance_xrp: f64,
    pub previous_txn_id: String,
}

#[derive(Debug, Clone)]
pub struct AccountClient {
    base_url: String,
    http: reqwest::Client,
}

impl AccountClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Fetches and decodes one account.
    ///
    /// # Errors
    /// Returns an error on transport failure, an `error` payload, or a body
    /// that cannot be decoded.
    pub async fn fetch(&self, address: &Address) -> ServiceResult<AccountInfo> {
        let url = format!("{}/account/{}", self.base_url, address);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        let raw: AccountResponse = read_json(response).await?;

        let raw_balance = raw
            .xrp_balance
            .as_ref()
            .and_then(number_from_value)
            .ok_or_else(|| ServiceError::parse("Missing or non-numeric xrpBalance"))?;

        Ok(AccountInfo {
            account: raw.account.unwrap_or_else(|| address.to_string()),
            balance_xrp: raw_balance / ACCOUNT_BALANCE_DIVISOR,
            previous_txn_id: raw.previous_txn_id.unwrap_or_else(|| "N/A".to_string()),
        })
    }

    /// Validates `raw_address`, looks it up and renders the report or an error line.
    pub async fn report(&self, raw_address: &str) -> String {
        let Some(address) = Address::parse(raw_address) else {
            return INVALID_ADDRESS.to_string();
        };
        match self.fetch(&address).await {
            Ok(info) => format_account_report(&info),
            Err(err) => render_failure("account", &err, LOOKUP_FAILED),
        }
    }
}

/// Accepts both JSON numbers and numeric strings.
pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn format_account_report(info: &AccountInfo) -> String {
    format!(
        "
🔍 XRP Account Information
━━━━━━━━━━━━━━━━━━━━━━━━

👛 Address: {account}

💰 Balance: {balance:.6} XRP

🔄 Latest Transaction:
{txn}
➜ View on Explorer: https://xrpscan.com/tx/{txn}
━━━━━━━━━━━━━━━━━━━━━━━━",
        account = info.account,
        balance = info.balance_xrp,
        txn = info.previous_txn_id,
    )
}
