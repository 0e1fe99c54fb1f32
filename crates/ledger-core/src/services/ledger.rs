//! Ledger node WebSocket client.
//!
//! Every query is a short-lived connection: open, send one command, wait for
//! the first JSON reply, close. Concurrency comes from running several
//! queries at once, each on its own socket.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use super::{ServiceError, ServiceResult, payload_error};
use crate::address::Address;

/// Page size for `account_lines`.
pub const ACCOUNT_LINES_LIMIT: u32 = 400;

const VALIDATED: &str = "validated";

/// Commands understood by the ledger node (subset).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LedgerRequest {
    AccountLines {
        account: String,
        ledger_index: &'static str,
        limit: u32,
    },
    AccountInfo {
        account: String,
        ledger_index: &'static str,
    },
}

impl LedgerRequest {
    pub fn account_lines(address: &Address) -> Self {
        Self::AccountLines {
            account: address.to_string(),
            ledger_index: VALIDATED,
            limit: ACCOUNT_LINES_LIMIT,
        }
    }

    pub fn account_info(address: &Address) -> Self {
        Self::AccountInfo {
            account: address.to_string(),
            ledger_index: VALIDATED,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::AccountLines { .. } => "account_lines",
            Self::AccountInfo { .. } => "account_info",
        }
    }
}

/// One trust line from `account_lines`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrustLine {
    pub account: String,
    pub currency: String,
    /// Decimal string, may be negative.
    pub balance: String,
    pub limit: String,
    pub quality_in: u64,
    pub quality_out: u64,
    pub no_ripple: bool,
    pub freeze: bool,
    pub authorized: bool,
}

#[derive(Debug, Deserialize)]
struct AccountLinesResult {
    #[serde(default)]
    lines: Vec<TrustLine>,
}

/// Core account fields from `account_info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountData {
    /// Balance in drops.
    #[serde(rename = "Balance", deserialize_with = "de_u64_lenient")]
    pub balance_drops: u64,
    #[serde(rename = "Sequence", default)]
    pub sequence: u64,
    #[serde(rename = "PreviousTxnID", default)]
    pub previous_txn_id: String,
    #[serde(rename = "Flags", default)]
    pub flags: u32,
}

#[derive(Debug, Deserialize)]
struct AccountInfoResult {
    account_data: AccountData,
}

/// Drops are serialized as decimal strings; accept numbers too.
fn de_u64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom("balance is not an unsigned integer")),
        Value::String(s) => s.trim().parse().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("unexpected balance value: {other}"))),
    }
}

#[derive(Debug, Clone)]
pub struct LedgerClient {
    url: String,
    timeout: Option<Duration>,
}

impl LedgerClient {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one command on a fresh connection and returns the reply's `result`.
    ///
    /// # Errors
    /// Transport failures, timeouts, non-JSON replies and replies carrying an
    /// `error` field are all errors.
    pub async fn query(&self, request: &LedgerRequest) -> ServiceResult<Value> {
        let payload = serde_json::to_string(request)
            .map_err(|e| ServiceError::parse(format!("Failed to encode request: {e}")))?;

        let reply = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.round_trip(payload))
                .await
                .map_err(|_elapsed| {
                    ServiceError::timeout(format!("{} timed out after {limit:?}", request.name()))
                })??,
            None => self.round_trip(payload).await?,
        };

        let mut value: Value = serde_json::from_str(&reply)
            .map_err(|e| ServiceError::parse(format!("Reply is not JSON: {e}")))?;

        if let Some(message) = payload_error(&value) {
            return Err(ServiceError::api(message));
        }
        let result = value
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| ServiceError::parse(format!("{} reply has no result", request.name())))?;
        if let Some(message) = payload_error(&result) {
            return Err(ServiceError::api(message));
        }
        Ok(result)
    }

    async fn round_trip(&self, payload: String) -> ServiceResult<String> {
        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| ServiceError::transport(format!("Connection failed: {e}")))?;

        ws.send(Message::Text(payload))
            .await
            .map_err(|e| ServiceError::transport(format!("Send failed: {e}")))?;

        let reply = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(Message::Binary(bytes))) => {
                    break String::from_utf8(bytes.to_vec())
                        .map_err(|e| ServiceError::parse(format!("Reply is not UTF-8: {e}")))?;
                }
                Some(Ok(Message::Close(_))) | None => {
                    return Err(ServiceError::transport("Connection closed before reply"));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(ServiceError::transport(format!("Receive failed: {e}"))),
            }
        };

        if let Err(e) = ws.close(None).await {
            debug!("ledger socket close: {e}");
        }
        Ok(reply)
    }

    async fn query_as<T: DeserializeOwned>(&self, request: &LedgerRequest) -> ServiceResult<T> {
        let result = self.query(request).await?;
        serde_json::from_value(result).map_err(|e| {
            ServiceError::parse(format!("Unexpected {} result: {e}", request.name()))
        })
    }

    /// # Errors
    /// See [`LedgerClient::query`].
    pub async fn account_lines(&self, address: &Address) -> ServiceResult<Vec<TrustLine>> {
        let result: AccountLinesResult = self
            .query_as(&LedgerRequest::account_lines(address))
            .await?;
        Ok(result.lines)
    }

    /// # Errors
    /// See [`LedgerClient::query`].
    pub async fn account_info(&self, address: &Address) -> ServiceResult<AccountData> {
        let result: AccountInfoResult = self
            .query_as(&LedgerRequest::account_info(address))
            .await?;
        Ok(result.account_data)
    }
}
