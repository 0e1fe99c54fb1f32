//! Issuer/token aggregation.
//!
//! Runs `account_lines` and `account_info` concurrently on two ledger
//! connections and folds the results into an [`IssuerSnapshot`]. The join is
//! all-or-nothing: the first failure drops the other query (closing its
//! socket) and no partial snapshot is ever rendered.

use std::fmt::Write as _;

use tracing::{debug, warn};

use super::ledger::{AccountData, LedgerClient, TrustLine};
use super::{ServiceResult, render_failure};
use crate::address::Address;

/// The ledger node reports balances in drops.
///
/// Not interchangeable with the address-info service's scale (see
/// `account::ACCOUNT_BALANCE_DIVISOR`).
pub const DROPS_PER_XRP: f64 = 1_000_000.0;

pub const LSF_REQUIRE_AUTH: u32 = 0x0010_0000;
pub const LSF_FREEZE_ENABLED: u32 = 0x0020_0000;
pub const LSF_GLOBAL_FREEZE: u32 = 0x0040_0000;
pub const LSF_NO_FREEZE: u32 = 0x0080_0000;

const INVALID_ADDRESS: &str =
    "❌ Invalid issuer address format. Addresses start with 'r' and are 25-34 characters long.";
const NO_TOKENS: &str = "❌ No tokens found for this issuer address.";
const LOOKUP_FAILED: &str = "❌ Error fetching contract information. Please try again.";

/// Explorer links, `{}` is replaced by the address.
const EXPLORER_LINKS: &[(&str, &str)] = &[
    ("XRPL Explorer", "https://livenet.xrpl.org/accounts/{}"),
    ("XRPScan", "https://xrpscan.com/account/{}"),
    ("Bithomp", "https://bithomp.com/explorer/{}"),
];

/// Decoded account security flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityFlags {
    pub require_auth: bool,
    pub freeze_enabled: bool,
    pub global_freeze: bool,
    pub no_freeze: bool,
}

impl SecurityFlags {
    pub fn from_bits(flags: u32) -> Self {
        Self {
            require_auth: flags & LSF_REQUIRE_AUTH != 0,
            freeze_enabled: flags & LSF_FREEZE_ENABLED != 0,
            global_freeze: flags & LSF_GLOBAL_FREEZE != 0,
            no_freeze: flags & LSF_NO_FREEZE != 0,
        }
    }
}

/// Aggregate of every trust line sharing one currency symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCurrency {
    pub currency: String,
    /// Sum of trust line balances.
    pub total_balance: f64,
    pub trustline_count: usize,
    /// Zero means "not set" on the ledger.
    pub quality_in: Option<u64>,
    pub quality_out: Option<u64>,
    /// `None` when the first line had an empty limit.
    pub limit: Option<String>,
    pub no_ripple: bool,
    pub freeze: bool,
    pub authorized: bool,
}

impl IssuedCurrency {
    fn first_seen(line: &TrustLine, balance: f64) -> Self {
        Self {
            currency: line.currency.clone(),
            total_balance: balance,
            trustline_count: 1,
            quality_in: (line.quality_in != 0).then_some(line.quality_in),
            quality_out: (line.quality_out != 0).then_some(line.quality_out),
            limit: (!line.limit.is_empty()).then(|| line.limit.clone()),
            no_ripple: line.no_ripple,
            freeze: line.freeze,
            authorized: line.authorized,
        }
    }

    /// Feature labels, in display order.
    pub fn features(&self) -> Vec<&'static str> {
        [
            (self.no_ripple, "No Ripple"),
            (self.freeze, "Frozen"),
            (self.authorized, "Authorized"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}

/// Issuer account summary plus per-currency breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuerSnapshot {
    pub address: Address,
    pub balance_drops: u64,
    pub sequence: u64,
    pub previous_txn_id: String,
    pub security: SecurityFlags,
    /// Discovery order, one entry per currency symbol.
    issued: Vec<IssuedCurrency>,
}

impl IssuerSnapshot {
    /// Folds trust lines into per-currency entries.
    ///
    /// Repeated symbols add their balance numerically and bump the count; the
    /// remaining fields keep the values of the first line seen.
    pub fn build(address: Address, account: &AccountData, lines: &[TrustLine]) -> Self {
        let mut issued: Vec<IssuedCurrency> = Vec::new();
        for line in lines {
            let balance = line.balance.trim().parse::<f64>().unwrap_or_else(|_| {
                warn!(currency = %line.currency, balance = %line.balance, "unparseable trust line balance");
                0.0
            });
            match issued.iter_mut().find(|c| c.currency == line.currency) {
                Some(entry) => {
                    entry.total_balance += balance;
                    entry.trustline_count += 1;
                }
                None => issued.push(IssuedCurrency::first_seen(line, balance)),
            }
        }

        Self {
            address,
            balance_drops: account.balance_drops,
            sequence: account.sequence,
            previous_txn_id: account.previous_txn_id.clone(),
            security: SecurityFlags::from_bits(account.flags),
            issued,
        }
    }

    pub fn issued_currencies(&self) -> &[IssuedCurrency] {
        &self.issued
    }

    pub fn currency(&self, symbol: &str) -> Option<&IssuedCurrency> {
        self.issued.iter().find(|c| c.currency == symbol)
    }

    pub fn balance_xrp(&self) -> f64 {
        self.balance_drops as f64 / DROPS_PER_XRP
    }
}

#[derive(Debug, Clone)]
pub struct IssuerAggregator {
    client: LedgerClient,
}

impl IssuerAggregator {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    /// Runs both queries concurrently; the first failure wins.
    ///
    /// # Errors
    /// Returns the first error from either query.
    pub async fn fetch(&self, address: &Address) -> ServiceResult<IssuerSnapshot> {
        let (lines, account) = tokio::try_join!(
            self.client.account_lines(address),
            self.client.account_info(address),
        )?;
        debug!(%address, lines = lines.len(), "issuer queries joined");
        Ok(IssuerSnapshot::build(address.clone(), &account, &lines))
    }

    pub async fn report(&self, raw_address: &str) -> String {
        let Some(address) = Address::parse(raw_address) else {
            return INVALID_ADDRESS.to_string();
        };
        match self.fetch(&address).await {
            Ok(snapshot) if snapshot.issued_currencies().is_empty() => NO_TOKENS.to_string(),
            Ok(snapshot) => format_issuer_report(&snapshot),
            Err(err) => render_failure("issuer", &err, LOOKUP_FAILED),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn quality(q: Option<u64>) -> String {
    q.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn format_currency(entry: &IssuedCurrency) -> String {
    let features = entry.features();
    format!(
        "  • {currency}
    Total Supply: {supply}
    Trustlines: {count}
    Quality In/Out: {q_in}/{q_out}
    Limit: {limit}
    Features: {features}",
        currency = entry.currency,
        supply = entry.total_balance,
        count = entry.trustline_count,
        q_in = quality(entry.quality_in),
        q_out = quality(entry.quality_out),
        limit = entry.limit.as_deref().unwrap_or("No limit"),
        features = if features.is_empty() {
            "None".to_string()
        } else {
            features.join(", ")
        },
    )
}

pub fn format_issuer_report(snapshot: &IssuerSnapshot) -> String {
    let flags = snapshot.security;
    let currencies = snapshot
        .issued_currencies()
        .iter()
        .map(format_currency)
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut links = String::new();
    for (name, template) in EXPLORER_LINKS {
        let url = template.replace("{}", snapshot.address.as_str());
        let _ = writeln!(links, "  • {name}: {url}");
    }

    format!(
        "
📄 XRPL Issuer Contract
━━━━━━━━━━━━━━━━━━━━

📍 Address: {address}

💰 Account Details:
  • Balance: {balance} XRP
  • Sequence: {sequence}
  • Previous TxnID: {txn}

🔒 Security Settings:
  • Requires Auth: {auth}
  • Freeze Enabled: {freeze_enabled}
  • Global Freeze: {global_freeze}
  • No Freeze: {no_freeze}

💎 Issued Tokens ({count}):
{currencies}

🔗 View Contract:
{links}
🔄 View Latest Transaction:
  • https://xrpscan.com/tx/{txn}
━━━━━━━━━━━━━━━━━━━━━",
        address = snapshot.address,
        balance = snapshot.balance_xrp(),
        sequence = snapshot.sequence,
        txn = snapshot.previous_txn_id,
        auth = yes_no(flags.require_auth),
        freeze_enabled = yes_no(flags.freeze_enabled),
        global_freeze = yes_no(flags.global_freeze),
        no_freeze = yes_no(flags.no_freeze),
        count = snapshot.issued_currencies().len(),
    )
}
