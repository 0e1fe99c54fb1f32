use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_exec_help_lists_commands() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("ledger-term")
        .env("LEDGER_TERM_HOME", dir.path())
        .args(["exec", "help"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("> help\n"))
        .stdout(predicate::str::contains("📚 Available Commands"))
        .stdout(predicate::str::contains("addressinfo <address-to-check>"))
        .stdout(predicate::str::contains("scan <issuer-address>"));
}

#[test]
fn test_exec_uses_configured_contract_address() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "contract_address = \"rCONTRACT\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("ledger-term")
        .env("LEDGER_TERM_HOME", dir.path())
        .args(["exec", "CA", "--instant"])
        .assert()
        .success()
        .stdout(predicate::str::contains("📋 Contract Address"))
        .stdout(predicate::str::contains("🔑 rCONTRACT"));
}

#[test]
fn test_exec_missing_argument_prints_usage() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("ledger-term")
        .env("LEDGER_TERM_HOME", dir.path())
        .args(["exec", "addressinfo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("❌ Missing Address"))
        .stdout(predicate::str::contains("Usage: addressinfo <address-to-check>"));
}

#[test]
fn test_exec_joins_words_into_one_line() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("ledger-term")
        .env("LEDGER_TERM_HOME", dir.path())
        .args(["exec", "telegram", "please"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("> telegram please\n"))
        .stdout(predicate::str::contains("https://t.me/LedgerAIXRP"));
}

#[test]
fn test_exec_clear_prints_nothing() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("ledger-term")
        .env("LEDGER_TERM_HOME", dir.path())
        .args(["exec", "cls"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_exec_writes_log_file() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("ledger-term")
        .env("LEDGER_TERM_HOME", dir.path())
        .args(["exec", "twitter"])
        .assert()
        .success();

    let logs = fs::read_dir(dir.path().join("logs")).unwrap().count();
    assert!(logs > 0);
}

#[test]
fn test_exec_chat_failure_falls_back() {
    let dir = tempdir().unwrap();
    // Nothing listens on the discard port.
    fs::write(
        dir.path().join("config.toml"),
        "[endpoints]\nchat_api = \"http://127.0.0.1:9/v1\"\n[network]\nrequest_timeout_secs = 5\n",
    )
    .unwrap();

    cargo_bin_cmd!("ledger-term")
        .env("LEDGER_TERM_HOME", dir.path())
        .env("OPENAI_API_KEY", "test-key")
        .env_remove("OPENAI_BASE_URL")
        .args(["exec", "what", "is", "xrp"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sorry, I couldn't process your request. Please try again.",
        ));
}
