//! Integration tests for the HTTP aggregators (address info, contracts, chat).
//!
//! Each test points a client at a wiremock server and checks the rendered text.

use ledger_core::services::account::AccountClient;
use ledger_core::services::chat::{CHAT_FAILED, ChatClient, ChatConfig};
use ledger_core::services::contract::ContractClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDR: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn chat_client(server: &MockServer, api_key: Option<&str>) -> ChatClient {
    ChatClient::new(
        ChatConfig {
            api_key: api_key.map(ToString::to_string),
            base_url: server.uri(),
            model: "gpt-3.5-turbo".to_string(),
        },
        reqwest::Client::new(),
    )
}

#[tokio::test]
async fn test_account_report_scales_balance() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/account/{ADDR}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Account": ADDR,
            "xrpBalance": "2500000",
            "PreviousTxnID": "ABC123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AccountClient::new(server.uri(), reqwest::Client::new());
    let text = client.report(ADDR).await;

    assert!(text.contains(&format!("👛 Address: {ADDR}")), "{text}");
    assert!(text.contains("💰 Balance: 25.000000 XRP"), "{text}");
    assert!(text.contains("https://xrpscan.com/tx/ABC123"), "{text}");
}

#[tokio::test]
async fn test_account_error_payload_is_shown() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/account/{ADDR}")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Account not found"})),
        )
        .mount(&server)
        .await;

    let client = AccountClient::new(server.uri(), reqwest::Client::new());
    assert_eq!(client.report(ADDR).await, "❌ Error: Account not found");
}

#[tokio::test]
async fn test_account_garbage_body_is_generic_failure() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = AccountClient::new(server.uri(), reqwest::Client::new());
    assert_eq!(
        client.report(ADDR).await,
        "❌ Error fetching XRP account information. Please try again."
    );
}

#[tokio::test]
async fn test_invalid_address_makes_no_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let account = AccountClient::new(server.uri(), reqwest::Client::new());
    let contracts = ContractClient::new(server.uri(), reqwest::Client::new());
    assert!(account.report("xyz").await.starts_with("❌ Invalid XRP address format"));
    assert!(contracts.report("r0OIl").await.starts_with("❌ Invalid contract address format"));
}

#[tokio::test]
async fn test_contract_report_fills_missing_fields() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/contracts/{ADDR}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Ledger AI",
            "symbol": "LAI",
            "website": "https://ledger.ai"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ContractClient::new(server.uri(), reqwest::Client::new());
    let text = client.report(ADDR).await;

    assert!(text.contains("  • Name: Ledger AI"), "{text}");
    assert!(text.contains("  • Supply: N/A"), "{text}");
    assert!(text.contains("👤 Creator: N/A"), "{text}");
    assert!(text.contains("🌐 Website: https://ledger.ai"), "{text}");
}

#[tokio::test]
async fn test_contract_server_error_is_generic_failure() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = ContractClient::new(server.uri(), reqwest::Client::new());
    assert_eq!(
        client.report(ADDR).await,
        "❌ Error fetching contract information. Please try again."
    );
}

#[tokio::test]
async fn test_chat_returns_first_choice() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "what is XRP?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "A digital asset."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = chat_client(&server, Some("sk-test"));
    assert_eq!(client.reply("what is XRP?").await, "A digital asset.");
}

#[tokio::test]
async fn test_chat_failures_collapse_to_apology() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = chat_client(&server, Some("sk-test"));
    assert_eq!(client.reply("hi").await, CHAT_FAILED);

    let server_error = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Incorrect API key"}})),
        )
        .mount(&server_error)
        .await;

    let client = chat_client(&server_error, Some("sk-bad"));
    assert_eq!(client.reply("hi").await, CHAT_FAILED);
}
