//! OpenAI-compatible chat completions (non-streaming, single turn).

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{ServiceError, ServiceErrorKind, ServiceResult, classify_reqwest_error, read_json};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Shown for every chat failure, whatever the cause.
pub const CHAT_FAILED: &str = "Sorry, I couldn't process your request. Please try again.";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// `None` defers the failure to the first request.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    config: ChatConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatCompletionMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers
}

impl ChatClient {
    pub fn new(config: ChatConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends `prompt` as a single user message and returns the first choice.
    ///
    /// # Errors
    /// Missing API key, transport failures, error payloads, bad statuses and
    /// replies without `choices[0].message.content`.
    pub async fn complete(&self, prompt: &str) -> ServiceResult<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ServiceError::new(
                ServiceErrorKind::Config,
                "No API key configured (set chat.api_key or OPENAI_API_KEY)",
            )
        })?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: [ChatCompletionMessage {
                role: "user",
                content: prompt,
            }],
        };
        let url = format!("{}{}", self.config.base_url, CHAT_COMPLETIONS_PATH);

        let response = self
            .http
            .post(&url)
            .headers(build_headers(api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let body: ChatCompletionResponse = read_json(response).await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ServiceError::parse("Reply has no choices[0].message.content"))
    }

    /// Like [`ChatClient::complete`], collapsing every failure to [`CHAT_FAILED`].
    pub async fn reply(&self, prompt: &str) -> String {
        match self.complete(prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    service = "chat",
                    kind = %err.kind,
                    details = err.details.as_deref().unwrap_or(""),
                    "{err}"
                );
                CHAT_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: [ChatCompletionMessage {
                role: "user",
                content: "hi",
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn test_bearer_header() {
        let headers = build_headers("sk-test");
        assert_eq!(headers["Authorization"], "Bearer sk-test");
    }

    #[tokio::test]
    async fn test_missing_key_falls_back() {
        let client = ChatClient::new(
            ChatConfig {
                api_key: None,
                base_url: "http://127.0.0.1:9".to_string(),
                model: "m".to_string(),
            },
            reqwest::Client::new(),
        );
        let err = client.complete("hi").await.unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::Config);
        assert_eq!(client.reply("hi").await, CHAT_FAILED);
    }
}
