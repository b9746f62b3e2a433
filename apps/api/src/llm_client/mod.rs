//! LLM Client: the single point of entry for all model API calls.
//!
//! No other module talks to the Anthropic API directly. Callers depend on the
//! `TextModel` trait so the pipeline can run against a stub in tests.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;
#[cfg(test)]
pub mod testing;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Model used when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Model API unavailable: {0}")]
    ApiUnavailable(String),

    #[error("Model API rate limited after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("Invalid response from model API: {0}")]
    InvalidResponse(String),
}

/// Anything that turns a prompt into model output text.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    /// Some proxies omit usage; it is only logged.
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API with a fixed retry budget.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    retry_base_delay: Duration,
}

impl LlmClient {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.anthropic_api_key.clone(),
            api_url: config
                .llm_api_url
                .clone()
                .unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
            model: config
                .llm_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: config.llm_max_tokens,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        })
    }

    /// Overrides the first retry delay; later retries double it.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the Messages API, returning the full response object.
    /// Retries transport errors, 429 and 5xx up to `MAX_RETRIES` attempts in total.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_base_delay * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    warn!("LLM transport error: {e}");
                    last_error = Some(LlmError::ApiUnavailable(e.to_string()));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("LLM API returned {status}");
                last_error = Some(LlmError::RateLimited {
                    retries: MAX_RETRIES,
                });
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::ApiUnavailable(format!(
                    "status {}: {}",
                    status.as_u16(),
                    error_message(body)
                )));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::ApiUnavailable(format!(
                    "status {}: {}",
                    status.as_u16(),
                    error_message(body)
                )));
            }

            let llm_response: LlmResponse = response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponse(format!("undecodable body: {e}")))?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::ApiUnavailable(
            "no attempt was made".to_string(),
        )))
    }
}

#[async_trait]
impl TextModel for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        match response.text().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(LlmError::InvalidResponse(
                "model returned no text content".to_string(),
            )),
        }
    }
}

/// Sends a one-line prompt and checks that the model echoes the expected phrase.
pub async fn check_model(model: &dyn TextModel) -> Result<(), LlmError> {
    let reply = model
        .complete(prompts::PING_PROMPT, prompts::PING_SYSTEM)
        .await?;
    if reply
        .to_lowercase()
        .contains(&prompts::PING_REPLY.to_lowercase())
    {
        Ok(())
    } else {
        warn!("Model reachability check got an unexpected reply: {reply}");
        Err(LlmError::InvalidResponse(
            "model did not answer the reachability check".to_string(),
        ))
    }
}

/// Pulls the human-readable message out of an API error body when it has one.
fn error_message(body: String) -> String {
    serde_json::from_str::<AnthropicError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serves canned (status, body) replies in order; the last one repeats.
    #[derive(Clone)]
    struct FakeApi {
        replies: Arc<Vec<(u16, Value)>>,
        hits: Arc<AtomicU32>,
    }

    async fn fake_messages(State(api): State<FakeApi>) -> (AxumStatus, Json<Value>) {
        let hit = api.hits.fetch_add(1, Ordering::SeqCst) as usize;
        let (status, body) = api.replies[hit.min(api.replies.len() - 1)].clone();
        (AxumStatus::from_u16(status).unwrap(), Json(body))
    }

    async fn spawn_fake_api(replies: Vec<(u16, Value)>) -> (LlmClient, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));
        let api = FakeApi {
            replies: Arc::new(replies),
            hits: hits.clone(),
        };
        let app = Router::new()
            .route("/v1/messages", post(fake_messages))
            .with_state(api);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (client_for(format!("http://{addr}/v1/messages")), hits)
    }

    fn text_reply(text: &str) -> Value {
        json!({
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[tokio::test]
    async fn test_complete_returns_first_text_block() {
        let (client, hits) = spawn_fake_api(vec![(200, text_reply("  {\"score\": 1}  "))]).await;
        let text = client.complete("prompt", "system").await.unwrap();
        assert_eq!(text, "{\"score\": 1}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_rate_limit_then_succeeds() {
        let (client, hits) = spawn_fake_api(vec![
            (429, json!({"error": {"message": "slow down"}})),
            (503, json!({"error": {"message": "overloaded"}})),
            (200, text_reply("ok")),
        ])
        .await;
        let text = client.complete("prompt", "system").await.unwrap();
        assert_eq!(text, "ok");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_rate_limit_is_rate_limited() {
        let (client, hits) =
            spawn_fake_api(vec![(429, json!({"error": {"message": "slow down"}}))]).await;
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { retries: MAX_RETRIES }));
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_exhausted_server_errors_are_unavailable() {
        let (client, _) =
            spawn_fake_api(vec![(500, json!({"error": {"message": "boom"}}))]).await;
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::ApiUnavailable(msg) if msg.contains("boom")));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (client, hits) = spawn_fake_api(vec![(
            401,
            json!({"error": {"message": "invalid x-api-key"}}),
        )])
        .await;
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::ApiUnavailable(msg) if msg.contains("invalid x-api-key")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_text_is_invalid_response() {
        let (client, _) = spawn_fake_api(vec![(200, text_reply("   "))]).await;
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let (client, _) = spawn_fake_api(vec![(200, json!({"unexpected": true}))]).await;
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_reply_without_usage_is_accepted() {
        let (client, _) = spawn_fake_api(vec![(
            200,
            json!({"content": [{"type": "text", "text": "ok"}]}),
        )])
        .await;
        assert_eq!(client.complete("prompt", "system").await.unwrap(), "ok");
    }

    /// Accepts connections and closes them without answering.
    async fn spawn_hang_up_server() -> (SocketAddr, Arc<AtomicU32>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicU32::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                drop(socket);
            }
        });
        (addr, accepted)
    }

    fn client_for(url: String) -> LlmClient {
        let mut config = Config::for_tests();
        config.llm_api_url = Some(url);
        LlmClient::from_config(&config)
            .unwrap()
            .with_retry_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_dropped_connections_are_retried_then_unavailable() {
        let (addr, accepted) = spawn_hang_up_server().await;
        let client = client_for(format!("http://{addr}/v1/messages"));
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::ApiUnavailable(_)));
        assert_eq!(accepted.load(Ordering::SeqCst), MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_check_model_accepts_expected_phrase() {
        let (client, _) = spawn_fake_api(vec![(200, text_reply("API is working."))]).await;
        assert!(check_model(&client).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_model_rejects_other_reply() {
        let (client, _) = spawn_fake_api(vec![(200, text_reply("Hello there"))]).await;
        assert!(matches!(
            check_model(&client).await,
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_port_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(format!("http://{addr}/v1/messages"));
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::ApiUnavailable(_)));
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let body = r#"{"error": {"type": "invalid_request_error", "message": "bad"}}"#;
        assert_eq!(error_message(body.to_string()), "bad");
        assert_eq!(error_message("plain".to_string()), "plain");
    }
}
