//! Reasoning oracle backed by an OpenAI-compatible chat completions API.
//! Groq, OpenAI, and most hosted inference APIs accept the same request shape.

use super::prompts::SRE_SYSTEM_PROMPT;
use super::traits::{IncidentFacts, ReasoningOracle};
use crate::error::OracleError;
use crate::security::sanitize_api_error;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct CompatibleOracle {
    pub(crate) name: String,
    pub(crate) model: String,
    pub(crate) temperature: f64,
    pub(crate) max_tokens: u32,
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    /// Pre-computed chat completions URL.
    cached_chat_url: String,
    client: Client,
}

pub struct CompatibleOracleParams<'a> {
    pub name: &'a str,
    pub base_url: &'a str,
    pub api_key: Option<&'a str>,
    pub model: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub fn build_oracle_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| Client::new())
}

impl CompatibleOracle {
    pub fn new(params: &CompatibleOracleParams<'_>) -> Self {
        let base_url = params.base_url.trim_end_matches('/');
        let cached_chat_url = if base_url.ends_with("chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            name: params.name.to_string(),
            model: params.model.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            cached_auth_header: params
                .api_key
                .filter(|k| !k.trim().is_empty())
                .map(|k| format!("Bearer {k}")),
            cached_chat_url,
            client: build_oracle_client(params.request_timeout),
        }
    }

    fn build_request(&self, prompt: &str, facts: &IncidentFacts) -> ChatRequest {
        let system = format!(
            "{SRE_SYSTEM_PROMPT}\nIncident: {} (severity {}). Task: {}.",
            facts.incident_id, facts.severity, facts.purpose
        );
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    fn request_error(&self, err: &reqwest::Error) -> OracleError {
        OracleError::Request {
            provider: self.name.clone(),
            message: sanitize_api_error(&err.to_string()),
        }
    }
}

fn extract_text(response: &ChatResponse) -> Option<String> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl ReasoningOracle for CompatibleOracle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ask(&self, prompt: &str, facts: &IncidentFacts) -> Result<String, OracleError> {
        let auth_header =
            self.cached_auth_header
                .as_ref()
                .ok_or_else(|| OracleError::MissingApiKey {
                    provider: self.name.clone(),
                })?;

        let request = self.build_request(prompt, facts);
        let response = self
            .client
            .post(&self.cached_chat_url)
            .header("Authorization", auth_header)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            return Err(OracleError::Api {
                provider: self.name.clone(),
                status: status.as_u16(),
                message: sanitize_api_error(&body),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| self.request_error(&e))?;
        extract_text(&parsed).ok_or_else(|| OracleError::EmptyResponse {
            provider: self.name.clone(),
        })
    }
}
