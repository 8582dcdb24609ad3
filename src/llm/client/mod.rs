//! Chat-completion client for label generation.
//!
//! Supports the Ollama chat API for local inference and OpenAI-compatible
//! hosted chat-completion APIs behind a single backend contract.

mod config;
mod prompts;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use config::{LlmConfig, LlmProvider};

/// A chat-style completion backend: system instruction and user prompt in,
/// response text out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// LLM client for label generation.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

/// Ollama chat API request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama chat API response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
    #[allow(dead_code)]
    done: bool,
}

/// OpenAI-compatible chat completion request format.
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// OpenAI-compatible chat completion response format.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Option<Vec<OpenAiChoice>>,
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    ///
    /// Fails when the hosted provider is selected without an API key, so a
    /// misconfigured run aborts before any document is processed.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.provider == LlmProvider::OpenAI && config.api_key.is_none() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check if the LLM service is available.
    ///
    /// Only the Ollama provider has a cheap liveness probe; hosted APIs are
    /// assumed reachable and left to the per-document retry loop.
    pub async fn is_available(&self) -> bool {
        match self.config.provider {
            LlmProvider::Ollama => {
                let url = format!("{}/api/tags", self.config.endpoint);
                match self.client.get(&url).send().await {
                    Ok(resp) => resp.status().is_success(),
                    Err(_) => false,
                }
            }
            LlmProvider::OpenAI => true,
        }
    }

    /// List models available on the Ollama endpoint.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.config.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("HTTP {}", resp.status())));
        }

        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Call the Ollama chat API.
    async fn complete_ollama(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::new("system", system),
                ChatMessage::new("user", user),
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/chat", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat_resp: OllamaChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(chat_resp.message.content)
    }

    /// Call an OpenAI-compatible chat completion API.
    async fn complete_openai(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let api_key = self.config.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

        let request = OpenAiRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::new("system", system),
                ChatMessage::new("user", user),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let api_resp: OpenAiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        if let Some(error) = api_resp.error {
            return Err(LlmError::Api(error.message));
        }

        api_resp
            .choices
            .and_then(|mut choices| {
                if choices.is_empty() {
                    None
                } else {
                    Some(choices.remove(0).message.content)
                }
            })
            .ok_or_else(|| LlmError::Parse("Response contained no choices".to_string()))
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        debug!(model = %self.config.model, "Requesting chat completion");
        match self.config.provider {
            LlmProvider::Ollama => self.complete_ollama(system, user).await,
            LlmProvider::OpenAI => self.complete_openai(system, user).await,
        }
    }
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// Hosted provider selected without credentials
    #[error("API key required for the hosted provider (set OPENAI_API_KEY or LLM_API_KEY)")]
    MissingApiKey,
}
