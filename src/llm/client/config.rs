//! LLM client configuration.

use serde::{Deserialize, Serialize};

use super::prompts::{DEFAULT_LABEL_PROMPT, DEFAULT_SYSTEM_PROMPT};

/// LLM provider type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Ollama API (local, default)
    #[default]
    Ollama,
    /// OpenAI-compatible API (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            _ => None,
        }
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider (ollama or openai)
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint (provider-specific defaults apply)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key for OpenAI-compatible providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model to use for label generation
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum characters of document text embedded in the prompt
    #[serde(default = "default_max_excerpt_chars")]
    pub max_excerpt_chars: usize,
    /// Maximum generation attempts per document
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Delay between attempts in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Custom label prompt (uses {excerpt} placeholder)
    #[serde(default)]
    pub label_prompt: Option<String>,
    /// Custom system instruction
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "phi3:mini".to_string()
}

fn default_max_tokens() -> u32 {
    128
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_excerpt_chars() -> usize {
    1000
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl LlmConfig {
    /// Base default without env overrides (used internally to avoid recursion).
    fn base_default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_excerpt_chars: default_max_excerpt_chars(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            label_prompt: None,
            system_prompt: None,
        }
    }

    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::base_default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_PROVIDER`: "ollama" (default), "openai", "groq", or "together"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key for OpenAI-compatible providers
    /// - `LLM_MODEL`: Model name
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    /// - `LLM_MAX_EXCERPT_CHARS`: Max document chars embedded in the prompt
    /// - `LLM_MAX_RETRIES`: Generation attempts per document
    /// - `LLM_RETRY_DELAY_SECS`: Delay between attempts
    ///
    /// Priority: LLM_PROVIDER wins over auto-detection from API keys.
    /// If no provider is set but OPENAI_API_KEY is present, the hosted
    /// provider is selected automatically.
    pub fn with_env_overrides(mut self) -> Self {
        // Check if provider is explicitly set - this is authoritative
        let explicit_provider = std::env::var("LLM_PROVIDER").ok();
        if let Some(ref val) = explicit_provider {
            if let Some(provider) = LlmProvider::from_str(val) {
                self.provider = provider;
            }
        }

        // Explicit endpoint always wins
        let explicit_endpoint = std::env::var("LLM_ENDPOINT").ok();
        if let Some(ref endpoint) = explicit_endpoint {
            self.endpoint = endpoint.clone();
        }

        // Explicit API key always wins
        if let Ok(val) = std::env::var("LLM_API_KEY") {
            self.api_key = Some(val);
        }

        // If provider was explicitly set, use provider-specific defaults
        if let Some(ref provider_str) = explicit_provider {
            let provider_lower = provider_str.to_lowercase();

            // Set endpoint if not explicitly provided
            if explicit_endpoint.is_none() {
                match provider_lower.as_str() {
                    "groq" => self.endpoint = "https://api.groq.com/openai".to_string(),
                    "openai" => self.endpoint = "https://api.openai.com".to_string(),
                    "together" => self.endpoint = "https://api.together.xyz".to_string(),
                    _ => {} // ollama keeps default
                }
            }

            // Set API key from provider-specific env var if not explicitly provided
            if self.api_key.is_none() {
                match provider_lower.as_str() {
                    "groq" => self.api_key = std::env::var("GROQ_API_KEY").ok(),
                    "openai" => self.api_key = std::env::var("OPENAI_API_KEY").ok(),
                    // together uses LLM_API_KEY which we already checked
                    _ => {}
                }
            }
        } else if self.api_key.is_none() {
            // No explicit provider - auto-detect from available keys
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                self.api_key = Some(key);
                self.provider = LlmProvider::OpenAI;
                if explicit_endpoint.is_none() {
                    self.endpoint = "https://api.openai.com".to_string();
                }
            }
        }

        if let Ok(val) = std::env::var("LLM_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = val.parse() {
                self.max_tokens = n;
            }
        }
        if let Ok(val) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                self.temperature = t;
            }
        }
        if let Ok(val) = std::env::var("LLM_MAX_EXCERPT_CHARS") {
            if let Ok(n) = val.parse() {
                self.max_excerpt_chars = n;
            }
        }
        if let Ok(val) = std::env::var("LLM_MAX_RETRIES") {
            if let Ok(n) = val.parse() {
                self.max_retries = n;
            }
        }
        if let Ok(val) = std::env::var("LLM_RETRY_DELAY_SECS") {
            if let Ok(n) = val.parse() {
                self.retry_delay_secs = n;
            }
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Get the label prompt, using custom or default.
    pub fn get_label_prompt(&self) -> &str {
        self.label_prompt.as_deref().unwrap_or(DEFAULT_LABEL_PROMPT)
    }

    /// Get the system instruction, using custom or default.
    pub fn get_system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Bound the excerpt embedded in the prompt (UTF-8 safe).
    pub fn excerpt<'a>(&self, text: &'a str) -> &'a str {
        if text.len() <= self.max_excerpt_chars {
            return text;
        }
        // Find a valid UTF-8 boundary at or before max_excerpt_chars
        let mut end = self.max_excerpt_chars;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_secs, 2);
        assert_eq!(config.max_excerpt_chars, 1000);
        assert!(config.label_prompt.is_none());
        assert!(config.get_label_prompt().contains("{excerpt}"));
        assert!(config.get_system_prompt().contains("comma-separated"));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!(LlmProvider::from_str("ollama"), Some(LlmProvider::Ollama));
        assert_eq!(LlmProvider::from_str("OpenAI"), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::from_str("groq"), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::from_str("bedrock"), None);
    }

    #[test]
    fn test_excerpt_bounding() {
        let config = LlmConfig {
            max_excerpt_chars: 10,
            ..LlmConfig::base_default()
        };
        assert_eq!(config.excerpt("short"), "short");
        assert_eq!(config.excerpt("exactly ten"), "exactly te");

        // Truncation never splits a multi-byte character
        let text = "ééééééé";
        let bounded = config.excerpt(text);
        assert!(bounded.len() <= 10);
        assert!(text.starts_with(bounded));
    }
}
