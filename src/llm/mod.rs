//! LLM integration for generating document labels.
//!
//! Supports a local model (via Ollama) or a hosted OpenAI-compatible API.

mod client;

pub use client::{ChatBackend, LlmClient, LlmConfig, LlmError, LlmProvider};
