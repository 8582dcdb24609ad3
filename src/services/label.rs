//! Label generation with bounded retry and normalization.

use std::time::Duration;

use tracing::warn;

use crate::llm::{ChatBackend, LlmConfig};

/// Label recorded when a document yields no extractable text.
pub const NO_TEXT_LABEL: &str = "No text found";

/// Label recorded when every generation attempt fails.
pub const FAILED_LABEL: &str = "Failed to generate labels";

/// Labels kept from a model response.
const MAX_LABELS: usize = 3;

/// Words kept per label.
const MAX_LABEL_WORDS: usize = 3;

/// Outcome of labeling one document.
///
/// Exhausting the retry budget is a value, not an error: a single
/// document's failure must never abort the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    /// The backend produced a usable, normalized label string.
    Generated(String),
    /// The document had no text to label; the backend was never invoked.
    NoText,
    /// Every attempt failed; the retry budget is spent.
    Exhausted,
}

impl LabelOutcome {
    /// The label string recorded in the output table.
    pub fn into_label(self) -> String {
        match self {
            LabelOutcome::Generated(labels) => labels,
            LabelOutcome::NoText => NO_TEXT_LABEL.to_string(),
            LabelOutcome::Exhausted => FAILED_LABEL.to_string(),
        }
    }
}

/// Generates labels for extracted document text.
pub struct Labeler<'a> {
    backend: &'a dyn ChatBackend,
    config: &'a LlmConfig,
}

impl<'a> Labeler<'a> {
    pub fn new(backend: &'a dyn ChatBackend, config: &'a LlmConfig) -> Self {
        Self { backend, config }
    }

    /// Generate a label string for a document's extracted text.
    ///
    /// Empty or whitespace-only text short-circuits without invoking the
    /// backend. Otherwise the backend is invoked up to `max_retries` times
    /// with a fixed delay between attempts; a response that normalizes to
    /// nothing counts as a failed attempt.
    pub async fn label(&self, text: &str) -> LabelOutcome {
        if text.trim().is_empty() {
            return LabelOutcome::NoText;
        }

        let prompt = self
            .config
            .get_label_prompt()
            .replace("{excerpt}", self.config.excerpt(text));
        let system = self.config.get_system_prompt();

        for attempt in 1..=self.config.max_retries {
            match self.backend.complete(system, &prompt).await {
                Ok(response) => {
                    let labels = normalize_labels(&response);
                    if !labels.is_empty() {
                        return LabelOutcome::Generated(labels);
                    }
                    warn!(
                        "Empty label response, retrying ({}/{})",
                        attempt, self.config.max_retries
                    );
                }
                Err(e) => {
                    warn!(
                        "Label generation failed: {}. Retrying ({}/{})",
                        e, attempt, self.config.max_retries
                    );
                }
            }

            if attempt < self.config.max_retries {
                tokio::time::sleep(Duration::from_secs(self.config.retry_delay_secs)).await;
            }
        }

        LabelOutcome::Exhausted
    }
}

/// Normalize a raw model response into at most three trimmed labels.
///
/// Splits on commas, drops empty segments, keeps the first three labels and
/// truncates any label longer than three words to its first three.
pub fn normalize_labels(response: &str) -> String {
    response
        .trim()
        .trim_start_matches("Labels:")
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_LABELS)
        .map(|label| {
            let words: Vec<&str> = label.split_whitespace().collect();
            if words.len() > MAX_LABEL_WORDS {
                words[..MAX_LABEL_WORDS].join(" ")
            } else {
                label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
