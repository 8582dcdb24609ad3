//! Default prompts for label generation.

/// Default prompt for generating document labels.
pub const DEFAULT_LABEL_PROMPT: &str = r#"Provide exactly 3 concise and relevant labels (each 2-3 words) for this document.
No explanations, just the labels separated by commas.

Excerpt: {excerpt}

Labels:"#;

/// Default system instruction reinforcing the output format.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert in document classification. Respond ONLY with 3 comma-separated labels, each 2-3 words, nothing else.";
