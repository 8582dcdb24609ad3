//! Configuration management for pdflabel.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;

/// Default directory scanned for PDF documents.
pub const DEFAULT_INPUT_DIR: &str = "scrappedPdfs";

/// Default output table filename.
pub const DEFAULT_OUTPUT_FILE: &str = "pdf_labels.csv";

/// Default number of leading pages to extract per document (0 = all pages).
pub const DEFAULT_PAGE_LIMIT: usize = 2;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory scanned for PDF documents.
    pub input_dir: PathBuf,
    /// Path of the output table.
    pub output_path: PathBuf,
    /// Leading pages to extract per document (0 = all pages).
    pub page_limit: usize,
    /// Maximum number of documents to process (0 = unlimited).
    pub doc_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            page_limit: DEFAULT_PAGE_LIMIT,
            doc_limit: 0,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for PDF documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<String>,
    /// Output table path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Leading pages to extract per document (0 = all pages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_limit: Option<usize>,
    /// LLM configuration for label generation.
    #[serde(default, skip_serializing_if = "LlmConfig::is_default")]
    pub llm: LlmConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, preferring an explicit path over auto-discovery.
    pub async fn load(explicit_path: Option<&Path>) -> Self {
        if let Some(path) = explicit_path {
            return Self::load_from_path(path)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Could not load config {}: {}", path.display(), e);
                    Self::default()
                });
        }

        match discover_config_file() {
            Some(path) => {
                tracing::debug!("Found config file: {}", path.display());
                Self::load_from_path(&path)
                    .await
                    .unwrap_or_else(|_| Self::default())
            }
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML formats based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        // Environment variables take priority over file values
        config.llm = config.llm.with_env_overrides();
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve relative paths (typically config file dir or CWD).
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref input_dir) = self.input_dir {
            settings.input_dir = self.resolve_path(input_dir, base_dir);
        }
        if let Some(ref output) = self.output {
            settings.output_path = self.resolve_path(output, base_dir);
        }
        if let Some(page_limit) = self.page_limit {
            settings.page_limit = page_limit;
        }
    }
}

/// Look for a config file in the working directory.
fn discover_config_file() -> Option<PathBuf> {
    let extensions = ["json", "toml", "yaml", "yml"];
    for ext in extensions {
        let path = PathBuf::from(format!("pdflabel.{}", ext));
        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load settings, applying config file values over defaults.
/// Returns (Settings, Config) tuple.
pub async fn load_settings(config_path: Option<&Path>) -> (Settings, Config) {
    let config = Config::load(config_path).await;

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.input_dir, PathBuf::from(DEFAULT_INPUT_DIR));
        assert_eq!(settings.output_path, PathBuf::from(DEFAULT_OUTPUT_FILE));
        assert_eq!(settings.page_limit, 2);
        assert_eq!(settings.doc_limit, 0);
    }

    #[test]
    fn test_apply_to_settings_resolves_relative_paths() {
        let config = Config {
            input_dir: Some("papers".to_string()),
            output: Some("out/labels.csv".to_string()),
            page_limit: Some(0),
            ..Default::default()
        };

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/data"));

        assert_eq!(settings.input_dir, PathBuf::from("/data/papers"));
        assert_eq!(settings.output_path, PathBuf::from("/data/out/labels.csv"));
        assert_eq!(settings.page_limit, 0);
    }

    #[test]
    fn test_absolute_paths_kept_as_is() {
        let config = Config {
            input_dir: Some("/srv/pdfs".to_string()),
            ..Default::default()
        };

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/data"));

        assert_eq!(settings.input_dir, PathBuf::from("/srv/pdfs"));
    }

    #[tokio::test]
    async fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdflabel.toml");
        tokio::fs::write(
            &path,
            r#"
input_dir = "papers"
output = "labels.csv"
page_limit = 3

[llm]
model = "llama3.2:3b"
"#,
        )
        .await
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.input_dir.as_deref(), Some("papers"));
        assert_eq!(config.output.as_deref(), Some("labels.csv"));
        assert_eq!(config.page_limit, Some(3));
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
    }
}
