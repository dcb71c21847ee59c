//! Project configuration file support for devscribe.
//!
//! Loads configuration from `devscribe.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use devscribe_core::ClassifierConfig;

/// Project-level configuration loaded from `devscribe.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Record store location (default: platform data dir)
    pub db_path: Option<PathBuf>,
    /// Log output format (pretty, json, compact)
    pub log_format: Option<String>,
    /// Directory for the JSONL diagnostic log file, if any
    pub log_dir: Option<PathBuf>,
    /// Classifier vocabulary extensions
    #[serde(default)]
    pub classifier: ClassifierSection,
}

/// Vocabulary extensions appended to the compiled-in defaults
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ClassifierSection {
    #[serde(default)]
    pub extra_noise_keywords: Vec<String>,
    #[serde(default)]
    pub extra_trivial_phrases: Vec<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "devscribe.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Classifier configuration: compiled-in defaults plus any extensions
    /// from the config file.
    pub fn classifier_config(&self) -> ClassifierConfig {
        let mut config = ClassifierConfig::default();
        config
            .noise_keywords
            .extend(self.classifier.extra_noise_keywords.iter().cloned());
        config
            .trivial_phrases
            .extend(self.classifier.extra_trivial_phrases.iter().cloned());
        config
    }
}
