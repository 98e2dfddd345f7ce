use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::history::DEFAULT_HISTORY_LOG;
use crate::illustration::DEFAULT_IMAGES_DIR;
use crate::novelty::DEFAULT_SIMILARITY_THRESHOLD;

/// TOML-backed tunables. Secrets stay in the environment. Every section is
/// optional and falls back to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileConfig {
    pub bot: BotConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BotConfig {
    pub similarity_threshold: f64,
    pub history_log: PathBuf,
    pub images_dir: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            history_log: PathBuf::from(DEFAULT_HISTORY_LOG),
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ModelsConfig {
    pub text: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub image: String,
    pub image_size: String,
    pub image_quality: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            text: "gpt-4o".to_string(),
            temperature: 0.8,
            max_tokens: 500,
            image: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Log file written alongside stdout. Empty disables file logging.
    pub file: PathBuf,
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("history_rewritten.log"),
            filter: "history_rewritten=info,ai_client=info,x_client=info".to_string(),
        }
    }
}

impl FileConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.bot.similarity_threshold),
            "bot.similarity_threshold must be within 0.0..=1.0, got {}",
            self.bot.similarity_threshold
        );
        Ok(())
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
