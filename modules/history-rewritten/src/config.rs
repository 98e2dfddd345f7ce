use anyhow::{bail, Result};

const REQUIRED_VARS: [&str; 5] = [
    "OPENAI_API_KEY",
    "TWITTER_API_KEY",
    "TWITTER_API_SECRET",
    "TWITTER_ACCESS_TOKEN",
    "TWITTER_ACCESS_TOKEN_SECRET",
];

/// Secrets loaded from the environment (and `.env`). Tunables live in the
/// TOML [`FileConfig`](crate::file_config::FileConfig).
#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub twitter_api_key: String,
    pub twitter_api_secret: String,
    pub twitter_access_token: String,
    pub twitter_access_token_secret: String,
    pub openai_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Every missing variable is reported at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            bail!(
                "Missing environment variables: {}. Please check your .env file",
                missing.join(", ")
            );
        }

        let required = |key: &str| get(key).unwrap_or_default();
        let config = Self {
            openai_api_key: required("OPENAI_API_KEY"),
            twitter_api_key: required("TWITTER_API_KEY"),
            twitter_api_secret: required("TWITTER_API_SECRET"),
            twitter_access_token: required("TWITTER_ACCESS_TOKEN"),
            twitter_access_token_secret: required("TWITTER_ACCESS_TOKEN_SECRET"),
            openai_base_url: get("OPENAI_BASE_URL"),
        };

        config.log_keys();
        Ok(config)
    }

    pub fn x_credentials(&self) -> x_client::Credentials {
        x_client::Credentials {
            consumer_key: self.twitter_api_key.clone(),
            consumer_secret: self.twitter_api_secret.clone(),
            access_token: self.twitter_access_token.clone(),
            access_token_secret: self.twitter_access_token_secret.clone(),
        }
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.chars().count().min(5);
            let head: String = val.chars().take(n).collect();
            format!("{head}...({} chars)", val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  OPENAI_API_KEY: {}", preview(&self.openai_api_key));
        tracing::info!("  TWITTER_API_KEY: {}", preview(&self.twitter_api_key));
        tracing::info!("  TWITTER_ACCESS_TOKEN: {}", preview(&self.twitter_access_token));
        if let Some(ref url) = self.openai_base_url {
            tracing::info!("  OPENAI_BASE_URL: {url}");
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &"<redacted>")
            .field("twitter_api_key", &"<redacted>")
            .field("twitter_api_secret", &"<redacted>")
            .field("twitter_access_token", &"<redacted>")
            .field("twitter_access_token_secret", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .finish()
    }
}
