//! Application Configuration Module
//!
//! Loads the oracle and lesson settings for the CLI from environment
//! variables into a single struct built once at startup.

use doubt_core::{OracleConfig, OracleProvider};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Holds all configuration loaded from the environment.
#[derive(Debug)]
pub struct Config {
    pub oracle: OracleConfig,
    pub transcript_path: PathBuf,
    pub prompts_dir: Option<PathBuf>,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// *   `ORACLE_PROVIDER`: "gemini" or "openai". Defaults to "gemini".
    /// *   `GEMINI_API_KEY` / `OPENAI_API_KEY`: Required for the selected provider.
    /// *   `CHAT_MODEL`: (Optional) Defaults to the provider's default model.
    /// *   `ORACLE_TIMEOUT_SECS`: (Optional) Defaults to 20.
    /// *   `TRANSCRIPT_PATH`: (Optional) Defaults to "transcript.json".
    /// *   `PROMPTS_DIR`: (Optional) Directory of `.md` prompt overrides.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();

        let provider_str = env::var("ORACLE_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
        let provider = provider_str
            .parse::<OracleProvider>()
            .map_err(|e| ConfigError::InvalidValue("ORACLE_PROVIDER".to_string(), e))?;

        let api_key = env::var(provider.api_key_var()).map_err(|_| {
            ConfigError::MissingVar(format!(
                "{} must be set for the {:?} provider",
                provider.api_key_var(),
                provider
            ))
        })?;

        let chat_model =
            env::var("CHAT_MODEL").unwrap_or_else(|_| provider.default_model().to_string());

        let timeout_str = env::var("ORACLE_TIMEOUT_SECS").unwrap_or_else(|_| "20".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("ORACLE_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let transcript_path = env::var("TRANSCRIPT_PATH")
            .unwrap_or_else(|_| "transcript.json".to_string())
            .into();
        let prompts_dir = env::var("PROMPTS_DIR").ok().map(PathBuf::from);

        // Configure logging level from RUST_LOG, with a sensible default.
        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidValue("RUST_LOG".to_string(), log_level_str))?;

        Ok(Self {
            oracle: OracleConfig::builder(provider)
                .with_api_key(&api_key)
                .with_model(&chat_model)
                .with_timeout(Duration::from_secs(timeout_secs))
                .build(),
            transcript_path,
            prompts_dir,
            log_level,
        })
    }
}
