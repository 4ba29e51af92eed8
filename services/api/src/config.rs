use doubt_core::{OracleConfig, OracleProvider};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

const DEFAULT_PHYSICS_VIDEO_URL: &str =
    "https://s3-content-videos.s3.ap-southeast-2.amazonaws.com/physics_topic1.mp4";
const DEFAULT_AVATAR_VIDEO_URL: &str =
    "https://s3-content-videos.s3.ap-southeast-2.amazonaws.com/avatar_video.mp4";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub oracle: OracleConfig,
    pub transcript_path: PathBuf,
    pub prompts_dir: Option<PathBuf>,
    pub physics_video_url: String,
    pub avatar_video_url: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// This function will look for a `.env` file in the current directory
    /// and load the following variables:
    ///
    /// *   `BIND_ADDRESS`: The address and port to bind the server to. Defaults to "0.0.0.0:5000".
    /// *   `ORACLE_PROVIDER`: The oracle backend. Can be "gemini" or "openai". Defaults to "gemini".
    /// *   `GEMINI_API_KEY`: Your secret key for the Gemini API. Required if provider is "gemini".
    /// *   `OPENAI_API_KEY`: Your secret key for the OpenAI API. Required if provider is "openai".
    /// *   `CHAT_MODEL`: (Optional) The model to use. Defaults to the provider's default.
    /// *   `ORACLE_TIMEOUT_SECS`: (Optional) Upper bound for one oracle call. Defaults to 20.
    /// *   `TRANSCRIPT_PATH`: (Optional) The lesson transcript JSON. Defaults to "transcript.json".
    /// *   `PROMPTS_DIR`: (Optional) A directory of `.md` prompt overrides.
    /// *   `PHYSICS_VIDEO_URL` / `AVATAR_VIDEO_URL`: (Optional) Video URLs handed to the frontend.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str =
            std::env::var("ORACLE_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
        let provider = provider_str
            .parse::<OracleProvider>()
            .map_err(|e| ConfigError::InvalidValue("ORACLE_PROVIDER".to_string(), e))?;

        // Validate that the required API key is present for the selected provider.
        let api_key = std::env::var(provider.api_key_var()).map_err(|_| {
            ConfigError::MissingVar(format!(
                "{} must be set for '{}' provider",
                provider.api_key_var(),
                provider_str.to_lowercase()
            ))
        })?;

        let chat_model = std::env::var("CHAT_MODEL")
            .unwrap_or_else(|_| provider.default_model().to_string());

        let timeout_str = std::env::var("ORACLE_TIMEOUT_SECS").unwrap_or_else(|_| "20".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("ORACLE_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let oracle = OracleConfig::builder(provider)
            .with_api_key(&api_key)
            .with_model(&chat_model)
            .with_timeout(Duration::from_secs(timeout_secs))
            .build();

        let transcript_path = std::env::var("TRANSCRIPT_PATH")
            .unwrap_or_else(|_| "transcript.json".to_string())
            .into();
        let prompts_dir = std::env::var("PROMPTS_DIR").ok().map(PathBuf::from);

        let physics_video_url = std::env::var("PHYSICS_VIDEO_URL")
            .unwrap_or_else(|_| DEFAULT_PHYSICS_VIDEO_URL.to_string());
        let avatar_video_url = std::env::var("AVATAR_VIDEO_URL")
            .unwrap_or_else(|_| DEFAULT_AVATAR_VIDEO_URL.to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            oracle,
            transcript_path,
            prompts_dir,
            physics_video_url,
            avatar_video_url,
            log_level,
        })
    }
}
