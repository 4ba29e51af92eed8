use super::consts::{
    DEFAULT_TIMEOUT_SECS, GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL, OPENAI_BASE_URL,
    OPENAI_DEFAULT_MODEL,
};
use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;

/// The text-generation backends the oracle can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    Gemini,
    OpenAI,
}

impl OracleProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            OracleProvider::Gemini => GEMINI_DEFAULT_MODEL,
            OracleProvider::OpenAI => OPENAI_DEFAULT_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            OracleProvider::Gemini => GEMINI_BASE_URL,
            OracleProvider::OpenAI => OPENAI_BASE_URL,
        }
    }

    /// Name of the environment variable holding this provider's key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            OracleProvider::Gemini => "GEMINI_API_KEY",
            OracleProvider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for OracleProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(OracleProvider::Gemini),
            "openai" => Ok(OracleProvider::OpenAI),
            other => Err(format!("unknown oracle provider '{other}'")),
        }
    }
}

/// Connection settings for an oracle backend. Built once at startup.
#[derive(Debug)]
pub struct OracleConfig {
    provider: OracleProvider,
    base_url: String,
    api_key: SecretString,
    model: String,
    timeout: Duration,
}

pub struct OracleConfigBuilder {
    config: OracleConfig,
}

impl OracleConfigBuilder {
    pub fn new(provider: OracleProvider) -> Self {
        Self {
            config: OracleConfig::new(provider),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.config.api_key = SecretString::from(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> OracleConfig {
        self.config
    }
}

impl OracleConfig {
    // Provider defaults, with an empty key.
    pub fn new(provider: OracleProvider) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            api_key: SecretString::from(String::new()),
            model: provider.default_model().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn builder(provider: OracleProvider) -> OracleConfigBuilder {
        OracleConfigBuilder::new(provider)
    }

    pub fn provider(&self) -> OracleProvider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<OracleProvider>(), Ok(OracleProvider::Gemini));
        assert_eq!(" openai ".parse::<OracleProvider>(), Ok(OracleProvider::OpenAI));
        assert!("claude".parse::<OracleProvider>().is_err());
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let config = OracleConfig::builder(OracleProvider::OpenAI)
            .with_api_key("sk-test")
            .with_base_url("http://localhost:8080/v1/")
            .with_timeout(Duration::from_secs(3))
            .build();

        assert_eq!(config.model(), OPENAI_DEFAULT_MODEL);
        assert_eq!(config.base_url(), "http://localhost:8080/v1");
        assert_eq!(config.api_key().expose_secret(), "sk-test");
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_debug_output_hides_api_key() {
        let config = OracleConfig::builder(OracleProvider::Gemini)
            .with_api_key("very-secret-key")
            .build();
        assert!(!format!("{config:?}").contains("very-secret-key"));
    }
}
