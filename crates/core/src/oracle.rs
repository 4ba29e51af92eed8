use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod consts;
mod gemini;
mod openai;

pub use config::{OracleConfig, OracleConfigBuilder, OracleProvider};
pub use gemini::GeminiOracle;
pub use openai::OpenAiOracle;

/// Why an oracle call produced no usable text.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Oracle response contained no text")]
    Empty,
    #[error("Oracle did not answer within {0:?}")]
    Timeout(Duration),
}

// The `Oracle` trait is the single seam between the pipeline and the external
// text-generation service. Production code talks to Gemini or OpenAI over HTTP;
// tests use the `MockOracle` that `mockall` generates from this definition.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait Oracle: Send + Sync {
    /// Sends one prompt and returns the completion text.
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Builds the HTTP oracle selected by `config.provider()`.
pub fn build_oracle(config: OracleConfig) -> Arc<dyn Oracle> {
    tracing::info!(
        "Using {:?} oracle with model {}.",
        config.provider(),
        config.model()
    );
    match config.provider() {
        OracleProvider::Gemini => Arc::new(GeminiOracle::new(config)),
        OracleProvider::OpenAI => Arc::new(OpenAiOracle::new(config)),
    }
}

// Turns a non-2xx reply into `OracleError::Status`, keeping the body for the logs.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OracleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OracleError::Status {
        status: status.as_u16(),
        body,
    })
}

fn non_empty(text: String) -> Result<String, OracleError> {
    let text = text.trim();
    if text.is_empty() {
        Err(OracleError::Empty)
    } else {
        Ok(text.to_string())
    }
}
