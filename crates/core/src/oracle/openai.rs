use super::{Oracle, OracleConfig, OracleError, ensure_success, non_empty};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub content: Option<String>,
}

/// Oracle backed by the OpenAI chat completions endpoint.
pub struct OpenAiOracle {
    client: Client,
    config: OracleConfig,
}

impl OpenAiOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let body = serde_json::json!({
            "model": self.config.model(),
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.2
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url()))
            .bearer_auth(self.config.api_key().expose_secret())
            .json(&body)
            .send()
            .await?;

        let resp = ensure_success(response)
            .await?
            .json::<LlmResponse>()
            .await?;

        let answer = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(OracleError::Empty)?;
        non_empty(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleProvider;
    use std::env;

    #[test]
    fn test_parse_chat_completion() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [ { "index": 0, "message": { "role": "assistant", "content": "physics" } } ]
        }"#;
        let resp: LlmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].message.content.as_deref(), Some("physics"));
    }

    // This is an integration test that makes a live call to the OpenAI API.
    // It is ignored by default; run it with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn test_live_answer() {
        dotenvy::dotenv_override().ok();
        let api_key = env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let oracle = OpenAiOracle::new(
            OracleConfig::builder(OracleProvider::OpenAI)
                .with_api_key(&api_key)
                .build(),
        );

        let prompts = crate::prompts::PromptSet::default();
        let answer = oracle
            .generate(&prompts.fallback("What is momentum?"))
            .await
            .expect("OpenAI call failed");
        assert!(!answer.is_empty());
    }
}
