//! OpenAI-compatible chat-completions client.

use super::{CallError, ChatMessage, LanguageModel};
use crate::config::ModelConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Instant;
use tracing::{debug, error};

/// Longest slice of an error body kept in `CallError::Status`.
const ERROR_BODY_LIMIT: usize = 500;

pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: String,
    config: ModelConfig,
}

impl OpenAiModel {
    /// Fails with `Unavailable` when no API key is configured.
    pub fn new(config: ModelConfig) -> Result<Self, CallError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CallError::Unavailable(format!("no API key configured for {}", config.model)))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CallError::Transport(e.to_string()))?;
        Ok(Self { client, api_key, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn map_send_error(&self, err: reqwest::Error) -> CallError {
        if err.is_timeout() {
            CallError::Timeout(self.config.timeout)
        } else {
            CallError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CallError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens
        });

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = response.text().await.unwrap_or_default();
            return Err(CallError::Auth(crate::observability::prefix(&text, ERROR_BODY_LIMIT).to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(model = %self.config.model, status = status.as_u16(), "Model endpoint returned an error");
            return Err(CallError::Status {
                status: status.as_u16(),
                body: crate::observability::prefix(&text, ERROR_BODY_LIMIT).to_string(),
            });
        }

        let response_json: serde_json::Value = response.json().await.map_err(|e| self.map_send_error(e))?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(CallError::EmptyResponse)?;

        debug!(
            model = %self.config.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_chars = content.chars().count(),
            "Model call completed"
        );
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(api_key: Option<&str>) -> ModelConfig {
        ModelConfig {
            api_key: api_key.map(str::to_string),
            base_url: "http://localhost:9/v1".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.0,
            max_tokens: 100,
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        assert!(matches!(OpenAiModel::new(config(None)), Err(CallError::Unavailable(_))));
        assert!(matches!(OpenAiModel::new(config(Some("  "))), Err(CallError::Unavailable(_))));
    }

    #[test]
    fn test_messages_serialize_with_lowercase_roles() {
        let json = serde_json::to_value(vec![ChatMessage::system("s"), ChatMessage::user("u")]).unwrap();
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[1]["content"], "u");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let model = OpenAiModel::new(config(Some("sk-test"))).unwrap();
        let err = model.generate(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, CallError::Transport(_) | CallError::Timeout(_)));
    }
}
