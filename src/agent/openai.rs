//! OpenAI-backed model provider.
//!
//! A blocking chat-completions client behind the [`ModelProvider`] seam.
//! Credentials come from the environment (`OPENAI_API_KEY`, optional
//! `OPENAI_API_BASE`); the loop stays oblivious to the transport.

use crate::agent::provider::{Message, ModelProvider};
use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Default API base URL.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API base URL.
const API_BASE_ENV: &str = "OPENAI_API_BASE";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Blocking OpenAI chat-completions provider.
///
/// Deterministic settings (temperature 0) so runs are as reproducible as
/// the model allows.
pub struct OpenAiProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl OpenAiProvider {
    /// Creates a provider reading the API key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is not set.
    pub fn new(model: Option<String>) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| crate::Error::Config {
            message: format!("{API_KEY_ENV} is not set"),
        })?;
        Ok(Self::with_api_key(api_key, model))
    }

    /// Creates a provider with an explicit API key.
    #[must_use]
    pub fn with_api_key(api_key: String, model: Option<String>) -> Self {
        let api_base =
            std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            api_base,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ModelProvider for OpenAiProvider {
    fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!(model = %self.model, messages = messages.len(), "completion requested");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AgentError::Provider(format!(
                "API returned {status}: {body}"
            ))
            .into());
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AgentError::Provider("response contained no content".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_api_key_defaults() {
        let provider = OpenAiProvider::with_api_key("sk-test".to_string(), None);
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_with_api_key_custom_model() {
        let provider =
            OpenAiProvider::with_api_key("sk-test".to_string(), Some("gpt-4o".to_string()));
        assert_eq!(provider.model(), "gpt-4o");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{"choices": [{"message": {"content": "hello"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello"));
    }
}
