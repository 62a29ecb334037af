//! Groq LLM API client
//!
//! Thin chat-completions client used by the assistant service for
//! natural-language queries and narrative insights.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::GroqConfig;
use crate::error::{AppError, AppResult};

/// Groq API client
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

/// One chat message in a completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl GroqClient {
    pub fn new(config: &GroqConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        }
    }

    /// Send a chat completion request and return the model's reply text
    pub async fn chat(&self, messages: &[ChatMessage]) -> AppResult<String> {
        if self.api_key.is_empty() {
            return Err(AppError::Configuration(
                "Groq API key not configured".to_string(),
            ));
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "temperature": 0.7,
                "max_tokens": 2000,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Groq request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Groq API error response: {}", body);
            return Err(AppError::ExternalService(format!(
                "Groq API returned {}",
                status
            )));
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid Groq response: {}", e)))?;

        Ok(data
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
