//! LLM client for OpenAI-compatible chat-completion providers

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::CoachConfig;

/// Configuration for an LLM API provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL for the API (e.g., "https://openrouter.ai/api/v1")
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Bound on one request round trip
    pub timeout: Duration,
}

/// LLM API client (OpenRouter or any OpenAI-compatible provider)
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    provider: ProviderConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

impl LlmClient {
    /// Create a client with a specific provider configuration
    pub fn with_provider(provider: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(provider.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, provider })
    }

    /// Create a client from coach config, with the API key from the secrets layer
    pub fn from_config(config: &CoachConfig) -> Result<Self> {
        let api_key = crate::secrets::get_api_key()?;
        Self::with_provider(ProviderConfig {
            base_url: config.base_url.clone(),
            api_key,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Send a chat completion request
    pub async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.provider.base_url))
            .header("Authorization", format!("Bearer {}", self.provider.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to LLM provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("LLM API error ({}): {}", status, body);
        }

        let body = response.text().await.context("Failed to read response body")?;
        let raw_response: serde_json::Value = serde_json::from_str(&body)
            .context("Failed to parse JSON response")?;

        // Extract content from the response using path navigation.
        // Handle both string content and array-of-content-parts formats.
        let content_value = raw_response
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"));

        let content = match content_value {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(parts)) => parts
                .iter()
                .filter_map(|part| {
                    if part.get("type").and_then(|t| t.as_str()) == Some("text") {
                        part.get("text").and_then(|t| t.as_str()).map(|s| s.to_string())
                    } else {
                        None
                    }
                })
                .collect::<Vec<_>>()
                .join(""),
            _ => bail!("LLM response carried no message content"),
        };

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_skips_absent_max_tokens() {
        let request = ChatRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(!json.contains("max_tokens"));
    }
}
