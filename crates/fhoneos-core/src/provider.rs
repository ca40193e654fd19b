use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::ProviderError;
use crate::types::{Completion, Message};
use crate::util::http;

/// LLM completion provider: role-tagged messages in, one completion out.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        reasoning_effort: &str,
    ) -> Result<Completion, ProviderError>;
}

/// OpenAI chat-completions client.
pub struct OpenAiChat {
    api_key: String,
    api_base: String,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        reasoning_effort: &str,
    ) -> Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.api_base);

        let body = json!({
            "model": model,
            "messages": messages,
            "reasoning_effort": reasoning_effort,
        });

        debug!("Completion request to {} with model {}", url, model);

        let response = http::client()
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let data: serde_json::Value = response.json().await?;
        Ok(parse_completion(&data))
    }
}

/// Extract the first choice's message content from an OpenAI-format
/// response. A missing choice or content is not an error here; the
/// handler substitutes its fallback reply.
pub fn parse_completion(data: &serde_json::Value) -> Completion {
    let content = data
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    Completion { content }
}
