use serde::Serialize;

use crate::error::{IntelError, IntelResult};
use crate::{http_client, join_url};

/// Returned when the upstream answers successfully but carries no content.
pub const FALLBACK_ANALYSIS: &str = "Analysis unavailable.";

const SYSTEM_INSTRUCTION: &str =
    "You are a strategic intelligence system. Answer coldly and directly in English, three sentences at most. Never use asterisks.";
const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

/// Chat-completion proxy producing a short narrative for a country.
#[derive(Clone)]
pub struct ReasoningClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ReasoningClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: http_client(),
            base_url,
            api_key,
            model,
        }
    }

    fn build_request(&self, country: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Strategic analysis of {}. Current risks?", country),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    /// Ask the upstream for an analysis of `country` and return the text of
    /// `choices[0].message.content`.
    pub async fn analyze(&self, country: &str) -> IntelResult<String> {
        let mut builder = self
            .client
            .post(join_url(&self.base_url, "chat/completions"))
            .json(&self.build_request(country));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Reasoning upstream returned HTTP {}", status);
            return Err(IntelError::from_status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| IntelError::InvalidResponse(e.to_string()))?;

        Ok(extract_content(&body).unwrap_or_else(|| FALLBACK_ANALYSIS.to_string()))
    }
}

fn extract_content(body: &serde_json::Value) -> Option<String> {
    body.pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
