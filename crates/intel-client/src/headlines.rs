use crate::error::{IntelError, IntelResult};
use crate::{http_client, join_url};

/// Passthrough to a top-headlines service.
#[derive(Clone)]
pub struct HeadlineClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HeadlineClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: http_client(),
            base_url,
            api_key,
        }
    }

    /// General-category top headlines, returned exactly as the upstream sent them.
    pub async fn top_headlines(&self) -> IntelResult<serde_json::Value> {
        let mut query = vec![("category", "general".to_string())];
        if let Some(key) = &self.api_key {
            query.push(("apiKey", key.clone()));
        }

        let response = self
            .client
            .get(join_url(&self.base_url, "top-headlines"))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Headline upstream returned HTTP {}", status);
            return Err(IntelError::from_status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| IntelError::InvalidResponse(e.to_string()))
    }
}
