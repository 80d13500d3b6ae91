use async_trait::async_trait;
use posture_core::{DirectoryLookup, PostureError};
use reqwest::{Client, Url};

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

/// Client for the country directory service.
///
/// One request per lookup: no rate limiting, retries or caching.
#[derive(Clone)]
pub struct DirectoryClient {
    base_url: String,
    client: Client,
}

impl DirectoryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(concat!("stratscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// `<base>/name/{name}`, with the name percent-encoded as one path segment.
    fn name_url(&self, name: &str) -> Result<Url, PostureError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PostureError::Unavailable(format!("invalid directory url: {}", e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                PostureError::Unavailable(format!(
                    "directory url '{}' cannot be a base",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().push("name").push(name);
        }
        Ok(url)
    }

    /// Fetch every record whose full name matches `name`.
    ///
    /// A non-success status or an empty match sequence is reported as
    /// `NotFound`; transport and decoding failures as `Unavailable`.
    pub async fn search_by_name(&self, name: &str) -> Result<serde_json::Value, PostureError> {
        let url = self.name_url(name)?;

        let response = self
            .client
            .get(url)
            .query(&[("fullText", "true")])
            .send()
            .await
            .map_err(|e| PostureError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Directory lookup for '{}' returned HTTP {}", name, status);
            return Err(PostureError::NotFound(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PostureError::Unavailable(e.to_string()))?;

        match body.as_array() {
            Some(records) if !records.is_empty() => Ok(body),
            _ => Err(PostureError::NotFound(format!("no record matches '{}'", name))),
        }
    }
}

#[async_trait]
impl DirectoryLookup for DirectoryClient {
    async fn lookup(&self, name: &str) -> Result<serde_json::Value, PostureError> {
        self.search_by_name(name).await
    }
}
