pub mod error;
pub mod headlines;
pub mod reasoning;

pub use error::{IntelError, IntelResult};
pub use headlines::HeadlineClient;
pub use reasoning::ReasoningClient;

/// Endpoints and credentials for the sibling proxy services.
#[derive(Debug, Clone)]
pub struct IntelConfig {
    pub reasoning_url: String,
    pub reasoning_api_key: Option<String>,
    pub reasoning_model: String,
    pub headlines_url: String,
    pub headlines_api_key: Option<String>,
}

/// Both proxy clients.
#[derive(Clone)]
pub struct IntelClient {
    pub reasoning: ReasoningClient,
    pub headlines: HeadlineClient,
}

impl IntelClient {
    pub fn new(config: IntelConfig) -> Self {
        Self {
            reasoning: ReasoningClient::new(
                config.reasoning_url,
                config.reasoning_api_key,
                config.reasoning_model,
            ),
            headlines: HeadlineClient::new(config.headlines_url, config.headlines_api_key),
        }
    }
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("stratscope/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
