use async_trait::async_trait;
use crate::PostureError;

/// Source of raw entity records keyed by display name.
///
/// Implementations return the full match sequence as delivered by the
/// directory; picking the first element and validating it is the
/// extractor's job.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    async fn lookup(&self, name: &str) -> Result<serde_json::Value, PostureError>;
}
