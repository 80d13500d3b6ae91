use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntelError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Upstream rejected credentials")]
    Unauthorized,

    #[error("Upstream account has insufficient balance")]
    PaymentRequired,

    #[error("Upstream rate limit reached")]
    RateLimited,

    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl IntelError {
    /// Map a non-success upstream status onto the error taxonomy.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => IntelError::Unauthorized,
            402 => IntelError::PaymentRequired,
            429 => IntelError::RateLimited,
            other => IntelError::UpstreamStatus(other),
        }
    }

    /// True when the upstream answered but the answer was unusable, as
    /// opposed to the request never completing.
    pub fn is_bad_gateway(&self) -> bool {
        !matches!(self, IntelError::RequestFailed(_))
    }
}

pub type IntelResult<T> = Result<T, IntelError>;
