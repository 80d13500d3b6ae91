use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostureError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl PostureError {
    /// True for failures caused by the directory service or its payload,
    /// as opposed to bad caller input.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, PostureError::Validation(_))
    }
}
