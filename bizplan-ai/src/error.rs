use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("AI not configured: {0}")]
    NotConfigured(String),

    #[error("API key not configured")]
    MissingKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A failure already reported through a [`Generation`](crate::Generation).
    #[error("{0}")]
    Reported(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
