use thiserror::Error;

/// Errors surfaced by the planning core.
///
/// The variants map one-to-one onto the response classes the HTTP layer
/// emits: validation problems are the caller's fault, upstream problems
/// belong to a collaborator, and internal problems mean a contract was
/// broken inside the crate (for example a bracket table with a gap).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlannerError {
    /// Malformed or out-of-range input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A text-generation or persistence collaborator failed.
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// Should never happen for well-formed input.
    #[error("internal computation error: {0}")]
    Internal(String),
}

impl PlannerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
