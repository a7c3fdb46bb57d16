use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use bizplan_core::PlannerError;

/// Errors a handler can return. Each maps to one status class.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::Validation(msg) => Self::Validation(msg),
            PlannerError::Upstream(msg) => Self::Upstream(msg),
            PlannerError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(detail) => {
                error!(%detail, "internal error while handling request");
                "Internal computation error".to_string()
            }
            other => other.to_string(),
        };
        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planner_errors_map_to_status_classes() {
        let cases = [
            (PlannerError::validation("bad"), StatusCode::BAD_REQUEST),
            (PlannerError::Upstream("down".to_string()), StatusCode::BAD_GATEWAY),
            (PlannerError::internal("gap"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn validation_message_passes_through() {
        let err = ApiError::from(PlannerError::validation("years must be between 1 and 60, got 0"));
        assert_eq!(err.to_string(), "years must be between 1 and 60, got 0");
    }
}
