//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use turing_agent::AgentError;
use turing_models::AgentRole;
use turing_orchestrator::OrchestratorError;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error type for consistent error responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// The conversation is not in a state that allows the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A human spoke out of turn. `expected` names the seat that must speak.
    #[error("conflict: not your turn, {expected} speaks next")]
    TurnOrder { expected: AgentRole },

    /// An upstream model provider failed.
    #[error("upstream model error: {0}")]
    BadGateway(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) | ApiError::TurnOrder { .. } => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, error = %self, "Request failed");
        } else {
            warn!(%status, error = %self, "Request rejected");
        }
        let body = match &self {
            ApiError::TurnOrder { expected } => json!({
                "error": self.to_string(),
                "code": "turn_order",
                "expected": expected,
            }),
            _ => json!({
                "error": self.to_string()
            }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::NotFound(id) => {
                ApiError::NotFound(format!("conversation not found: {}", id))
            }
            OrchestratorError::InvalidState(msg) => ApiError::Conflict(msg),
            OrchestratorError::TurnOrder { expected, .. } => ApiError::TurnOrder { expected },
            OrchestratorError::InvalidInput(msg) => ApiError::BadRequest(msg),
            OrchestratorError::Gateway(AgentError::Configuration(msg)) => {
                ApiError::ServiceUnavailable(msg)
            }
            OrchestratorError::Gateway(err) => ApiError::BadGateway(err.to_string()),
            err @ OrchestratorError::CapacityExceeded(_) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            OrchestratorError::Persistence(err) => ApiError::Internal(err.to_string()),
            OrchestratorError::Task(err) => ApiError::Internal(err.to_string()),
        }
    }
}
