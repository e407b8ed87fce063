//! API error taxonomy and its HTTP mapping.
//!
//! External-service failures (OpenAI) and bookkeeping persistence failures
//! never reach this type: they are caught and logged where they happen and the
//! request degrades instead. Everything else funnels through `ApiError` so the
//! route boundary maps it to a status code with a short JSON body.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing/malformed input.
    #[error("{0}")]
    Validation(String),
    /// Duplicate username/email at registration.
    #[error("{0}")]
    Conflict(String),
    /// Missing, invalid, or expired bearer token; bad login credentials.
    #[error("{0}")]
    Auth(String),
    /// Unknown puzzle id.
    #[error("{0}")]
    NotFound(String),
    /// Anything unexpected. Clients get a generic message, never internals.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ErrorBody { error: self.to_string() };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        // Storage failures on user-facing reads/writes (register, login, stats)
        // surface as a generic 500; the detail stays in the logs.
        error!(target: "brainrally_backend", error = %e, "Storage operation failed");
        ApiError::Internal
    }
}
