//! API error type and HTTP mapping.
//!
//! Every domain error is folded into one of four categories and
//! rendered as the standard JSON envelope
//! `{ "success": false, "error": ..., "message": ... }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use conveyor_consume::ConsumeError;
use conveyor_ingest::IngestError;
use conveyor_schema::SchemaError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was well-formed JSON but semantically invalid.
    #[error("{0}")]
    BadRequest(String),

    /// The named resource does not exist (or there is nothing to
    /// deliver, which consumers treat the same way).
    #[error("{0}")]
    NotFound(String),

    /// Catalog and physical store disagree, or DDL partially applied.
    /// Requires operator attention.
    #[error("{0}")]
    Structural(String),

    /// Transient store failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Structural(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Structural(_) => "structural",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Validation(_) | SchemaError::TableExists { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            SchemaError::TableNotFound { .. } => ApiError::NotFound(err.to_string()),
            SchemaError::NoPhysicalColumns { .. } | SchemaError::DdlFailed { .. } => {
                ApiError::Structural(err.to_string())
            }
            SchemaError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ConsumeError> for ApiError {
    fn from(err: ConsumeError) -> Self {
        match err {
            // A poll with nothing to deliver is a 404, same as an
            // unknown table, but with its own message.
            ConsumeError::TableNotFound { .. } | ConsumeError::NoNewData { .. } => {
                ApiError::NotFound(err.to_string())
            }
            ConsumeError::TableInactive { .. } | ConsumeError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ConsumeError::NoPhysicalColumns { .. } => ApiError::Structural(err.to_string()),
            ConsumeError::Schema(inner) => ApiError::from(inner),
            ConsumeError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::TableNotFound { .. } => ApiError::NotFound(err.to_string()),
            IngestError::TableInactive { .. } | IngestError::EmptyBatch => {
                ApiError::BadRequest(err.to_string())
            }
            IngestError::NoPhysicalColumns { .. } => ApiError::Structural(err.to_string()),
            IngestError::Sink(_) => ApiError::Internal(err.to_string()),
            IngestError::Schema(inner) => ApiError::from(inner),
            IngestError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
