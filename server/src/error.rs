//! Service errors and their HTTP mapping.
//!
//! `NotFound` → 404, `IdMismatch` and `Validation` → 400, `Conflict` and
//! `Database` → 500. A write conflict only reaches the client as `Conflict`
//! when the row still exists; a row that vanished is reported as `NotFound`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::patch::PatchErrors;
use crate::repository::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("todo item {0} not found")]
    NotFound(i64),

    #[error("route id {route} does not match body id {body}")]
    IdMismatch { route: i64, body: i64 },

    #[error("patch document produced an invalid todo item")]
    Validation(PatchErrors),

    #[error("todo item {0} was modified concurrently")]
    Conflict(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { id } => Self::Conflict(id),
            StoreError::Database(e) => Self::Database(e),
        }
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::IdMismatch { .. } | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::IdMismatch { .. } => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONCURRENCY_CONFLICT",
            Self::Database(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<PatchErrors>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "request failed");
        }

        let code = self.code();
        // Store failures are logged above, not echoed to the client.
        let message = match &self {
            Self::Database(_) => "an internal error occurred".to_string(),
            other => other.to_string(),
        };
        let errors = match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        };

        (status, Json(ErrorBody { code, message, errors })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ServiceError::NotFound(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::IdMismatch { route: 1, body: 2 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Validation(PatchErrors::default()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Conflict(1).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display() {
        let err = ServiceError::IdMismatch { route: 1, body: 2 };
        assert_eq!(err.to_string(), "route id 1 does not match body id 2");
    }

    #[test]
    fn store_conflict_converts() {
        let err = ServiceError::from(StoreError::Conflict { id: 4 });
        assert!(matches!(err, ServiceError::Conflict(4)));
    }

    #[test]
    fn database_error_responds_500() {
        let response = ServiceError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn conflict_responds_500_with_code() {
        let response = ServiceError::Conflict(1).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "CONCURRENCY_CONFLICT");
        assert_eq!(body["message"], "todo item 1 was modified concurrently");
        assert!(body.get("errors").is_none());
    }
}
