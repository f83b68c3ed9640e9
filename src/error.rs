//! Failure taxonomy shared by the repository and the RPC handlers.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("user {0} not found")]
    NotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("malformed request: {0}")]
    Protocol(String),
}

impl Error {
    /// RPC status type and transport status for this failure.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Error::InvalidRole(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_argument"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            Error::Protocol(_) => (StatusCode::BAD_REQUEST, "malformed_request"),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Protocol(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();
        // driver errors stay in the logs
        let message = match &self {
            Error::Storage(_) => "storage failure".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_failure_maps_to_a_distinct_status() {
        let statuses = [
            Error::InvalidRole("UNSPECIFIED".into()).status(),
            Error::NotFound(1).status(),
            Error::Storage(sqlx::Error::PoolTimedOut).status(),
            Error::Protocol("bad json".into()).status(),
        ];
        for (i, a) in statuses.iter().enumerate() {
            for b in statuses.iter().skip(i + 1) {
                assert_ne!(a.0, b.0);
                assert_ne!(a.1, b.1);
            }
        }
    }

    #[test]
    fn storage_errors_convert_from_sqlx() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(err.status().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(Error::NotFound(42).to_string(), "user 42 not found");
    }
}
