use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// The one error type every handler and service returns.
///
/// Each variant carries the human-readable message only; the stable
/// machine code and the HTTP status are derived from the variant. On
/// the wire an error is the failure envelope:
///
/// ```json
/// {"success": false, "code": "CONFLICT", "message": "request req1 is not PENDING"}
/// ```
///
/// Clients branch on `code` — the message text is free to change.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The named resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A precondition no longer holds: the request already transitioned,
    /// the computer is already claimed, the feedback row already exists.
    /// Clients refresh and retry deliberately, never automatically.
    #[error("{0}")]
    Conflict(String),

    /// User-correctable input problem. The message names the field.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, expired, or revoked bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to do this.
    #[error("{0}")]
    PermissionDenied(String),

    /// The bounded per-request deadline ran out. Transient; retry is a
    /// manual decision after checking current state.
    #[error("{0}")]
    Timeout(String),

    /// A storage backend (SQL, KV, blob) failed.
    #[error("{0}")]
    Storage(String),

    /// Everything else. A bug until proven otherwise.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// (HTTP status, stable machine code) for this variant.
    fn parts(&self) -> (StatusCode, &'static str) {
        use ServiceError::*;
        match self {
            NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            PermissionDenied(_) => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
            Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }

    /// Stable machine code, e.g. `"VALIDATION_FAILED"`.
    pub fn code(&self) -> &'static str {
        self.parts().1
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let body = serde_json::json!({
            "success": false,
            "code": code,
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_table() {
        let cases: Vec<(ServiceError, StatusCode, &str)> = vec![
            (
                ServiceError::NotFound("x".into()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                ServiceError::Conflict("x".into()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                ServiceError::Validation("x".into()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
            ),
            (
                ServiceError::Unauthorized("x".into()),
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
            ),
            (
                ServiceError::PermissionDenied("x".into()),
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
            ),
            (
                ServiceError::Timeout("x".into()),
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
            ),
            (
                ServiceError::Storage("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
            ),
            (
                ServiceError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status(), status, "{code}");
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn display_is_the_bare_message() {
        let err = ServiceError::Validation("nama is required".into());
        assert_eq!(err.to_string(), "nama is required");
    }

    #[test]
    fn response_carries_status() {
        let resp = ServiceError::Conflict("request req1 is not PENDING".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
