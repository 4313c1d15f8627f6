//! Request middleware: bearer-token gate and the bounded deadline.
//!
//! The auth gate delegates to [`AuthService::verify_token`], so a token
//! dies with its session (logout) and not only at `exp`. Verified
//! claims land in request extensions for downstream handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use labkom_auth::service::AuthService;
use labkom_core::ServiceError;

/// Paths served without a token. Everything else under `/api/v1`
/// requires a valid bearer token.
pub fn is_public_path(path: &str) -> bool {
    matches!(
        path,
        "/healthz"
            | "/api/v1/initial-data"
            | "/api/v1/branding"
            | "/api/v1/check-restrictions"
            | "/api/v1/computers-available"
            | "/api/v1/submit-request"
            | "/api/v1/submit-quisioner"
            | "/api/v1/admin-login"
            | "/api/v1/admin-check-auth"
    )
}

/// Require a valid bearer token on non-public paths.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("missing authorization token".to_string()))?
        .to_string();

    let claims = auth.verify_token(&token)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Bound every request to the configured deadline. On expiry the
/// operation reports a timeout; it is never retried by the server.
pub async fn timeout_middleware(
    State(deadline): State<Duration>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => Ok(response),
        Err(_) => Err(ServiceError::Timeout(format!(
            "request exceeded the {}s deadline",
            deadline.as_secs()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_match_exactly() {
        assert!(is_public_path("/healthz"));
        assert!(is_public_path("/api/v1/submit-request"));
        assert!(is_public_path("/api/v1/admin-login"));
        assert!(is_public_path("/api/v1/admin-check-auth"));

        assert!(!is_public_path("/api/v1/admin-requests"));
        assert!(!is_public_path("/api/v1/admin-logout"));
        assert!(!is_public_path("/api/v1/admin-approve"));
        assert!(!is_public_path("/api/v1/submit-request/extra"));
    }
}
