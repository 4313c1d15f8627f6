use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use labkom_core::ServiceError;
use labkom_core::envelope::ok_message;

use crate::model::{CheckAuthBody, LoginBody};
use crate::service::AuthService;

type AppState = Arc<AuthService>;

/// Build the auth module router.
///
/// Routes:
/// - `POST /admin-login`      — credentials in, token out
/// - `POST /admin-check-auth` — token validity probe (never 401s)
/// - `POST /admin-logout`     — revoke the bearer token's session
pub fn router(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/admin-login", post(admin_login))
        .route("/admin-check-auth", post(admin_check_auth))
        .route("/admin-logout", post(admin_logout))
        .with_state(service)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ServiceError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))
}

// ---------------------------------------------------------------------------
// POST /admin-login
// ---------------------------------------------------------------------------

async fn admin_login(
    State(svc): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ServiceError> {
    let (token, user) = svc.login(&body.email, &body.password)?;
    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": user,
    })))
}

// ---------------------------------------------------------------------------
// POST /admin-check-auth
// ---------------------------------------------------------------------------

/// Reports validity instead of failing: the portal calls this on page
/// load to decide whether to show the login form.
async fn admin_check_auth(
    State(svc): State<AppState>,
    Json(body): Json<CheckAuthBody>,
) -> Result<Json<Value>, ServiceError> {
    let mut payload = json!({ "success": true, "authenticated": false });
    if let Some(user) = svc.check_auth(body.token.trim())? {
        payload["authenticated"] = json!(true);
        payload["user"] = json!(user);
    }
    Ok(Json(payload))
}

// ---------------------------------------------------------------------------
// POST /admin-logout
// ---------------------------------------------------------------------------

async fn admin_logout(
    State(svc): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError> {
    svc.logout(bearer_token(&headers)?)?;
    Ok(ok_message("logged out"))
}
