//! Route registration — module routes under `/api/v1` + system endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Router, middleware};
use tracing::debug;

use labkom_auth::service::AuthService;

use crate::middleware::{auth_middleware, timeout_middleware};

/// Build the complete router.
///
/// Module routers are already `Router<()>` (each called `.with_state()`
/// internally) and are merged flat under `/api/v1` — the portal speaks
/// one operation namespace, not per-module prefixes. The auth gate
/// wraps the whole tree; the deadline wraps the gate.
pub fn build_router(
    auth: Arc<AuthService>,
    module_routes: Vec<(&str, Router)>,
    request_timeout: Duration,
) -> Router {
    let mut api = Router::new();
    for (name, router) in module_routes {
        debug!("mounting {name} module routes");
        api = api.merge(router);
    }

    Router::new()
        .route("/healthz", get(health))
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(auth, auth_middleware))
        .layer(middleware::from_fn_with_state(
            request_timeout,
            timeout_middleware,
        ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
