mod admin;
mod public;

use std::sync::Arc;

use axum::Router;

use crate::service::LabService;

/// Build the complete lab module router.
///
/// Public (no bearer token):
/// - `GET  /initial-data`        — reference lists + rule map for the form
/// - `GET  /branding`            — portal title/subtitle
/// - `POST /check-restrictions`  — evaluate a tentative software selection
/// - `GET  /computers-available` — AVAILABLE computers, public view
/// - `POST /submit-request`      — new request (JSON, or multipart with file)
/// - `POST /submit-quisioner`    — post-usage questionnaire
///
/// Admin (bearer token enforced by the server middleware):
/// - `GET  /admin-requests`              — all requests + dashboard stats
/// - `POST /admin-approve`               — PENDING → ACTIVE
/// - `POST /admin-reject`                — PENDING → REJECTED
/// - `POST /admin-revoke`                — ACTIVE → REVOKED
/// - `GET  /admin-expired-usage`         — revocation worklist
/// - `GET  /admin-maintenance-list`      — open maintenance tasks
/// - `POST /admin-maintenance-update`    — record progress, flag repair
/// - `POST /admin-maintenance-complete`  — close computer task
/// - `POST /admin-license-cleanup`       — close license task
/// - `GET  /admin-computers/{name}`      — full record, credentials included
pub fn router(service: Arc<LabService>) -> Router {
    Router::new()
        .merge(public::router(Arc::clone(&service)))
        .merge(admin::router(service))
}
