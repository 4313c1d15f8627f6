use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

use labkom_core::ServiceError;
use labkom_core::envelope::{ok, ok_message, ok_with_stats};

use crate::model::{
    ApproveBody, MaintenanceCompleteBody, MaintenanceProgressBody, RejectBody, RequestFilterQuery,
    RevokeBody,
};
use crate::service::LabService;

type AppState = Arc<LabService>;

pub fn router(service: Arc<LabService>) -> Router {
    Router::new()
        .route("/admin-requests", get(admin_requests))
        .route("/admin-approve", post(admin_approve))
        .route("/admin-reject", post(admin_reject))
        .route("/admin-revoke", post(admin_revoke))
        .route("/admin-expired-usage", get(admin_expired_usage))
        .route("/admin-maintenance-list", get(admin_maintenance_list))
        .route("/admin-maintenance-update", post(admin_maintenance_update))
        .route(
            "/admin-maintenance-complete",
            post(admin_maintenance_complete),
        )
        .route("/admin-license-cleanup", post(admin_license_cleanup))
        .route("/admin-computers/{name}", get(admin_computer_details))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// GET /admin-requests
// ---------------------------------------------------------------------------

async fn admin_requests(
    State(svc): State<AppState>,
    Query(query): Query<RequestFilterQuery>,
) -> Result<Json<Value>, ServiceError> {
    let (requests, stats) = svc.admin_requests(query.filter.as_deref())?;
    Ok(ok_with_stats(requests, stats))
}

// ---------------------------------------------------------------------------
// POST /admin-approve
// ---------------------------------------------------------------------------

async fn admin_approve(
    State(svc): State<AppState>,
    Json(body): Json<ApproveBody>,
) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.approve_request(body)?))
}

// ---------------------------------------------------------------------------
// POST /admin-reject
// ---------------------------------------------------------------------------

async fn admin_reject(
    State(svc): State<AppState>,
    Json(body): Json<RejectBody>,
) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.reject_request(body)?))
}

// ---------------------------------------------------------------------------
// POST /admin-revoke
// ---------------------------------------------------------------------------

async fn admin_revoke(
    State(svc): State<AppState>,
    Json(body): Json<RevokeBody>,
) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.revoke_request(body)?))
}

// ---------------------------------------------------------------------------
// GET /admin-expired-usage
// ---------------------------------------------------------------------------

async fn admin_expired_usage(State(svc): State<AppState>) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.expired_usage()?))
}

// ---------------------------------------------------------------------------
// GET /admin-maintenance-list
// ---------------------------------------------------------------------------

async fn admin_maintenance_list(State(svc): State<AppState>) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.maintenance_list()?))
}

// ---------------------------------------------------------------------------
// POST /admin-maintenance-update
// ---------------------------------------------------------------------------

async fn admin_maintenance_update(
    State(svc): State<AppState>,
    Json(body): Json<MaintenanceProgressBody>,
) -> Result<Json<Value>, ServiceError> {
    svc.maintenance_progress(body)?;
    Ok(ok_message("maintenance progress recorded"))
}

// ---------------------------------------------------------------------------
// POST /admin-maintenance-complete
// ---------------------------------------------------------------------------

async fn admin_maintenance_complete(
    State(svc): State<AppState>,
    Json(body): Json<MaintenanceCompleteBody>,
) -> Result<Json<Value>, ServiceError> {
    svc.maintenance_complete(body)?;
    Ok(ok_message("maintenance completed"))
}

// ---------------------------------------------------------------------------
// POST /admin-license-cleanup
// ---------------------------------------------------------------------------

async fn admin_license_cleanup(
    State(svc): State<AppState>,
    Json(body): Json<MaintenanceCompleteBody>,
) -> Result<Json<Value>, ServiceError> {
    svc.license_cleanup(body)?;
    Ok(ok_message("license cleanup completed"))
}

// ---------------------------------------------------------------------------
// GET /admin-computers/:name
// ---------------------------------------------------------------------------

async fn admin_computer_details(
    State(svc): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.computer_details(&name)?))
}
