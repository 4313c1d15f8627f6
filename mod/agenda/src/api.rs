use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

use labkom_core::ServiceError;
use labkom_core::envelope::{ok, ok_message};

use crate::model::{AgendaIdBody, SaveAgendaBody};
use crate::service::AgendaService;

type AppState = Arc<AgendaService>;

pub fn router(service: Arc<AgendaService>) -> Router {
    Router::new()
        .route("/admin-agendas", get(admin_agendas))
        .route("/admin-save-agenda", post(admin_save_agenda))
        .route("/admin-delete-agenda", post(admin_delete_agenda))
        .route("/admin-broadcast-agenda", post(admin_broadcast_agenda))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// GET /admin-agendas
// ---------------------------------------------------------------------------

async fn admin_agendas(State(svc): State<AppState>) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.list_agendas()?))
}

// ---------------------------------------------------------------------------
// POST /admin-save-agenda
// ---------------------------------------------------------------------------

async fn admin_save_agenda(
    State(svc): State<AppState>,
    Json(body): Json<SaveAgendaBody>,
) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.save_agenda(body)?))
}

// ---------------------------------------------------------------------------
// POST /admin-delete-agenda
// ---------------------------------------------------------------------------

async fn admin_delete_agenda(
    State(svc): State<AppState>,
    Json(body): Json<AgendaIdBody>,
) -> Result<Json<Value>, ServiceError> {
    svc.delete_agenda(&body.id)?;
    Ok(ok_message("agenda deleted"))
}

// ---------------------------------------------------------------------------
// POST /admin-broadcast-agenda
// ---------------------------------------------------------------------------

async fn admin_broadcast_agenda(
    State(svc): State<AppState>,
    Json(body): Json<AgendaIdBody>,
) -> Result<Json<Value>, ServiceError> {
    svc.broadcast_agenda(&body.id)?;
    Ok(ok_message("reminder sent"))
}
