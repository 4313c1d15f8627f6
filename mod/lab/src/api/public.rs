use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::debug;

use labkom_core::ServiceError;
use labkom_core::envelope::{ok, ok_message};

use crate::model::{
    AvailableQuery, CheckRestrictionsBody, InitialDataQuery, QuisionerBody, SubmitRequestBody,
    UploadedFile,
};
use crate::service::LabService;

type AppState = Arc<LabService>;

/// Transport cap for the submission body. Generous over the policy's
/// upload limit so oversize files get the policy's validation message
/// instead of a bare 413.
const MAX_SUBMIT_BYTES: usize = 8 * 1024 * 1024;

pub fn router(service: Arc<LabService>) -> Router {
    Router::new()
        .route("/initial-data", get(initial_data))
        .route("/branding", get(branding))
        .route("/check-restrictions", post(check_restrictions))
        .route("/computers-available", get(computers_available))
        .route(
            "/submit-request",
            post(submit_request).layer(DefaultBodyLimit::max(MAX_SUBMIT_BYTES)),
        )
        .route("/submit-quisioner", post(submit_quisioner))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// GET /initial-data
// ---------------------------------------------------------------------------

async fn initial_data(
    State(svc): State<AppState>,
    Query(query): Query<InitialDataQuery>,
) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.initial_data(query)?))
}

// ---------------------------------------------------------------------------
// GET /branding
// ---------------------------------------------------------------------------

async fn branding(State(svc): State<AppState>) -> Json<Value> {
    ok(svc.branding())
}

// ---------------------------------------------------------------------------
// POST /check-restrictions
// ---------------------------------------------------------------------------

async fn check_restrictions(
    State(svc): State<AppState>,
    Json(body): Json<CheckRestrictionsBody>,
) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.check_restrictions(body)?))
}

// ---------------------------------------------------------------------------
// GET /computers-available
// ---------------------------------------------------------------------------

async fn computers_available(
    State(svc): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Value>, ServiceError> {
    Ok(ok(svc.available_computers(query.room.as_deref())?))
}

// ---------------------------------------------------------------------------
// POST /submit-request
// ---------------------------------------------------------------------------

/// One atomic submission. A plain JSON body carries a link document; a
/// multipart form carries the same JSON in its `payload` field plus the
/// file in `surat`.
async fn submit_request(
    State(svc): State<AppState>,
    req: Request,
) -> Result<Json<Value>, ServiceError> {
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let (body, upload) = if is_multipart {
        read_submission_form(req).await?
    } else {
        let Json(body) = Json::<SubmitRequestBody>::from_request(req, &())
            .await
            .map_err(|e| ServiceError::Validation(format!("invalid request body: {e}")))?;
        (body, None)
    };

    let receipt = svc.submit_request(body, upload)?;

    let mut payload = json!({
        "success": true,
        "requestId": receipt.request_id,
        "accessType": receipt.access_type,
    });
    if !receipt.document_stored {
        payload["message"] =
            json!("request recorded, but the supporting document could not be stored; contact the lab admin");
    }
    Ok(Json(payload))
}

/// Pull the `payload` JSON and the optional `surat` file out of a
/// multipart submission.
async fn read_submission_form(
    req: Request,
) -> Result<(SubmitRequestBody, Option<UploadedFile>), ServiceError> {
    let mut form = Multipart::from_request(req, &())
        .await
        .map_err(|e| ServiceError::Validation(format!("invalid multipart form: {e}")))?;

    let mut body: Option<SubmitRequestBody> = None;
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("unreadable multipart field: {e}")))?
    {
        match field.name().unwrap_or("") {
            "payload" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServiceError::Validation(format!("unreadable payload: {e}")))?;
                body = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| ServiceError::Validation(format!("invalid payload: {e}")))?,
                );
            }
            "surat" => {
                let file_name = field.file_name().unwrap_or("surat").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::Validation(format!("unreadable file: {e}")))?;
                upload = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            other => debug!("ignoring multipart field {other:?}"),
        }
    }

    let body =
        body.ok_or_else(|| ServiceError::Validation("payload field is required".to_string()))?;
    Ok((body, upload))
}

// ---------------------------------------------------------------------------
// POST /submit-quisioner
// ---------------------------------------------------------------------------

async fn submit_quisioner(
    State(svc): State<AppState>,
    Json(body): Json<QuisionerBody>,
) -> Result<Json<Value>, ServiceError> {
    svc.submit_quisioner(body)?;
    Ok(ok_message("questionnaire recorded"))
}
