//! Uniform response envelope.
//!
//! Every operation answers `{success, data?, stats?, message?}`; errors
//! add a stable `code` (see [`crate::error`]). Handlers with bespoke
//! top-level fields (login tokens, request ids) build the envelope with
//! `serde_json::json!` directly.

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// `{"success": true, "data": ...}`
pub fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// `{"success": true, "message": ...}`
pub fn ok_message(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": true, "message": message.into() }))
}

/// `{"success": true, "data": ..., "stats": ...}`
pub fn ok_with_stats<T: Serialize, S: Serialize>(data: T, stats: S) -> Json<Value> {
    Json(json!({ "success": true, "data": data, "stats": stats }))
}
