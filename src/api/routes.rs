//! API route definitions -- read-only projections over the history store.

use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::state::AppState;
use crate::scheduler::ExamResult;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/battery", get(battery_summary))
        .route("/exam/{name}", get(exam_last))
        .route("/exam/{name}/history", get(exam_history))
}

/// Liveness probe. Answers as soon as the process is up.
pub async fn healthz() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339()
        }
    }))
}

/// Every exam with recorded history, mapped to its most recent outcome.
async fn battery_summary(State(state): State<AppState>) -> Json<Value> {
    let summary: serde_json::Map<String, Value> = state
        .store
        .exams()
        .into_iter()
        .map(|(name, outcome)| (name, Value::String(outcome.as_str().to_string())))
        .collect();
    Json(Value::Object(summary))
}

/// The most recent result for one exam, or `null` when it has no
/// history. An exam that was never scheduled is indistinguishable from
/// one that has not recorded anything.
async fn exam_last(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Option<ExamResult>> {
    Json(state.store.last(&name))
}

/// Bounded history for one exam, most recent first. Empty when absent.
async fn exam_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Vec<ExamResult>> {
    Json(state.store.list(&name))
}
