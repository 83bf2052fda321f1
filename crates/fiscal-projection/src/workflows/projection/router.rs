use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::alert::AlertThreshold;
use super::domain::ClientSubmission;
use super::report::views::{LedgerSummary, LedgerView};
use super::session::{BatchReport, ProjectionSession, SubmissionOutcome};
use crate::error::AppError;

/// Session handle shared by every request of the HTTP service.
pub type SharedSession = Arc<Mutex<ProjectionSession>>;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub csv: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdPayload {
    pub threshold: f64,
}

/// Router builder exposing client scoring, ledger and alert configuration endpoints.
pub fn projection_router(session: SharedSession) -> Router {
    Router::new()
        .route(
            "/api/v1/clients",
            get(list_handler).post(submit_handler).delete(clear_handler),
        )
        .route("/api/v1/clients/import", post(import_handler))
        .route("/api/v1/clients/summary", get(summary_handler))
        .route(
            "/api/v1/alerts/threshold",
            get(threshold_handler).put(update_threshold_handler),
        )
        .with_state(session)
}

fn lock(session: &SharedSession) -> MutexGuard<'_, ProjectionSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) async fn submit_handler(
    State(session): State<SharedSession>,
    Json(submission): Json<ClientSubmission>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), AppError> {
    let outcome = lock(&session).submit(submission)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub(crate) async fn import_handler(
    State(session): State<SharedSession>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<BatchReport>, AppError> {
    let reader = Cursor::new(request.csv.into_bytes());
    let report = lock(&session).ingest_csv(reader)?;
    Ok(Json(report))
}

pub(crate) async fn list_handler(State(session): State<SharedSession>) -> Json<LedgerView> {
    Json(lock(&session).view())
}

pub(crate) async fn summary_handler(State(session): State<SharedSession>) -> Json<LedgerSummary> {
    Json(lock(&session).summary())
}

pub(crate) async fn clear_handler(State(session): State<SharedSession>) -> Json<Value> {
    let removed = lock(&session).clear();
    Json(json!({ "removed": removed }))
}

pub(crate) async fn threshold_handler(
    State(session): State<SharedSession>,
) -> Json<ThresholdPayload> {
    let threshold = lock(&session).threshold().value();
    Json(ThresholdPayload { threshold })
}

pub(crate) async fn update_threshold_handler(
    State(session): State<SharedSession>,
    Json(payload): Json<ThresholdPayload>,
) -> Result<Json<ThresholdPayload>, AppError> {
    let threshold = AlertThreshold::new(payload.threshold)?;
    lock(&session).set_threshold(threshold);
    Ok(Json(ThresholdPayload {
        threshold: threshold.value(),
    }))
}
