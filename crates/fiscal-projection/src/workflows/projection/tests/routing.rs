use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::workflows::projection::projection_router;
use crate::workflows::projection::router::{
    submit_handler, update_threshold_handler, ThresholdPayload,
};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn submit_handler_returns_created_with_alert() {
    let state = shared(session());

    let response = submit_handler(
        State(state.clone()),
        axum::Json(submission("Andes SRL", 120_000.0)),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["client"]["name"], "Andes SRL");
    assert_eq!(body["client"]["projection"], 120_000.0);
    assert_eq!(body["features"]["tipo_cliente_Persona Física"], 1.0);
    assert_eq!(body["alert"]["threshold"], 100_000.0);
}

#[tokio::test]
async fn submit_handler_rejects_unknown_tags() {
    let state = shared(session());
    let mut invalid = submission("Andes SRL", 1_000.0);
    invalid.tax_types = vec!["Tasa Municipal".to_string()];

    let response = submit_handler(State(state), axum::Json(invalid))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("Tasa Municipal")));
}

#[tokio::test]
async fn submit_without_model_is_service_unavailable() {
    let router = projection_router(shared(degraded_session()));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/clients",
            serde_json::to_value(submission("Ana", 1.0)).expect("serializes"),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn import_route_reports_partial_success() {
    let state = shared(session());
    let router = projection_router(state.clone());
    let csv = sheet(&[
        "Ana,50000,0,0,Autónomo,Monotributo,,",
        "Cooperativa,1,0,0,Cooperativa,,,",
    ]);

    let response = router
        .oneshot(json_request("POST", "/api/v1/clients/import", json!({ "csv": csv })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["ingested"], 1);
    assert_eq!(body["failures"][0]["kind"], "schema_mismatch");
    assert_eq!(state.lock().expect("session lock").ledger().len(), 1);
}

#[tokio::test]
async fn import_route_rejects_missing_columns() {
    let router = projection_router(shared(session()));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/clients/import",
            json!({ "csv": "Cliente,Ingreso\nAna,1\n" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("Deduccion")));
}

#[tokio::test]
async fn list_and_summary_reflect_ledger() {
    let mut seeded = session();
    seeded.submit(submission("Ana", 10_000.0)).expect("scores");
    seeded.submit(submission("Bruno", 200_000.0)).expect("scores");
    let state = shared(seeded);

    let list = projection_router(state.clone())
        .oneshot(empty_request("GET", "/api/v1/clients"))
        .await
        .expect("router responds");
    let list = read_json_body(list).await;
    assert_eq!(list["alerting"], 1);
    assert_eq!(list["clients"][1]["name"], "Bruno");
    assert_eq!(list["clients"][1]["tax_types"], "IVA");

    let summary = projection_router(state)
        .oneshot(empty_request("GET", "/api/v1/clients/summary"))
        .await
        .expect("router responds");
    let summary = read_json_body(summary).await;
    assert_eq!(summary["clients"], 2);
    assert_eq!(summary["histogram"].as_array().map(Vec::len), Some(10));
    assert_eq!(summary["category_means"][0]["mean_projection"], 105_000.0);
}

#[tokio::test]
async fn delete_route_clears_ledger() {
    let mut seeded = session();
    seeded.submit(submission("Ana", 10_000.0)).expect("scores");
    let state = shared(seeded);

    let response = projection_router(state.clone())
        .oneshot(empty_request("DELETE", "/api/v1/clients"))
        .await
        .expect("router responds");

    let body = read_json_body(response).await;
    assert_eq!(body["removed"], 1);
    assert!(state.lock().expect("session lock").ledger().is_empty());
}

#[tokio::test]
async fn threshold_routes_read_and_update() {
    let state = shared(session());

    let current = projection_router(state.clone())
        .oneshot(empty_request("GET", "/api/v1/alerts/threshold"))
        .await
        .expect("router responds");
    assert_eq!(read_json_body(current).await["threshold"], 100_000.0);

    let updated = projection_router(state.clone())
        .oneshot(json_request(
            "PUT",
            "/api/v1/alerts/threshold",
            json!({ "threshold": 250_000.0 }),
        ))
        .await
        .expect("router responds");
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(
        state.lock().expect("session lock").threshold().value(),
        250_000.0
    );
}

#[tokio::test]
async fn negative_threshold_is_rejected() {
    let state = shared(session());

    let response = update_threshold_handler(
        State(state.clone()),
        axum::Json(ThresholdPayload { threshold: -1.0 }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        state.lock().expect("session lock").threshold().value(),
        100_000.0
    );
}
