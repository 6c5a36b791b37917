//! Health endpoints and the small demo API the sample rules protect.

use axum::{
    Json,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "routeguard",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

// ---- Demo API ----

pub async fn list_products() -> impl IntoResponse {
    let body = json!({
        "products": [
            { "id": "1", "name": "anvil" },
            { "id": "2", "name": "rocket skates" },
        ]
    });
    (StatusCode::OK, Json(body))
}

pub async fn update_product(
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let body = json!({
        "id": id,
        "updated": true,
        "product": payload,
    });
    (StatusCode::OK, Json(body))
}

pub async fn read_report(Path(id): Path<String>) -> impl IntoResponse {
    let body = json!({
        "id": id,
        "title": format!("Report {id}"),
    });
    (StatusCode::OK, Json(body))
}
