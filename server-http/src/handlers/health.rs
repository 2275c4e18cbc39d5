use crate::api::{HealthResponse, HomeResponse};
use axum::Json;

/// GET /
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        hello: "world".into(),
    })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "OK".into(),
    })
}
