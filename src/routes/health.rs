use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const WELCOME_TEXT: &str = "Welcome to the Zoestore website.";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthData {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome text", body = String),
    ),
    tag = "Health"
)]
pub async fn welcome() -> &'static str {
    WELCOME_TEXT
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = HealthData),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
    })
}
