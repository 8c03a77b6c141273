use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::app::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    pub db_ok: bool,
    pub db_error: Option<String>,
}

impl HealthResponse {
    fn from_probe(probe: Result<(), sqlx::Error>) -> Self {
        match probe {
            Ok(()) => Self {
                status: "ok",
                db_ok: true,
                db_error: None,
            },
            Err(err) => Self {
                status: "degraded",
                db_ok: false,
                db_error: Some(err.to_string()),
            },
        }
    }
}

async fn probe(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Service and storage status", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let response = HealthResponse::from_probe(probe(&state.pool).await);
    if !response.db_ok {
        tracing::warn!(error = ?response.db_error, "health probe failed");
    }
    Json(response)
}
