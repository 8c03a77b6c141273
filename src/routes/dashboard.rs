use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::authz::Caller;
use crate::errors::AppResult;
use crate::reports::{dashboard_totals, DashboardStats};

#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "Dashboard",
    responses((status = 200, description = "Registry totals", body = DashboardStats))
)]
pub async fn stats(State(state): State<AppState>, _caller: Caller) -> AppResult<Json<DashboardStats>> {
    Ok(Json(dashboard_totals(&state.pool).await?))
}
