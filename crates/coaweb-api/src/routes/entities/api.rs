use crate::error::ApiResult;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use coaweb_core::{EntitySummary, HierarchyAnomaly, ReloadSummary};

pub async fn api_entities(State(state): State<AppState>) -> Json<Vec<EntitySummary>> {
    Json(state.book.entities())
}

pub async fn api_anomalies(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> ApiResult<Json<Vec<HierarchyAnomaly>>> {
    Ok(Json(state.book.anomalies(&entity)?))
}

/// Reload every entity from its source
pub async fn api_reload(State(state): State<AppState>) -> Json<ReloadSummary> {
    let summary = state.book.reload().await;
    log::info!(
        "Reload finished: {} loaded, {} failed",
        summary.loaded.len(),
        summary.failed.len()
    );
    Json(summary)
}
