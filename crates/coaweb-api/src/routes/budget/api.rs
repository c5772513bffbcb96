use crate::error::ApiResult;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use coaweb_core::VarianceResponse;

pub async fn api_variance(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> ApiResult<Json<VarianceResponse>> {
    Ok(Json(state.book.variance(&entity)?))
}
