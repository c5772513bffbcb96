//! Accounts API endpoints - flat list, visible tree and toggle command

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use coaweb_core::{AccountId, AccountsResponse, ToggleResponse, TreeResponse};
use serde::Deserialize;

/// Tree session selector, `?session=<name>`
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub session: Option<String>,
}

impl SessionQuery {
    /// Session name, falling back to the configured default
    pub fn resolve(&self, state: &AppState) -> ApiResult<String> {
        let session = match self.session.as_deref().map(str::trim) {
            None | Some("") => return Ok(state.config.view.default_session.clone()),
            Some(s) => s,
        };
        if session.len() > 64 || !session.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(ApiError::BadRequest {
                message: format!("invalid session name '{}'", session),
            });
        }
        Ok(session.to_string())
    }
}

pub async fn api_accounts(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> ApiResult<Json<AccountsResponse>> {
    Ok(Json(state.book.account_views(&entity)?))
}

pub async fn api_tree(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<TreeResponse>> {
    let session = query.resolve(&state)?;
    Ok(Json(state.book.tree(&session, &entity)?))
}

pub async fn api_toggle(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, AccountId)>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<ToggleResponse>> {
    let session = query.resolve(&state)?;
    Ok(Json(state.book.toggle_tree(&session, &entity, id)?))
}

pub async fn api_collapse(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<TreeResponse>> {
    let session = query.resolve(&state)?;
    state.book.collapse_all(&session, &entity)?;
    Ok(Json(state.book.tree(&session, &entity)?))
}
