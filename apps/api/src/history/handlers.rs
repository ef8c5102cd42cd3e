use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::match_result::{HistoryStats, MatchResultRow};
use crate::routes::{Deleted, UserIdQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryListResponse {
    pub history: Vec<MatchResultRow>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItemResponse {
    pub match_result: MatchResultRow,
}

/// GET /api/history
pub async fn handle_list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryListResponse>, AppError> {
    if params.limit.is_some_and(|l| l < 1) {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }
    let history = state
        .repo
        .list_match_results(params.user_id, params.limit)
        .await?;
    Ok(Json(HistoryListResponse { history }))
}

/// GET /api/history/stats
pub async fn handle_history_stats(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<HistoryStats>, AppError> {
    Ok(Json(state.repo.history_stats(params.user_id).await?))
}

/// GET /api/history/:id
pub async fn handle_get_history_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<HistoryItemResponse>, AppError> {
    let match_result = state.repo.get_match_result(params.user_id, id).await?;
    Ok(Json(HistoryItemResponse { match_result }))
}

/// DELETE /api/history/:id
pub async fn handle_delete_history_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Deleted>, AppError> {
    state.repo.delete_match_result(params.user_id, id).await?;
    Ok(Json(Deleted::default()))
}
