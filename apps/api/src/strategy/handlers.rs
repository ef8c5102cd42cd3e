use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::require_profile;
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::strategy::{
    run_strategy, score_from_history, score_selected, StrategyResult, RECENT_HISTORY_WINDOW,
    SCORE_LOOKUP_WINDOW,
};

#[derive(Debug, Default, Deserialize)]
pub struct StrategyRequest {
    #[serde(default)]
    pub opportunity_ids: Option<Vec<Uuid>>,
}

/// POST /api/strategy/run
///
/// With `opportunity_ids`, plans for those opportunities using their latest
/// scores. Without, plans for the most recently evaluated ones.
pub async fn handle_run_strategy(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(request): Json<StrategyRequest>,
) -> Result<Json<StrategyResult>, AppError> {
    let user_id = params.user_id;
    let profile = require_profile(state.repo.as_ref(), user_id).await?;

    let opportunities = match request.opportunity_ids.filter(|ids| !ids.is_empty()) {
        Some(ids) => {
            let all = state.repo.list_opportunities(user_id, None).await?;
            let history = state
                .repo
                .list_match_results(user_id, Some(SCORE_LOOKUP_WINDOW))
                .await?;
            score_selected(all, &ids, &history)
        }
        None => {
            let history = state
                .repo
                .list_match_results(user_id, Some(RECENT_HISTORY_WINDOW))
                .await?;
            let all = state.repo.list_opportunities(user_id, None).await?;
            score_from_history(&history, all)
        }
    };

    Ok(Json(run_strategy(&state.llm, &profile, &opportunities).await))
}
