use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::evaluator::MatchEvaluation;
use crate::errors::AppError;
use crate::matching::{evaluate_batch, evaluate_single, validate_batch_ids, BatchEvaluation};
use crate::models::opportunity::OpportunityDetails;
use crate::opportunities::handlers::MANUAL_SOURCE;
use crate::profile::require_profile;
use crate::routes::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub opportunity: OpportunityDetails,
    #[serde(default)]
    pub save_opportunity: bool,
    pub opportunity_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub result: MatchEvaluation,
    pub match_result_id: Uuid,
    pub opportunity_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub opportunity_ids: Vec<Uuid>,
}

/// POST /api/match/evaluate
///
/// Scores an opportunity snapshot, optionally saving it first, and always
/// appends the result to history.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    request.opportunity.validate()?;
    let user_id = params.user_id;
    let profile = require_profile(state.repo.as_ref(), user_id).await?;

    let result = evaluate_single(&state.llm, &profile, &request.opportunity).await;

    let opportunity_id = match request.opportunity_id {
        Some(id) => Some(id),
        None if request.save_opportunity => Some(
            state
                .repo
                .create_opportunity(user_id, &request.opportunity, MANUAL_SOURCE)
                .await?
                .id,
        ),
        None => None,
    };

    let record = state
        .repo
        .save_match_result(user_id, &request.opportunity, &result, opportunity_id)
        .await?;

    Ok(Json(EvaluateResponse {
        result,
        match_result_id: record.id,
        opportunity_id,
    }))
}

/// POST /api/match/batch
pub async fn handle_batch_evaluate(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchEvaluation>, AppError> {
    validate_batch_ids(&request.opportunity_ids)?;
    let profile = require_profile(state.repo.as_ref(), params.user_id).await?;

    let batch = evaluate_batch(
        state.repo.as_ref(),
        &state.llm,
        params.user_id,
        &profile,
        &request.opportunity_ids,
    )
    .await?;

    Ok(Json(batch))
}
