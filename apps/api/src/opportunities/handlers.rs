use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::opportunity::{
    ApplicationStatus, Opportunity, OpportunityDetails, OpportunityPatch, OpportunityStatusRow,
};
use crate::routes::{Deleted, UserIdQuery};
use crate::state::AppState;

/// Source recorded for opportunities entered through the API.
pub const MANUAL_SOURCE: &str = "manual";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Uuid,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub struct OpportunityListResponse {
    pub opportunities: Vec<Opportunity>,
}

#[derive(Debug, Serialize)]
pub struct OpportunityResponse {
    pub opportunity: Opportunity,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: OpportunityStatusRow,
    /// The opportunity with its updated pipeline status.
    pub opportunity: Opportunity,
}

/// GET /api/opportunities?q=
pub async fn handle_list_opportunities(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<OpportunityListResponse>, AppError> {
    let query = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let opportunities = state.repo.list_opportunities(params.user_id, query).await?;
    Ok(Json(OpportunityListResponse { opportunities }))
}

/// GET /api/opportunities/:id
pub async fn handle_get_opportunity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<OpportunityResponse>, AppError> {
    let opportunity = state.repo.get_opportunity(params.user_id, id).await?;
    Ok(Json(OpportunityResponse { opportunity }))
}

/// POST /api/opportunities
pub async fn handle_create_opportunity(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(details): Json<OpportunityDetails>,
) -> Result<(StatusCode, Json<OpportunityResponse>), AppError> {
    details.validate()?;
    let opportunity = state
        .repo
        .create_opportunity(params.user_id, &details, MANUAL_SOURCE)
        .await?;
    Ok((StatusCode::CREATED, Json(OpportunityResponse { opportunity })))
}

/// PUT /api/opportunities/:id
pub async fn handle_update_opportunity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(patch): Json<OpportunityPatch>,
) -> Result<Json<OpportunityResponse>, AppError> {
    patch.validate()?;
    let opportunity = state
        .repo
        .update_opportunity(params.user_id, id, &patch)
        .await?;
    Ok(Json(OpportunityResponse { opportunity }))
}

/// DELETE /api/opportunities/:id
pub async fn handle_delete_opportunity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Deleted>, AppError> {
    state.repo.delete_opportunity(params.user_id, id).await?;
    Ok(Json(Deleted::default()))
}

/// PATCH /api/opportunities/:id/status
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = state
        .repo
        .set_opportunity_status(params.user_id, id, request.status)
        .await?;
    let opportunity = state.repo.get_opportunity(params.user_id, id).await?;
    Ok(Json(StatusResponse {
        status,
        opportunity,
    }))
}
