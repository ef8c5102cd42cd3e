use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileInput};
use crate::routes::{Deleted, UserIdQuery};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Option<Profile>,
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.repo.get_profile(params.user_id).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// POST or PUT /api/profile
///
/// Creates or replaces the caller's profile.
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<ProfileResponse>, AppError> {
    input.validate()?;
    let profile = state.repo.upsert_profile(params.user_id, &input).await?;
    Ok(Json(ProfileResponse {
        profile: Some(profile),
    }))
}

/// DELETE /api/profile
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Deleted>, AppError> {
    state.repo.delete_profile(params.user_id).await?;
    Ok(Json(Deleted::default()))
}
