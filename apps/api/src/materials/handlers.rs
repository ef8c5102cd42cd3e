//! Axum route handlers for application materials.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::materials::generator::{
    generate_material, DEFAULT_WORD_COUNT, MAX_WORD_COUNT, MIN_WORD_COUNT,
};
use crate::models::material::{MaterialRow, MaterialType};
use crate::models::opportunity::OpportunityDetails;
use crate::profile::require_profile;
use crate::routes::{Deleted, UserIdQuery};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateMaterialRequest {
    pub material_type: MaterialType,
    pub opportunity: OpportunityDetails,
    pub target_word_count: Option<u32>,
    pub opportunity_id: Option<Uuid>,
}

impl GenerateMaterialRequest {
    fn target_word_count(&self) -> Result<u32, AppError> {
        let target = self.target_word_count.unwrap_or(DEFAULT_WORD_COUNT);
        if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&target) {
            return Err(AppError::Validation(format!(
                "target_word_count must be between {MIN_WORD_COUNT} and {MAX_WORD_COUNT}, got {target}"
            )));
        }
        Ok(target)
    }
}

#[derive(Debug, Serialize)]
pub struct MaterialResponse {
    pub material: MaterialRow,
}

#[derive(Debug, Serialize)]
pub struct MaterialListResponse {
    pub materials: Vec<MaterialRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/materials/generate
///
/// Generates, persists and returns one material for the given opportunity.
pub async fn handle_generate_material(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(request): Json<GenerateMaterialRequest>,
) -> Result<Json<MaterialResponse>, AppError> {
    request.opportunity.validate()?;
    let target = request.target_word_count()?;
    let profile = require_profile(state.repo.as_ref(), params.user_id).await?;

    let material = generate_material(
        &state.llm,
        &profile,
        &request.opportunity,
        request.material_type,
        target,
    )
    .await?;

    let material = state
        .repo
        .save_material(
            params.user_id,
            &material,
            request.opportunity_id,
            Some(&request.opportunity.title),
        )
        .await?;

    Ok(Json(MaterialResponse { material }))
}

/// GET /api/materials
pub async fn handle_list_materials(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<MaterialListResponse>, AppError> {
    let materials = state.repo.list_materials(params.user_id).await?;
    Ok(Json(MaterialListResponse { materials }))
}

/// GET /api/materials/:id
pub async fn handle_get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<MaterialResponse>, AppError> {
    let material = state.repo.get_material(params.user_id, id).await?;
    Ok(Json(MaterialResponse { material }))
}

/// DELETE /api/materials/:id
pub async fn handle_delete_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Deleted>, AppError> {
    state.repo.delete_material(params.user_id, id).await?;
    Ok(Json(Deleted::default()))
}

/// GET /api/materials/:id/export
///
/// Plain-text download of the material content.
pub async fn handle_export_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let material = state.repo.get_material(params.user_id, id).await?;
    let disposition = format!(
        "attachment; filename=\"{}_{}.txt\"",
        material.material_type, material.id
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        material.content,
    ))
}
