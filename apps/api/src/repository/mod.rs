//! Repository interface consumed by the controllers and the batch evaluator.
//!
//! Carried in `AppState` as `Arc<dyn Repository>` so tests can swap in an
//! in-memory store. Every lookup is scoped to the calling user: a row owned
//! by someone else is reported as `AppError::NotFound`, same as a missing one.

use async_trait::async_trait;
use uuid::Uuid;

use crate::agents::evaluator::MatchEvaluation;
use crate::errors::AppError;
use crate::materials::generator::GeneratedMaterial;
use crate::models::match_result::{HistoryStats, MatchResultRow};
use crate::models::material::MaterialRow;
use crate::models::opportunity::{
    ApplicationStatus, Opportunity, OpportunityDetails, OpportunityPatch, OpportunityStatusRow,
};
use crate::models::profile::{Profile, ProfileInput};

pub mod postgres;

#[async_trait]
pub trait Repository: Send + Sync {
    // Profiles
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;
    async fn upsert_profile(&self, user_id: Uuid, input: &ProfileInput)
        -> Result<Profile, AppError>;
    async fn delete_profile(&self, user_id: Uuid) -> Result<(), AppError>;

    // Opportunities
    /// Newest first. `query` filters title, type and description, case-insensitively.
    async fn list_opportunities(
        &self,
        user_id: Uuid,
        query: Option<&str>,
    ) -> Result<Vec<Opportunity>, AppError>;
    async fn get_opportunity(&self, user_id: Uuid, id: Uuid) -> Result<Opportunity, AppError>;
    async fn create_opportunity(
        &self,
        user_id: Uuid,
        details: &OpportunityDetails,
        source: &str,
    ) -> Result<Opportunity, AppError>;
    async fn update_opportunity(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &OpportunityPatch,
    ) -> Result<Opportunity, AppError>;
    async fn delete_opportunity(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError>;
    async fn set_opportunity_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<OpportunityStatusRow, AppError>;

    // Match history
    async fn save_match_result(
        &self,
        user_id: Uuid,
        snapshot: &OpportunityDetails,
        evaluation: &MatchEvaluation,
        opportunity_id: Option<Uuid>,
    ) -> Result<MatchResultRow, AppError>;
    /// Newest first.
    async fn list_match_results(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<MatchResultRow>, AppError>;
    async fn get_match_result(&self, user_id: Uuid, id: Uuid) -> Result<MatchResultRow, AppError>;
    async fn delete_match_result(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError>;
    async fn history_stats(&self, user_id: Uuid) -> Result<HistoryStats, AppError>;

    // Application materials
    async fn save_material(
        &self,
        user_id: Uuid,
        material: &GeneratedMaterial,
        opportunity_id: Option<Uuid>,
        opportunity_title: Option<&str>,
    ) -> Result<MaterialRow, AppError>;
    /// Newest first.
    async fn list_materials(&self, user_id: Uuid) -> Result<Vec<MaterialRow>, AppError>;
    async fn get_material(&self, user_id: Uuid, id: Uuid) -> Result<MaterialRow, AppError>;
    async fn delete_material(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError>;
}
