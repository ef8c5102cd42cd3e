pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::handlers as history;
use crate::matching::handlers as matching;
use crate::materials::handlers as materials;
use crate::opportunities::handlers as opportunities;
use crate::profile::handlers as profile;
use crate::state::AppState;
use crate::strategy::handlers as strategy;

/// Caller identity, carried as `?user_id=`.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Body returned by every DELETE route.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

impl Default for Deleted {
    fn default() -> Self {
        Self { success: true }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile
        .route(
            "/api/profile",
            get(profile::handle_get_profile)
                .post(profile::handle_upsert_profile)
                .put(profile::handle_upsert_profile)
                .delete(profile::handle_delete_profile),
        )
        // Opportunities
        .route(
            "/api/opportunities",
            get(opportunities::handle_list_opportunities)
                .post(opportunities::handle_create_opportunity),
        )
        .route(
            "/api/opportunities/:id",
            get(opportunities::handle_get_opportunity)
                .put(opportunities::handle_update_opportunity)
                .delete(opportunities::handle_delete_opportunity),
        )
        .route(
            "/api/opportunities/:id/status",
            patch(opportunities::handle_set_status),
        )
        // Matching
        .route("/api/match/evaluate", post(matching::handle_evaluate))
        .route("/api/match/batch", post(matching::handle_batch_evaluate))
        // Strategy
        .route("/api/strategy/run", post(strategy::handle_run_strategy))
        // Materials
        .route(
            "/api/materials/generate",
            post(materials::handle_generate_material),
        )
        .route("/api/materials", get(materials::handle_list_materials))
        .route(
            "/api/materials/:id",
            get(materials::handle_get_material).delete(materials::handle_delete_material),
        )
        .route(
            "/api/materials/:id/export",
            get(materials::handle_export_material),
        )
        // History
        .route("/api/history", get(history::handle_list_history))
        .route("/api/history/stats", get(history::handle_history_stats))
        .route(
            "/api/history/:id",
            get(history::handle_get_history_item).delete(history::handle_delete_history_item),
        )
        .with_state(state)
}
