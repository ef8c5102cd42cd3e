use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::repository::Repository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory in tests.
    pub repo: Arc<dyn Repository>,
    pub llm: LlmClient,
}
