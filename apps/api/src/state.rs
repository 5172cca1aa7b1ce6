use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::jobs::client::JobSearchApi;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Pluggable job-search backend. Production: JSearchClient over RapidAPI.
    pub jobs: Arc<dyn JobSearchApi>,
    pub config: Config,
}
