use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::jobs::client::{JobPosting, SalaryEstimate};
use crate::jobs::JOB_CATEGORIES;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobSearchQuery {
    pub query: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SalaryQuery {
    pub role: String,
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_location() -> String {
    "Remote".to_string()
}

/// GET /api/v1/jobs/search
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<JobSearchQuery>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    if query.query.trim().is_empty() {
        return Err(AppError::Validation("query is required".to_string()));
    }

    let jobs = state
        .jobs
        .search(query.query.trim(), query.location.as_deref(), query.page)
        .await
        .map_err(|e| AppError::Upstream(format!("Job search failed: {e}")))?;

    Ok(Json(jobs))
}

/// GET /api/v1/jobs/salary?role=&location=
pub async fn handle_salary_estimate(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SalaryQuery>,
) -> Result<Json<Vec<SalaryEstimate>>, AppError> {
    if query.role.trim().is_empty() {
        return Err(AppError::Validation("role is required".to_string()));
    }

    let estimates = state
        .jobs
        .estimated_salary(query.role.trim(), query.location.trim())
        .await
        .map_err(|e| AppError::Upstream(format!("Salary lookup failed: {e}")))?;

    Ok(Json(estimates))
}

/// GET /api/v1/jobs/categories
pub async fn handle_job_categories() -> Json<Value> {
    Json(json!({ "categories": JOB_CATEGORIES }))
}
