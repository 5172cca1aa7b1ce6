//! JSearch (RapidAPI) client behind a trait seam so handlers can be
//! exercised against a stub.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const JSEARCH_BASE_URL: &str = "https://jsearch.p.rapidapi.com";
const JSEARCH_HOST: &str = "jsearch.p.rapidapi.com";
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum JobApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("Unexpected provider payload: {0}")]
    Payload(String),
}

/// A normalized job posting, independent of the provider's field names.
#[derive(Debug, Clone, Serialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub employer: String,
    pub location: String,
    pub employment_type: Option<String>,
    pub apply_link: Option<String>,
    pub posted_at: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryEstimate {
    pub publisher: String,
    pub job_title: String,
    pub location: String,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub median_salary: Option<f64>,
    pub currency: Option<String>,
    pub period: Option<String>,
}

#[async_trait]
pub trait JobSearchApi: Send + Sync {
    async fn search(
        &self,
        query: &str,
        location: Option<&str>,
        page: u32,
    ) -> Result<Vec<JobPosting>, JobApiError>;

    async fn estimated_salary(
        &self,
        job_title: &str,
        location: &str,
    ) -> Result<Vec<SalaryEstimate>, JobApiError>;
}

pub struct JSearchClient {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    job_id: String,
    job_title: String,
    #[serde(default)]
    employer_name: Option<String>,
    #[serde(default)]
    job_city: Option<String>,
    #[serde(default)]
    job_country: Option<String>,
    #[serde(default)]
    job_employment_type: Option<String>,
    #[serde(default)]
    job_apply_link: Option<String>,
    #[serde(default)]
    job_posted_at_datetime_utc: Option<String>,
    #[serde(default)]
    job_min_salary: Option<f64>,
    #[serde(default)]
    job_max_salary: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SalaryResponse {
    #[serde(default)]
    data: Vec<RawSalary>,
}

#[derive(Debug, Deserialize)]
struct RawSalary {
    #[serde(default)]
    publisher_name: Option<String>,
    job_title: String,
    location: String,
    #[serde(default)]
    min_salary: Option<f64>,
    #[serde(default)]
    max_salary: Option<f64>,
    #[serde(default)]
    median_salary: Option<f64>,
    #[serde(default)]
    salary_currency: Option<String>,
    #[serde(default)]
    salary_period: Option<String>,
}

impl From<RawJob> for JobPosting {
    fn from(raw: RawJob) -> Self {
        let location = match (raw.job_city, raw.job_country) {
            (Some(city), Some(country)) => format!("{city}, {country}"),
            (Some(city), None) => city,
            (None, Some(country)) => country,
            (None, None) => "Remote".to_string(),
        };
        JobPosting {
            id: raw.job_id,
            title: raw.job_title,
            employer: raw.employer_name.unwrap_or_else(|| "Unknown".to_string()),
            location,
            employment_type: raw.job_employment_type,
            apply_link: raw.job_apply_link,
            posted_at: raw.job_posted_at_datetime_utc,
            min_salary: raw.job_min_salary,
            max_salary: raw.job_max_salary,
        }
    }
}

impl From<RawSalary> for SalaryEstimate {
    fn from(raw: RawSalary) -> Self {
        SalaryEstimate {
            publisher: raw.publisher_name.unwrap_or_else(|| "Unknown".to_string()),
            job_title: raw.job_title,
            location: raw.location,
            min_salary: raw.min_salary,
            max_salary: raw.max_salary,
            median_salary: raw.median_salary,
            currency: raw.salary_currency,
            period: raw.salary_period,
        }
    }
}

impl JSearchClient {
    pub fn new(api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        JSearchClient { http, api_key }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, JobApiError> {
        let url = format!("{JSEARCH_BASE_URL}{path}");
        debug!("Job provider request: {path}");

        let response = self
            .http
            .get(&url)
            .query(params)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", JSEARCH_HOST)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JobApiError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| JobApiError::Payload(e.to_string()))
    }
}

#[async_trait]
impl JobSearchApi for JSearchClient {
    async fn search(
        &self,
        query: &str,
        location: Option<&str>,
        page: u32,
    ) -> Result<Vec<JobPosting>, JobApiError> {
        let full_query = match location {
            Some(location) if !location.trim().is_empty() => format!("{query} in {location}"),
            _ => query.to_string(),
        };
        let page = page.max(1).to_string();
        let params = [
            ("query", full_query.as_str()),
            ("page", page.as_str()),
            ("num_pages", "1"),
        ];

        let response: SearchResponse = self.get("/search", &params).await?;
        Ok(response.data.into_iter().map(JobPosting::from).collect())
    }

    async fn estimated_salary(
        &self,
        job_title: &str,
        location: &str,
    ) -> Result<Vec<SalaryEstimate>, JobApiError> {
        let params = [
            ("job_title", job_title),
            ("location", location),
            ("location_type", "ANY"),
        ];

        let response: SalaryResponse = self.get("/estimated-salary", &params).await?;
        Ok(response.data.into_iter().map(SalaryEstimate::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_job_normalization() {
        let raw: RawJob = serde_json::from_str(
            r#"{
                "job_id": "abc123",
                "job_title": "Rust Engineer",
                "employer_name": "Acme",
                "job_city": "Berlin",
                "job_country": "DE",
                "job_min_salary": 70000.0
            }"#,
        )
        .unwrap();
        let job = JobPosting::from(raw);
        assert_eq!(job.location, "Berlin, DE");
        assert_eq!(job.employer, "Acme");
        assert_eq!(job.min_salary, Some(70000.0));
        assert!(job.apply_link.is_none());
    }

    #[test]
    fn test_missing_location_defaults_to_remote() {
        let raw: RawJob =
            serde_json::from_str(r#"{"job_id": "x", "job_title": "Dev"}"#).unwrap();
        let job = JobPosting::from(raw);
        assert_eq!(job.location, "Remote");
        assert_eq!(job.employer, "Unknown");
    }

    #[test]
    fn test_search_response_tolerates_missing_data() {
        let response: SearchResponse = serde_json::from_str(r#"{"status": "OK"}"#).unwrap();
        assert!(response.data.is_empty());
    }

    #[test]
    fn test_raw_salary_normalization() {
        let raw: RawSalary = serde_json::from_str(
            r#"{
                "publisher_name": "Glassdoor",
                "job_title": "Data Scientist",
                "location": "Remote",
                "median_salary": 120000.0,
                "salary_currency": "USD",
                "salary_period": "YEAR"
            }"#,
        )
        .unwrap();
        let estimate = SalaryEstimate::from(raw);
        assert_eq!(estimate.publisher, "Glassdoor");
        assert_eq!(estimate.median_salary, Some(120000.0));
        assert_eq!(estimate.period.as_deref(), Some("YEAR"));
    }
}
