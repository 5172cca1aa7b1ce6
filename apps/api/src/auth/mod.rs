//! Bearer-token authentication: locally issued HS256 JWTs plus the Axum
//! extractor that every owner-scoped handler takes as its first argument.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub mod handlers;

/// Token lifetime. There is no refresh flow; 30 days keeps clients from
/// re-authenticating constantly without issuing tokens that never expire.
const TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
}

/// Issues a signed token for a user.
pub fn issue_token(user_id: Uuid, email: &str, secret: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {e}")))
}

/// Verifies a token signature and expiry, returning the claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The authenticated caller, extracted from the bearer token.
/// Handlers taking `AuthUser` reject unauthenticated requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized)?;

        let claims = verify_token(token, &state.config.jwt_secret)?;
        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "a@b.com", SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token(Uuid::new_v4(), "a@b.com", SECRET).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token("not.a.jwt", SECRET).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("abc123"), None);
    }

    mod extractor {
        use super::*;
        use axum::body::Body;
        use axum::http::{header, Request, StatusCode};
        use axum::routing::get;
        use axum::Router;
        use std::sync::Arc;
        use tower::ServiceExt;

        use crate::config::Config;
        use crate::jobs::client::{
            JobApiError, JobPosting, JobSearchApi, SalaryEstimate,
        };
        use crate::llm_client::LlmClient;
        use crate::state::AppState;

        struct NoopJobs;

        #[async_trait]
        impl JobSearchApi for NoopJobs {
            async fn search(
                &self,
                _query: &str,
                _location: Option<&str>,
                _page: u32,
            ) -> Result<Vec<JobPosting>, JobApiError> {
                Ok(Vec::new())
            }

            async fn estimated_salary(
                &self,
                _job_title: &str,
                _location: &str,
            ) -> Result<Vec<SalaryEstimate>, JobApiError> {
                Ok(Vec::new())
            }
        }

        fn test_state() -> AppState {
            let config = Config {
                database_url: "postgres://localhost/unused".to_string(),
                groq_api_key: "test-key".to_string(),
                jsearch_api_key: "test-key".to_string(),
                jwt_secret: SECRET.to_string(),
                port: 0,
                rust_log: "info".to_string(),
            };
            AppState {
                // connect_lazy never touches the network
                db: sqlx::postgres::PgPoolOptions::new()
                    .connect_lazy(&config.database_url)
                    .expect("lazy pool"),
                llm: LlmClient::new(config.groq_api_key.clone()),
                jobs: Arc::new(NoopJobs),
                config,
            }
        }

        async fn whoami(auth: AuthUser) -> String {
            auth.email
        }

        fn app() -> Router {
            Router::new()
                .route("/whoami", get(whoami))
                .with_state(test_state())
        }

        #[tokio::test]
        async fn test_missing_header_rejected() {
            let response = app()
                .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn test_valid_token_accepted() {
            let token = issue_token(Uuid::new_v4(), "a@b.com", SECRET).unwrap();
            let response = app()
                .oneshot(
                    Request::get("/whoami")
                        .header(header::AUTHORIZATION, format!("Bearer {token}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn test_tampered_token_rejected() {
            let token = issue_token(Uuid::new_v4(), "a@b.com", "other-secret").unwrap();
            let response = app()
                .oneshot(
                    Request::get("/whoami")
                        .header(header::AUTHORIZATION, format!("Bearer {token}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
