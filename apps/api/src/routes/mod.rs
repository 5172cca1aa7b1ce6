pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::skill_paths::handlers as skill_path_handlers;
use crate::state::AppState;
use crate::{analytics, auth, chat, history, jobs, planner, quiz, resources, roadmap, tracking};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handlers::handle_register))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route("/api/v1/auth/me", get(auth::handlers::handle_me))
        .route(
            "/api/v1/auth/account",
            delete(auth::handlers::handle_delete_account),
        )
        // Roadmap generation
        .route(
            "/api/v1/roadmaps/generate",
            post(roadmap::handlers::handle_generate),
        )
        .route(
            "/api/v1/roadmaps/replan",
            post(roadmap::handlers::handle_replan),
        )
        // Skill paths
        .route(
            "/api/v1/skill-paths",
            get(skill_path_handlers::handle_list_paths)
                .post(skill_path_handlers::handle_create_path),
        )
        .route(
            "/api/v1/skill-paths/:id",
            get(skill_path_handlers::handle_get_path)
                .put(skill_path_handlers::handle_update_path)
                .delete(skill_path_handlers::handle_delete_path),
        )
        .route(
            "/api/v1/skill-paths/:id/regenerate-week",
            post(skill_path_handlers::handle_regenerate_week),
        )
        .route(
            "/api/v1/skill-paths/:id/export",
            get(skill_path_handlers::handle_export_path),
        )
        // Planner
        .route(
            "/api/v1/planner",
            get(planner::handlers::handle_list_tasks).post(planner::handlers::handle_create_task),
        )
        .route(
            "/api/v1/planner/week",
            get(planner::handlers::handle_week_view),
        )
        .route(
            "/api/v1/planner/shift-pending",
            post(planner::handlers::handle_shift_pending),
        )
        .route(
            "/api/v1/planner/:id",
            patch(planner::handlers::handle_update_task)
                .delete(planner::handlers::handle_delete_task),
        )
        // Tracking
        .route(
            "/api/v1/progress",
            post(tracking::handlers::handle_create_progress),
        )
        .route(
            "/api/v1/progress/:skill_path_id",
            get(tracking::handlers::handle_list_progress),
        )
        .route(
            "/api/v1/time-tracking",
            get(tracking::handlers::handle_list_sessions),
        )
        .route(
            "/api/v1/time-tracking/start",
            post(tracking::handlers::handle_start_session),
        )
        .route(
            "/api/v1/time-tracking/:id/end",
            put(tracking::handlers::handle_end_session),
        )
        // Analytics
        .route(
            "/api/v1/analytics",
            get(analytics::handlers::handle_path_stats),
        )
        .route(
            "/api/v1/analytics/suggestions",
            get(analytics::handlers::handle_suggestions),
        )
        .route(
            "/api/v1/dashboard",
            get(analytics::handlers::handle_dashboard),
        )
        // Quizzes
        .route("/api/v1/quizzes", get(quiz::handlers::handle_list_quizzes))
        .route(
            "/api/v1/quizzes/generate",
            post(quiz::handlers::handle_generate_quiz),
        )
        .route(
            "/api/v1/quizzes/attempts",
            get(quiz::handlers::handle_list_attempts),
        )
        .route(
            "/api/v1/quizzes/personalized",
            get(quiz::handlers::handle_personalized_quiz),
        )
        .route("/api/v1/quizzes/:id", get(quiz::handlers::handle_get_quiz))
        .route(
            "/api/v1/quizzes/:id/attempt",
            post(quiz::handlers::handle_attempt_quiz),
        )
        // Jobs
        .route(
            "/api/v1/jobs/search",
            get(jobs::handlers::handle_search_jobs),
        )
        .route(
            "/api/v1/jobs/salary",
            get(jobs::handlers::handle_salary_estimate),
        )
        .route(
            "/api/v1/jobs/categories",
            get(jobs::handlers::handle_job_categories),
        )
        // Resources
        .route(
            "/api/v1/resources",
            get(resources::handlers::handle_list_recommendations)
                .post(resources::handlers::handle_recommend_resources),
        )
        // History & chat
        .route(
            "/api/v1/history",
            get(history::handlers::handle_list_history)
                .delete(history::handlers::handle_clear_history),
        )
        .route(
            "/api/v1/history/export",
            get(history::handlers::handle_export_history),
        )
        .route("/api/v1/chat", post(chat::handlers::handle_chat))
        .with_state(state)
}
