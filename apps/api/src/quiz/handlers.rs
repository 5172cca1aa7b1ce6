use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::history::record_history;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, LEARNING_COACH_SYSTEM};
use crate::models::quiz::{QuizAttemptRow, QuizQuestionRow, QuizRow};
use crate::quiz::prompts::QUIZ_PROMPT_TEMPLATE;
use crate::quiz::score_answers;
use crate::state::AppState;

const DEFAULT_NUM_QUESTIONS: u32 = 5;
const MAX_NUM_QUESTIONS: u32 = 20;
const DIFFICULTIES: &[&str] = &["beginner", "intermediate", "advanced"];

#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub topic: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

fn default_num_questions() -> u32 {
    DEFAULT_NUM_QUESTIONS
}

#[derive(Debug, Deserialize)]
pub struct AttemptRequest {
    /// Map of question id → chosen option text.
    pub answers: HashMap<Uuid, String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct_option: String,
    #[serde(default)]
    skill_tag: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuiz {
    title: String,
    questions: Vec<GeneratedQuestion>,
}

/// Question shape served to clients: no answer key.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub options: Value,
    pub skill_tag: String,
}

impl From<QuizQuestionRow> for PublicQuestion {
    fn from(row: QuizQuestionRow) -> Self {
        PublicQuestion {
            id: row.id,
            question_text: row.question_text,
            options: row.options,
            skill_tag: row.skill_tag,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    #[serde(flatten)]
    pub quiz: QuizRow,
    pub questions: Vec<PublicQuestion>,
}

async fn get_owned_quiz(
    db: &sqlx::PgPool,
    quiz_id: Uuid,
    user_id: Uuid,
) -> Result<QuizRow, AppError> {
    sqlx::query_as::<_, QuizRow>("SELECT * FROM quizzes WHERE id = $1 AND user_id = $2")
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {quiz_id} not found")))
}

async fn generate_and_store_quiz(
    state: &AppState,
    user_id: Uuid,
    topic: &str,
    difficulty: &str,
    num_questions: u32,
) -> Result<QuizResponse, AppError> {
    let prompt = QUIZ_PROMPT_TEMPLATE
        .replace("{num_questions}", &num_questions.to_string())
        .replace("{topic}", topic)
        .replace("{difficulty}", difficulty);
    let system = format!("{LEARNING_COACH_SYSTEM} {JSON_ONLY_INSTRUCTION}");

    let generated: GeneratedQuiz = state
        .llm
        .call_json(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Quiz generation failed: {e}")))?;

    // A quiz without scorable questions is useless; reject instead of storing.
    let questions: Vec<&GeneratedQuestion> = generated
        .questions
        .iter()
        .filter(|q| {
            let valid = q.options.len() == 4 && q.options.contains(&q.correct_option);
            if !valid {
                warn!("Dropping malformed generated question: {:?}", q.question);
            }
            valid
        })
        .collect();
    if questions.is_empty() {
        return Err(AppError::Llm(
            "Quiz generation returned no usable questions".to_string(),
        ));
    }

    let quiz = sqlx::query_as::<_, QuizRow>(
        r#"
        INSERT INTO quizzes (id, user_id, topic, title, difficulty)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(topic)
    .bind(&generated.title)
    .bind(difficulty)
    .fetch_one(&state.db)
    .await?;

    let mut public_questions = Vec::with_capacity(questions.len());
    for question in questions {
        let row = sqlx::query_as::<_, QuizQuestionRow>(
            r#"
            INSERT INTO quiz_questions (id, quiz_id, question_text, options, correct_option, skill_tag)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(quiz.id)
        .bind(&question.question)
        .bind(json!(question.options))
        .bind(&question.correct_option)
        .bind(&question.skill_tag)
        .fetch_one(&state.db)
        .await?;
        public_questions.push(PublicQuestion::from(row));
    }

    info!(
        "Generated quiz {} ({} questions) on '{topic}'",
        quiz.id,
        public_questions.len()
    );
    Ok(QuizResponse {
        quiz,
        questions: public_questions,
    })
}

/// POST /api/v1/quizzes/generate
pub async fn handle_generate_quiz(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<(StatusCode, Json<QuizResponse>), AppError> {
    if req.topic.trim().is_empty() {
        return Err(AppError::Validation("topic is required".to_string()));
    }
    if !DIFFICULTIES.contains(&req.difficulty.as_str()) {
        return Err(AppError::Validation(format!(
            "Unknown difficulty '{}'",
            req.difficulty
        )));
    }
    if req.num_questions == 0 || req.num_questions > MAX_NUM_QUESTIONS {
        return Err(AppError::Validation(format!(
            "num_questions must be between 1 and {MAX_NUM_QUESTIONS}"
        )));
    }

    let response = generate_and_store_quiz(
        &state,
        auth.user_id,
        req.topic.trim(),
        &req.difficulty,
        req.num_questions,
    )
    .await?;

    record_history(
        &state.db,
        auth.user_id,
        "quiz",
        json!({ "topic": req.topic, "difficulty": req.difficulty }),
        json!({ "quiz_id": response.quiz.id, "title": response.quiz.title }),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/quizzes
pub async fn handle_list_quizzes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<QuizRow>>, AppError> {
    let quizzes = sqlx::query_as::<_, QuizRow>(
        "SELECT * FROM quizzes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(quizzes))
}

/// GET /api/v1/quizzes/:id
pub async fn handle_get_quiz(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<QuizResponse>, AppError> {
    let quiz = get_owned_quiz(&state.db, quiz_id, auth.user_id).await?;

    let questions = sqlx::query_as::<_, QuizQuestionRow>(
        "SELECT * FROM quiz_questions WHERE quiz_id = $1",
    )
    .bind(quiz.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(QuizResponse {
        quiz,
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    }))
}

/// POST /api/v1/quizzes/:id/attempt
pub async fn handle_attempt_quiz(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<AttemptRequest>,
) -> Result<(StatusCode, Json<QuizAttemptRow>), AppError> {
    let quiz = get_owned_quiz(&state.db, quiz_id, auth.user_id).await?;

    let answer_key: Vec<(Uuid, String)> = sqlx::query_as(
        "SELECT id, correct_option FROM quiz_questions WHERE quiz_id = $1",
    )
    .bind(quiz.id)
    .fetch_all(&state.db)
    .await?;

    let (score, total) = score_answers(&answer_key, &req.answers);

    let attempt = sqlx::query_as::<_, QuizAttemptRow>(
        r#"
        INSERT INTO quiz_attempts (id, user_id, quiz_id, answers, score, total)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(quiz.id)
    .bind(json!(req.answers))
    .bind(score)
    .bind(total)
    .fetch_one(&state.db)
    .await?;

    info!("Quiz {} attempted: {score}/{total}", quiz.id);
    Ok((StatusCode::CREATED, Json(attempt)))
}

/// GET /api/v1/quizzes/attempts
pub async fn handle_list_attempts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<QuizAttemptRow>>, AppError> {
    let attempts = sqlx::query_as::<_, QuizAttemptRow>(
        "SELECT * FROM quiz_attempts WHERE user_id = $1 ORDER BY attempted_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(attempts))
}

/// GET /api/v1/quizzes/personalized
///
/// Questions from the caller's existing quizzes whose skill tag matches a
/// topic they recently logged progress on. No progress yet means no
/// personalization to offer, so the list is empty rather than an error.
pub async fn handle_personalized_quiz(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let topics: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT unnest(topics_covered) FROM progress_entries
        WHERE user_id = $1
        LIMIT 30
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;

    if topics.is_empty() {
        return Ok(Json(json!({ "topics": [], "questions": [] })));
    }

    let questions = sqlx::query_as::<_, QuizQuestionRow>(
        r#"
        SELECT qq.* FROM quiz_questions qq
        JOIN quizzes q ON q.id = qq.quiz_id
        WHERE q.user_id = $1
          AND qq.skill_tag ILIKE ANY($2)
        ORDER BY q.created_at DESC
        LIMIT 20
        "#,
    )
    .bind(auth.user_id)
    .bind(&topics)
    .fetch_all(&state.db)
    .await?;

    let questions: Vec<PublicQuestion> =
        questions.into_iter().map(PublicQuestion::from).collect();
    Ok(Json(json!({ "topics": topics, "questions": questions })))
}
