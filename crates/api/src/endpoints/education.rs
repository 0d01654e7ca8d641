//! Public educational content and quizzes.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ecocomb_common::AppResult;
use ecocomb_core::QuizView;
use ecocomb_db::entities::{educational_content, quiz_attempt};
use serde::{Deserialize, Serialize};

use super::PageQuery;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Content response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub topic: String,
    pub is_active: bool,
    pub author_id: Option<String>,
    pub published_at: String,
    pub updated_at: Option<String>,
}

impl From<educational_content::Model> for ContentResponse {
    fn from(content: educational_content::Model) -> Self {
        Self {
            id: content.id,
            title: content.title,
            slug: content.slug,
            summary: content.summary,
            body: content.body,
            topic: content.topic,
            is_active: content.is_active,
            author_id: content.author_id,
            published_at: content.published_at.to_rfc3339(),
            updated_at: content.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Quiz answers, question ID to chosen option ID.
#[derive(Debug, Deserialize)]
pub struct AttemptRequest {
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

/// Graded attempt.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub id: String,
    pub content_id: String,
    pub score: i32,
    pub total_questions: i32,
    pub created_at: String,
}

impl From<quiz_attempt::Model> for AttemptResponse {
    fn from(attempt: quiz_attempt::Model) -> Self {
        Self {
            id: attempt.id,
            content_id: attempt.content_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            created_at: attempt.created_at.to_rfc3339(),
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<ContentResponse>>> {
    let contents = state
        .education_service
        .list_published(page.capped_limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(contents.into_iter().map(Into::into).collect()))
}

async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let content = state.education_service.get_published(&slug).await?;
    Ok(ApiResponse::ok(content.into()))
}

async fn quiz(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<QuizView>> {
    let quiz = state.education_service.quiz(&slug).await?;
    Ok(ApiResponse::ok(quiz))
}

async fn submit_attempt(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<AttemptRequest>,
) -> AppResult<ApiResponse<AttemptResponse>> {
    let attempt = state
        .education_service
        .submit_attempt(&user.id, &slug, &req.answers)
        .await?;
    Ok(ApiResponse::ok(attempt.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", get(show))
        .route("/{slug}/quiz", get(quiz).post(submit_attempt))
}
