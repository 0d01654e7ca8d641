//! Administrator endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use ecocomb_common::{AppError, AppResult};
use ecocomb_core::{
    AddQuestionInput, CreateCommuneInput, CreateContentInput, CreateRegionInput,
    QuestionWithOptions, ResolveAction, UpdateContentInput,
};
use ecocomb_db::entities::{quiz_question::QuestionKind, role_request::RoleRequestStatus};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    PageQuery,
    account::{MeResponse, RoleRequestResponse},
    education::ContentResponse,
    geo::{CommuneResponse, RegionResponse},
};
use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

// ========== Role Requests ==========

/// List role requests query.
#[derive(Debug, Deserialize)]
pub struct ListRoleRequestsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Role request review queue.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequestListResponse {
    pub pending_count: u64,
    pub requests: Vec<RoleRequestResponse>,
}

fn parse_status(status: &str) -> AppResult<RoleRequestStatus> {
    match status {
        "pending" => Ok(RoleRequestStatus::Pending),
        "approved" => Ok(RoleRequestStatus::Approved),
        "rejected" => Ok(RoleRequestStatus::Rejected),
        other => Err(AppError::BadRequest(format!("Unknown status: {other}"))),
    }
}

async fn list_role_requests(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListRoleRequestsQuery>,
) -> AppResult<ApiResponse<RoleRequestListResponse>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let requests = state
        .role_request_service
        .list(status, query.limit.min(100), query.offset)
        .await?;
    let pending_count = state.role_request_service.count_pending().await?;

    Ok(ApiResponse::ok(RoleRequestListResponse {
        pending_count,
        requests: requests.into_iter().map(Into::into).collect(),
    }))
}

async fn get_role_request(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RoleRequestResponse>> {
    let request = state.role_request_service.get(&id).await?;
    Ok(ApiResponse::ok(request.into()))
}

/// Approve/Reject role request.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Resolve outcome.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_status: Option<&'static str>,
}

/// Approve or reject a pending request.
///
/// An unknown action answers 400 with `ok: false` before anything is read.
async fn resolve_role_request(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> AppResult<Response> {
    let action = match ResolveAction::parse(&req.action) {
        Ok(action) => action,
        Err(err) => {
            warn!(admin_id = %admin.id, request_id = %id, action = %req.action, "Invalid resolve action");
            let body = ResolveResponse {
                ok: false,
                message: err.to_string(),
                new_status: None,
            };
            return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
    };

    let request = state
        .role_request_service
        .resolve(
            &id,
            action,
            req.comment.as_deref().unwrap_or_default(),
            &admin.id,
        )
        .await?;

    let message = match action {
        ResolveAction::Approve => "Request approved",
        ResolveAction::Reject => "Request rejected",
    };

    Ok(Json(ResolveResponse {
        ok: true,
        message: message.to_string(),
        new_status: Some(request.status.as_str()),
    })
    .into_response())
}

// ========== Education ==========

/// Question response, answer key included.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub content_id: String,
    pub statement: String,
    pub kind: QuestionKind,
    pub position: i32,
    pub options: Vec<OptionResponse>,
}

/// Option response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResponse {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

impl From<QuestionWithOptions> for QuestionResponse {
    fn from(q: QuestionWithOptions) -> Self {
        Self {
            id: q.question.id,
            content_id: q.question.content_id,
            statement: q.question.statement,
            kind: q.question.kind,
            position: q.question.position,
            options: q
                .options
                .into_iter()
                .map(|o| OptionResponse {
                    id: o.id,
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect(),
        }
    }
}

async fn list_contents(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<ContentResponse>>> {
    let contents = state
        .education_service
        .list_all(page.capped_limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(contents.into_iter().map(Into::into).collect()))
}

async fn create_content(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateContentInput>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let content = state
        .education_service
        .create_content(&admin.id, input)
        .await?;
    Ok(ApiResponse::ok(content.into()))
}

async fn update_content(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateContentInput>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let content = state.education_service.update_content(&id, input).await?;
    Ok(ApiResponse::ok(content.into()))
}

async fn delete_content(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.education_service.delete_content(&id).await?;
    Ok(response::ok())
}

async fn list_questions(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<QuestionResponse>>> {
    let questions = state.education_service.questions_with_options(&id).await?;
    Ok(ApiResponse::ok(questions.into_iter().map(Into::into).collect()))
}

async fn add_question(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<AddQuestionInput>,
) -> AppResult<ApiResponse<QuestionResponse>> {
    let question = state.education_service.add_question(&id, input).await?;
    Ok(ApiResponse::ok(question.into()))
}

async fn delete_question(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.education_service.delete_question(&id).await?;
    Ok(response::ok())
}

// ========== Geography ==========

async fn create_region(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRegionInput>,
) -> AppResult<ApiResponse<RegionResponse>> {
    let region = state.geo_service.create_region(input).await?;
    Ok(ApiResponse::ok(region.into()))
}

async fn create_commune(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCommuneInput>,
) -> AppResult<ApiResponse<CommuneResponse>> {
    let commune = state.geo_service.create_commune(input).await?;
    Ok(ApiResponse::ok(commune.into()))
}

// ========== Users ==========

async fn verify_email(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MeResponse>> {
    let user = state.user_service.verify_email(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Role requests
        .route("/role-requests", get(list_role_requests))
        .route("/role-requests/{id}", get(get_role_request))
        .route("/role-requests/{id}/resolve", post(resolve_role_request))
        // Education
        .route("/education", get(list_contents).post(create_content))
        .route(
            "/education/{id}",
            put(update_content).delete(delete_content),
        )
        .route(
            "/education/{id}/questions",
            get(list_questions).post(add_question),
        )
        .route("/questions/{id}", delete(delete_question))
        // Geography
        .route("/regions", post(create_region))
        .route("/communes", post(create_commune))
        // Users
        .route("/users/{id}/verify-email", post(verify_email))
}
