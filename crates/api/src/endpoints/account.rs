//! Endpoints for the signed-in user: profile, role request and listings.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
};
use ecocomb_common::AppResult;
use ecocomb_core::{
    CommercialAccess, CreateProductInput, CreateServiceInput, SubmitRoleRequestInput,
    UpdateProductInput, UpdateProfileInput, UpdateServiceInput,
};
use ecocomb_db::entities::{
    role_request::{self, RoleRequestKind, RoleRequestStatus},
    user::{self, UserRole},
};
use serde::Serialize;

use super::catalog::{ProductResponse, ServiceResponse};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// The signed-in user's own profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub rut: Option<String>,
    pub region_id: Option<String>,
    pub commune_id: Option<String>,
    pub role: UserRole,
    pub is_admin: bool,
    pub email_verified: bool,
    pub is_blocked: bool,
    pub created_at: String,
}

impl From<user::Model> for MeResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            rut: user.rut,
            region_id: user.region_id,
            commune_id: user.commune_id,
            role: user.role,
            is_admin: user.is_admin,
            email_verified: user.email_verified,
            is_blocked: user.is_blocked,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Role request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequestResponse {
    pub id: String,
    pub user_id: String,
    pub kind: RoleRequestKind,
    pub status: RoleRequestStatus,
    pub trade_name: String,
    pub line_of_business: String,
    pub sale_point_address: String,
    pub accepts_biofuel_law: bool,
    pub city: String,
    pub contact_info: String,
    pub services_offered: String,
    pub accepts_terms: bool,
    pub registry_number: Option<String>,
    pub admin_comment: String,
    pub submitted_at: String,
    pub resolved_at: Option<String>,
}

impl From<role_request::Model> for RoleRequestResponse {
    fn from(request: role_request::Model) -> Self {
        Self {
            registry_number: request.registry_number().map(str::to_string),
            id: request.id,
            user_id: request.user_id,
            kind: request.kind,
            status: request.status,
            trade_name: request.trade_name,
            line_of_business: request.line_of_business,
            sale_point_address: request.sale_point_address,
            accepts_biofuel_law: request.accepts_biofuel_law,
            city: request.city,
            contact_info: request.contact_info,
            services_offered: request.services_offered,
            accepts_terms: request.accepts_terms,
            admin_comment: request.admin_comment,
            submitted_at: request.submitted_at.to_rfc3339(),
            resolved_at: request.resolved_at.map(|t| t.to_rfc3339()),
        }
    }
}

// ========== Profile ==========

async fn me(AuthUser(user): AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::ok(user.into())
}

async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<MeResponse>> {
    let user = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn commercial(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CommercialAccess>> {
    let access = state.commercial_service.access(&user.id).await?;
    Ok(ApiResponse::ok(access))
}

// ========== Role Request ==========

/// The request the workflow currently acts on, if any.
async fn current_role_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Option<RoleRequestResponse>>> {
    let request = state.role_request_service.current_for_user(&user).await?;
    Ok(ApiResponse::ok(request.map(Into::into)))
}

/// Submit a new request. Commercial access is withdrawn until it is approved.
async fn submit_role_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitRoleRequestInput>,
) -> AppResult<ApiResponse<RoleRequestResponse>> {
    let request = state.role_request_service.submit(&user.id, input).await?;
    Ok(ApiResponse::ok(request.into()))
}

// ========== Products ==========

async fn my_products(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ProductResponse>>> {
    let products = state.catalog_service.my_products(&user.id).await?;
    Ok(ApiResponse::ok(products.into_iter().map(Into::into).collect()))
}

async fn create_product(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.catalog_service.create_product(&user.id, input).await?;
    Ok(ApiResponse::ok(product.into()))
}

async fn update_product(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state
        .catalog_service
        .update_product(&user.id, &id, input)
        .await?;
    Ok(ApiResponse::ok(product.into()))
}

async fn delete_product(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.catalog_service.delete_product(&user.id, &id).await?;
    Ok(response::ok())
}

// ========== Services ==========

async fn my_services(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ServiceResponse>>> {
    let services = state.catalog_service.my_services(&user.id).await?;
    Ok(ApiResponse::ok(services.into_iter().map(Into::into).collect()))
}

async fn create_service(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateServiceInput>,
) -> AppResult<ApiResponse<ServiceResponse>> {
    let service = state.catalog_service.create_service(&user.id, input).await?;
    Ok(ApiResponse::ok(service.into()))
}

async fn update_service(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateServiceInput>,
) -> AppResult<ApiResponse<ServiceResponse>> {
    let service = state
        .catalog_service
        .update_service(&user.id, &id, input)
        .await?;
    Ok(ApiResponse::ok(service.into()))
}

async fn delete_service(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.catalog_service.delete_service(&user.id, &id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me).put(update_me))
        .route("/commercial", get(commercial))
        .route(
            "/role-request",
            get(current_role_request).post(submit_role_request),
        )
        .route("/products", get(my_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/services", get(my_services).post(create_service))
        .route("/services/{id}", put(update_service).delete(delete_service))
}
