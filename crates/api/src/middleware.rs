//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use ecocomb_common::{AppError, Config};
use ecocomb_core::{
    CatalogService, CommercialService, EducationService, GeoService, RoleRequestService,
    UserService,
};
use ecocomb_db::repositories::{
    EducationRepository, GeoRepository, ProductRepository, ProviderRepository, ServiceRepository,
    UserRepository,
};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub role_request_service: RoleRequestService,
    pub commercial_service: CommercialService,
    pub catalog_service: CatalogService,
    pub education_service: EducationService,
    pub geo_service: GeoService,
}

impl AppState {
    /// Wire every service over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let geo_repo = GeoRepository::new(Arc::clone(&db));
        let provider_repo = ProviderRepository::new(Arc::clone(&db));
        let product_repo = ProductRepository::new(Arc::clone(&db));
        let service_repo = ServiceRepository::new(Arc::clone(&db));
        let education_repo = EducationRepository::new(Arc::clone(&db));

        let commercial_service = CommercialService::new(provider_repo.clone());

        Self {
            user_service: UserService::new(user_repo, geo_repo.clone(), config),
            role_request_service: RoleRequestService::new(Arc::clone(&db)),
            catalog_service: CatalogService::new(
                db,
                product_repo,
                service_repo,
                provider_repo,
                commercial_service.clone(),
            ),
            commercial_service,
            education_service: EducationService::new(education_repo),
            geo_service: GeoService::new(geo_repo),
        }
    }
}

/// Authentication middleware.
///
/// A valid bearer token puts the user into the request extensions. Blocked
/// users are refused everywhere except signout.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                if user.is_blocked && !req.uri().path().ends_with("/signout") {
                    debug!(user_id = %user.id, path = %req.uri().path(), "Blocked user refused");
                    return AppError::Forbidden(
                        "Account blocked until the email address is verified".to_string(),
                    )
                    .into_response();
                }
                req.extensions_mut().insert(user);
            }
            // Unknown tokens continue anonymously
            Err(AppError::Unauthorized) => {}
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
