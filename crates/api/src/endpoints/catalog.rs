//! Public catalog endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use ecocomb_common::AppResult;
use ecocomb_core::format_clp;
use ecocomb_db::entities::{
    product::{self, ProductFormat, ProductKind, SaleUnit},
    provider,
    service::{self, ServiceKind},
};
use serde::Serialize;

use super::PageQuery;
use crate::{middleware::AppState, response::ApiResponse};

/// Product response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub provider_id: String,
    pub kind: ProductKind,
    pub species: String,
    pub moisture_percent: Option<f64>,
    pub format: ProductFormat,
    pub unit: SaleUnit,
    pub unit_price_clp: i64,
    /// `unit_price_clp` with thousands separators
    pub unit_price_label: String,
    pub description: String,
    pub commune_id: Option<String>,
    pub stock: Option<i32>,
    pub registry_certified: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<product::Model> for ProductResponse {
    fn from(product: product::Model) -> Self {
        Self {
            unit_price_label: format_clp(product.unit_price_clp),
            id: product.id,
            provider_id: product.provider_id,
            kind: product.kind,
            species: product.species,
            moisture_percent: product.moisture_percent,
            format: product.format,
            unit: product.unit,
            unit_price_clp: product.unit_price_clp,
            description: product.description,
            commune_id: product.commune_id,
            stock: product.stock,
            registry_certified: product.registry_certified,
            is_active: product.is_active,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: String,
    pub provider_id: String,
    pub kind: ServiceKind,
    pub name: String,
    pub description: String,
    pub base_price_clp: i64,
    pub base_price_label: String,
    pub price_unit: String,
    pub coverage_commune_ids: serde_json::Value,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<service::Model> for ServiceResponse {
    fn from(service: service::Model) -> Self {
        Self {
            base_price_label: format_clp(service.base_price_clp),
            id: service.id,
            provider_id: service.provider_id,
            kind: service.kind,
            name: service.name,
            description: service.description,
            base_price_clp: service.base_price_clp,
            price_unit: service.price_unit,
            coverage_commune_ids: service.coverage_commune_ids,
            is_active: service.is_active,
            created_at: service.created_at.to_rfc3339(),
            updated_at: service.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Public provider profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub id: String,
    pub trade_name: String,
    pub legal_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub commune_id: Option<String>,
    pub registry_number: String,
    pub supplies_biofuel: bool,
    pub provides_services: bool,
    pub approved_at: Option<String>,
}

impl From<provider::Model> for ProviderResponse {
    fn from(provider: provider::Model) -> Self {
        Self {
            id: provider.id,
            trade_name: provider.trade_name,
            legal_name: provider.legal_name,
            contact_email: provider.contact_email,
            contact_phone: provider.contact_phone,
            address: provider.address,
            commune_id: provider.commune_id,
            registry_number: provider.registry_number,
            supplies_biofuel: provider.supplies_biofuel,
            provides_services: provider.provides_services,
            approved_at: provider.approved_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Catalog page.
#[derive(Serialize)]
pub struct CatalogResponse {
    pub products: Vec<ProductResponse>,
    pub services: Vec<ServiceResponse>,
}

/// Provider with its listings.
#[derive(Serialize)]
pub struct ProviderDetailResponse {
    pub provider: ProviderResponse,
    pub products: Vec<ProductResponse>,
    pub services: Vec<ServiceResponse>,
}

async fn catalog(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<CatalogResponse>> {
    let catalog = state
        .catalog_service
        .catalog(page.capped_limit(), page.offset)
        .await?;

    Ok(ApiResponse::ok(CatalogResponse {
        products: catalog.products.into_iter().map(Into::into).collect(),
        services: catalog.services.into_iter().map(Into::into).collect(),
    }))
}

async fn provider_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProviderDetailResponse>> {
    let detail = state.catalog_service.provider_detail(&id).await?;

    Ok(ApiResponse::ok(ProviderDetailResponse {
        provider: detail.provider.into(),
        products: detail.products.into_iter().map(Into::into).collect(),
        services: detail.services.into_iter().map(Into::into).collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(catalog))
        .route("/providers/{id}", get(provider_detail))
}
