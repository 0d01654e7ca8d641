//! Product and service catalog.
//!
//! Owners manage their listings only while their provider holds the matching
//! capability. The public catalog shows active listings only. Writes run in
//! a transaction holding the provider row lock, so a listing cannot go live
//! after a concurrent rejection or resubmission withdrew the capability.

use chrono::Utc;
use ecocomb_common::{AppError, AppResult};
use ecocomb_db::{
    entities::{
        Product, Service,
        product::{self, ProductFormat, ProductKind, SaleUnit},
        provider::{self, ProviderStatus},
        service::{self, ServiceKind},
    },
    repositories::{ProductRepository, ProviderRepository, ServiceRepository},
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use super::commercial::{CommercialService, lock_service_provider, lock_supplier};

/// Input for listing a product.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub kind: ProductKind,

    #[validate(length(max = 100))]
    pub species: Option<String>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub moisture_percent: Option<f64>,

    pub format: ProductFormat,

    pub unit: SaleUnit,

    #[validate(range(min = 0))]
    pub unit_price_clp: i64,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    /// Defaults to the provider's commune.
    pub commune_id: Option<String>,

    #[validate(range(min = 0))]
    pub stock: Option<i32>,

    pub registry_certified: Option<bool>,
}

/// Input for editing a product.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub kind: Option<ProductKind>,

    #[validate(length(max = 100))]
    pub species: Option<String>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub moisture_percent: Option<f64>,

    pub format: Option<ProductFormat>,

    pub unit: Option<SaleUnit>,

    #[validate(range(min = 0))]
    pub unit_price_clp: Option<i64>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub commune_id: Option<String>,

    #[validate(range(min = 0))]
    pub stock: Option<i32>,

    pub registry_certified: Option<bool>,

    pub is_active: Option<bool>,
}

/// Input for listing a service.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceInput {
    pub kind: ServiceKind,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub base_price_clp: i64,

    #[validate(length(min = 1, max = 20))]
    pub price_unit: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub coverage_commune_ids: Vec<String>,
}

/// Input for editing a service.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceInput {
    pub kind: Option<ServiceKind>,

    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub base_price_clp: Option<i64>,

    #[validate(length(min = 1, max = 20))]
    pub price_unit: Option<String>,

    #[validate(length(max = 100))]
    pub coverage_commune_ids: Option<Vec<String>>,

    pub is_active: Option<bool>,
}

/// Public catalog page.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub products: Vec<product::Model>,
    pub services: Vec<service::Model>,
}

/// A provider with its active listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDetail {
    pub provider: provider::Model,
    pub products: Vec<product::Model>,
    pub services: Vec<service::Model>,
}

/// Catalog service.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    product_repo: ProductRepository,
    service_repo: ServiceRepository,
    provider_repo: ProviderRepository,
    commercial: CommercialService,
}

impl CatalogService {
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        product_repo: ProductRepository,
        service_repo: ServiceRepository,
        provider_repo: ProviderRepository,
        commercial: CommercialService,
    ) -> Self {
        Self {
            db,
            product_repo,
            service_repo,
            provider_repo,
            commercial,
        }
    }

    // === Public ===

    /// Active products and services, newest first.
    pub async fn catalog(&self, limit: u64, offset: u64) -> AppResult<Catalog> {
        let products = self.product_repo.find_active(limit, offset).await?;
        let services = self.service_repo.find_active(limit, offset).await?;
        debug!(
            products = products.len(),
            services = services.len(),
            "Catalog page loaded"
        );
        Ok(Catalog { products, services })
    }

    /// An active provider with its active listings.
    pub async fn provider_detail(&self, provider_id: &str) -> AppResult<ProviderDetail> {
        let provider = self.provider_repo.get_by_id(provider_id).await?;
        if provider.status != ProviderStatus::Active {
            return Err(AppError::NotFound(format!("Provider: {provider_id}")));
        }

        let products = self
            .product_repo
            .find_active_by_provider(&provider.id)
            .await?;
        let services = self
            .service_repo
            .find_active_by_provider(&provider.id)
            .await?;

        Ok(ProviderDetail {
            provider,
            products,
            services,
        })
    }

    // === Products ===

    /// The user's products, including hidden ones.
    pub async fn my_products(&self, user_id: &str) -> AppResult<Vec<product::Model>> {
        match self.commercial.provider_for(user_id).await? {
            Some(provider) => self.product_repo.find_by_provider(&provider.id).await,
            None => Ok(vec![]),
        }
    }

    pub async fn create_product(
        &self,
        user_id: &str,
        input: CreateProductInput,
    ) -> AppResult<product::Model> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let provider = lock_supplier(&txn, user_id).await?;

        let product = product::ActiveModel {
            id: Set(crate::generate_id()),
            provider_id: Set(provider.id.clone()),
            kind: Set(input.kind),
            species: Set(input.species.unwrap_or_default().trim().to_string()),
            moisture_percent: Set(input.moisture_percent),
            format: Set(input.format),
            unit: Set(input.unit),
            unit_price_clp: Set(input.unit_price_clp),
            description: Set(input.description.unwrap_or_default()),
            commune_id: Set(input.commune_id.or(provider.commune_id)),
            stock: Set(input.stock),
            registry_certified: Set(input.registry_certified.unwrap_or(true)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(provider_id = %provider.id, product_id = %product.id, "Product listed");

        Ok(product)
    }

    pub async fn update_product(
        &self,
        user_id: &str,
        product_id: &str,
        input: UpdateProductInput,
    ) -> AppResult<product::Model> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let provider = lock_supplier(&txn, user_id).await?;
        let product = Product::find_by_id(product_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Product: {product_id}")))?;
        ensure_owner(&provider, &product.provider_id, "product")?;

        let mut active: product::ActiveModel = product.into();

        if let Some(kind) = input.kind {
            active.kind = Set(kind);
        }
        if let Some(species) = input.species {
            active.species = Set(species.trim().to_string());
        }
        if input.moisture_percent.is_some() {
            active.moisture_percent = Set(input.moisture_percent);
        }
        if let Some(format) = input.format {
            active.format = Set(format);
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        if let Some(price) = input.unit_price_clp {
            active.unit_price_clp = Set(price);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if input.commune_id.is_some() {
            active.commune_id = Set(input.commune_id);
        }
        if input.stock.is_some() {
            active.stock = Set(input.stock);
        }
        if let Some(certified) = input.registry_certified {
            active.registry_certified = Set(certified);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        let updated = active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        Ok(updated)
    }

    pub async fn delete_product(&self, user_id: &str, product_id: &str) -> AppResult<()> {
        let provider = self.commercial.require_supplier(user_id).await?;
        let product = self.product_repo.get_by_id(product_id).await?;
        ensure_owner(&provider, &product.provider_id, "product")?;

        self.product_repo.delete(product_id).await?;
        info!(provider_id = %provider.id, product_id = %product_id, "Product deleted");
        Ok(())
    }

    // === Services ===

    /// The user's services, including hidden ones.
    pub async fn my_services(&self, user_id: &str) -> AppResult<Vec<service::Model>> {
        match self.commercial.provider_for(user_id).await? {
            Some(provider) => self.service_repo.find_by_provider(&provider.id).await,
            None => Ok(vec![]),
        }
    }

    pub async fn create_service(
        &self,
        user_id: &str,
        input: CreateServiceInput,
    ) -> AppResult<service::Model> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let provider = lock_service_provider(&txn, user_id).await?;

        let service = service::ActiveModel {
            id: Set(crate::generate_id()),
            provider_id: Set(provider.id.clone()),
            kind: Set(input.kind),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description.unwrap_or_default()),
            base_price_clp: Set(input.base_price_clp),
            price_unit: Set(input.price_unit.trim().to_string()),
            coverage_commune_ids: Set(serde_json::json!(input.coverage_commune_ids)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(provider_id = %provider.id, service_id = %service.id, "Service listed");

        Ok(service)
    }

    pub async fn update_service(
        &self,
        user_id: &str,
        service_id: &str,
        input: UpdateServiceInput,
    ) -> AppResult<service::Model> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let provider = lock_service_provider(&txn, user_id).await?;
        let service = Service::find_by_id(service_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Service: {service_id}")))?;
        ensure_owner(&provider, &service.provider_id, "service")?;

        let mut active: service::ActiveModel = service.into();

        if let Some(kind) = input.kind {
            active.kind = Set(kind);
        }
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(price) = input.base_price_clp {
            active.base_price_clp = Set(price);
        }
        if let Some(price_unit) = input.price_unit {
            active.price_unit = Set(price_unit.trim().to_string());
        }
        if let Some(coverage) = input.coverage_commune_ids {
            active.coverage_commune_ids = Set(serde_json::json!(coverage));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        let updated = active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        Ok(updated)
    }

    pub async fn delete_service(&self, user_id: &str, service_id: &str) -> AppResult<()> {
        let provider = self.commercial.require_service_provider(user_id).await?;
        let service = self.service_repo.get_by_id(service_id).await?;
        ensure_owner(&provider, &service.provider_id, "service")?;

        self.service_repo.delete(service_id).await?;
        info!(provider_id = %provider.id, service_id = %service_id, "Service deleted");
        Ok(())
    }
}

fn db_err(e: sea_orm::DbErr) -> AppError {
    AppError::Database(e.to_string())
}

fn ensure_owner(provider: &provider::Model, owner_id: &str, what: &str) -> AppResult<()> {
    if provider.id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("You can only manage your own {what}s")))
    }
}

/// Render a peso amount with `.` thousands separators (`1.234.567`).
#[must_use]
pub fn format_clp(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if amount < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }

    out
}
