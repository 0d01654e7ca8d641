//! Commercial capability checks.

use ecocomb_common::{AppError, AppResult};
use ecocomb_db::{
    entities::{Provider, provider},
    repositories::ProviderRepository,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use serde::Serialize;
use tracing::warn;

/// What a user may currently list in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialAccess {
    pub can_products: bool,
    pub can_services: bool,
}

impl CommercialAccess {
    #[must_use]
    pub fn of(provider: Option<&provider::Model>) -> Self {
        provider.map_or_else(Self::default, |p| Self {
            can_products: p.can_sell_products(),
            can_services: p.can_offer_services(),
        })
    }
}

/// Capability lookups backed by the user's provider record.
#[derive(Clone)]
pub struct CommercialService {
    provider_repo: ProviderRepository,
}

impl CommercialService {
    #[must_use]
    pub const fn new(provider_repo: ProviderRepository) -> Self {
        Self { provider_repo }
    }

    /// The user's provider record, active or not.
    pub async fn provider_for(&self, user_id: &str) -> AppResult<Option<provider::Model>> {
        self.provider_repo.find_by_user_id(user_id).await
    }

    pub async fn access(&self, user_id: &str) -> AppResult<CommercialAccess> {
        let provider = self.provider_for(user_id).await?;
        Ok(CommercialAccess::of(provider.as_ref()))
    }

    /// Active provider that supplies biofuel.
    pub async fn is_supplier(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.access(user_id).await?.can_products)
    }

    /// Active provider that offers services.
    pub async fn is_service_provider(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.access(user_id).await?.can_services)
    }

    /// The user's provider, if it may sell products.
    pub async fn require_supplier(&self, user_id: &str) -> AppResult<provider::Model> {
        supplier(user_id, self.provider_for(user_id).await?)
    }

    /// The user's provider, if it may offer services.
    pub async fn require_service_provider(&self, user_id: &str) -> AppResult<provider::Model> {
        service_provider(user_id, self.provider_for(user_id).await?)
    }
}

/// The user's provider row, locked until `conn`'s transaction ends.
///
/// Capability changes take the same lock, so a check made here holds for
/// every write in the transaction.
pub async fn lock_provider<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
) -> AppResult<Option<provider::Model>> {
    Provider::find()
        .filter(provider::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Locked variant of [`CommercialService::require_supplier`].
pub async fn lock_supplier<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
) -> AppResult<provider::Model> {
    supplier(user_id, lock_provider(conn, user_id).await?)
}

/// Locked variant of [`CommercialService::require_service_provider`].
pub async fn lock_service_provider<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
) -> AppResult<provider::Model> {
    service_provider(user_id, lock_provider(conn, user_id).await?)
}

fn supplier(user_id: &str, provider: Option<provider::Model>) -> AppResult<provider::Model> {
    match provider {
        Some(provider) if provider.can_sell_products() => Ok(provider),
        _ => {
            warn!(user_id = %user_id, "Product access refused");
            Err(AppError::Forbidden(
                "An approved supplier account is required".to_string(),
            ))
        }
    }
}

fn service_provider(user_id: &str, provider: Option<provider::Model>) -> AppResult<provider::Model> {
    match provider {
        Some(provider) if provider.can_offer_services() => Ok(provider),
        _ => {
            warn!(user_id = %user_id, "Service access refused");
            Err(AppError::Forbidden(
                "An approved service provider account is required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ecocomb_db::entities::provider::ProviderStatus;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_provider(status: ProviderStatus, biofuel: bool, services: bool) -> provider::Model {
        provider::Model {
            id: "prov1".to_string(),
            user_id: "user1".to_string(),
            legal_name: "Transportes Llaima".to_string(),
            rut: "12.345.678-5".to_string(),
            trade_name: "Transportes Llaima".to_string(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: String::new(),
            commune_id: None,
            registry_number: String::new(),
            supplies_biofuel: biofuel,
            provides_services: services,
            status,
            approved_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_access_without_provider() {
        assert_eq!(CommercialAccess::of(None), CommercialAccess::default());
    }

    #[test]
    fn test_access_follows_flags() {
        let provider = create_test_provider(ProviderStatus::Active, false, true);
        let access = CommercialAccess::of(Some(&provider));

        assert!(!access.can_products);
        assert!(access.can_services);
    }

    #[test]
    fn test_access_requires_active_status() {
        let suspended = create_test_provider(ProviderStatus::Suspended, true, true);
        assert_eq!(
            CommercialAccess::of(Some(&suspended)),
            CommercialAccess::default()
        );
    }

    #[test]
    fn test_access_serializes_camel_case() {
        let json = serde_json::to_value(CommercialAccess {
            can_products: true,
            can_services: false,
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "canProducts": true, "canServices": false }));
    }

    #[tokio::test]
    async fn test_require_supplier_refuses_service_only_provider() {
        let provider = create_test_provider(ProviderStatus::Active, false, true);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[provider]])
                .into_connection(),
        );

        let service = CommercialService::new(ProviderRepository::new(db));
        let result = service.require_supplier("user1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_require_service_provider_accepts_active_provider() {
        let provider = create_test_provider(ProviderStatus::Active, false, true);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[provider]])
                .into_connection(),
        );

        let service = CommercialService::new(ProviderRepository::new(db));
        let provider = service.require_service_provider("user1").await.unwrap();

        assert_eq!(provider.id, "prov1");
    }
}
