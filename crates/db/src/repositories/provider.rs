//! Provider repository.

use std::sync::Arc;

use crate::entities::{Provider, provider};
use ecocomb_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Provider repository for database operations.
#[derive(Clone)]
pub struct ProviderRepository {
    db: Arc<DatabaseConnection>,
}

impl ProviderRepository {
    /// Create a new provider repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a provider by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<provider::Model>> {
        Provider::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a provider by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<provider::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Provider: {id}")))
    }

    /// Find the provider owned by a user.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<provider::Model>> {
        Provider::find()
            .filter(provider::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::provider::ProviderStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_provider(id: &str, user_id: &str) -> provider::Model {
        provider::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            legal_name: "Leñas del Sur SpA".to_string(),
            rut: "12.345.678-5".to_string(),
            trade_name: "Leñas del Sur".to_string(),
            contact_email: "ventas@lenasdelsur.cl".to_string(),
            contact_phone: "+56 9 1234 5678".to_string(),
            address: "Camino a Pucón km 3".to_string(),
            commune_id: None,
            registry_number: String::new(),
            supplies_biofuel: true,
            provides_services: false,
            status: ProviderStatus::Active,
            approved_at: Some(Utc::now().into()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_user_id() {
        let provider = create_test_provider("prov1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[provider.clone()]])
                .into_connection(),
        );

        let repo = ProviderRepository::new(db);
        let found = repo.find_by_user_id("user1").await.unwrap().unwrap();

        assert_eq!(found.id, "prov1");
        assert!(found.can_sell_products());
        assert!(!found.can_offer_services());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<provider::Model>::new()])
                .into_connection(),
        );

        let repo = ProviderRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
