//! Service repository.

use std::sync::Arc;

use crate::entities::{Service, service};
use ecocomb_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Service repository for database operations.
#[derive(Clone)]
pub struct ServiceRepository {
    db: Arc<DatabaseConnection>,
}

impl ServiceRepository {
    /// Create a new service repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a service by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<service::Model>> {
        Service::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a service by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<service::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service: {id}")))
    }

    /// All services of a provider, active or not, newest first.
    pub async fn find_by_provider(&self, provider_id: &str) -> AppResult<Vec<service::Model>> {
        Service::find()
            .filter(service::Column::ProviderId.eq(provider_id))
            .order_by_desc(service::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active services of a provider, newest first.
    pub async fn find_active_by_provider(
        &self,
        provider_id: &str,
    ) -> AppResult<Vec<service::Model>> {
        Service::find()
            .filter(service::Column::ProviderId.eq(provider_id))
            .filter(service::Column::IsActive.eq(true))
            .order_by_desc(service::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active services across all providers (paginated, newest first).
    pub async fn find_active(&self, limit: u64, offset: u64) -> AppResult<Vec<service::Model>> {
        Service::find()
            .filter(service::Column::IsActive.eq(true))
            .order_by_desc(service::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a service.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Service::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::service::ServiceKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_service(id: &str, provider_id: &str) -> service::Model {
        service::Model {
            id: id.to_string(),
            provider_id: provider_id.to_string(),
            kind: ServiceKind::FlueCleaning,
            name: "Limpieza de cañón".to_string(),
            description: String::new(),
            base_price_clp: 25_000,
            price_unit: "visita".to_string(),
            coverage_commune_ids: serde_json::json!(["temuco", "padre-las-casas"]),
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_active() {
        let service = create_test_service("svc1", "prov1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[service.clone()]])
                .into_connection(),
        );

        let repo = ServiceRepository::new(db);
        let result = repo.find_active(20, 0).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].kind, ServiceKind::FlueCleaning);
    }

    #[tokio::test]
    async fn test_find_by_provider_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<service::Model>::new()])
                .into_connection(),
        );

        let repo = ServiceRepository::new(db);
        let result = repo.find_by_provider("prov1").await.unwrap();

        assert!(result.is_empty());
    }
}
