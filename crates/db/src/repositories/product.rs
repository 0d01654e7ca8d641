//! Product repository.

use std::sync::Arc;

use crate::entities::{Product, product};
use ecocomb_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Product repository for database operations.
#[derive(Clone)]
pub struct ProductRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a product by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<product::Model>> {
        Product::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a product by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<product::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product: {id}")))
    }

    /// All products of a provider, active or not, newest first.
    pub async fn find_by_provider(&self, provider_id: &str) -> AppResult<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::ProviderId.eq(provider_id))
            .order_by_desc(product::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active products of a provider, newest first.
    pub async fn find_active_by_provider(
        &self,
        provider_id: &str,
    ) -> AppResult<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::ProviderId.eq(provider_id))
            .filter(product::Column::IsActive.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active products across all providers (paginated, newest first).
    pub async fn find_active(&self, limit: u64, offset: u64) -> AppResult<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a product.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Product::delete_by_id(id)
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
    use crate::entities::product::{ProductFormat, ProductKind, SaleUnit};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_product(id: &str, provider_id: &str) -> product::Model {
        product::Model {
            id: id.to_string(),
            provider_id: provider_id.to_string(),
            kind: ProductKind::Firewood,
            species: "eucalipto".to_string(),
            moisture_percent: Some(18.0),
            format: ProductFormat::StackedCubicMeter,
            unit: SaleUnit::M3,
            unit_price_clp: 45_000,
            description: String::new(),
            commune_id: None,
            stock: Some(30),
            registry_certified: true,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_active_by_provider() {
        let product = create_test_product("prod1", "prov1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[product.clone()]])
                .into_connection(),
        );

        let repo = ProductRepository::new(db);
        let result = repo.find_active_by_provider("prov1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].unit_price_clp, 45_000);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<product::Model>::new()])
                .into_connection(),
        );

        let repo = ProductRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ProductRepository::new(db);
        assert!(repo.delete("prod1").await.is_ok());
    }
}
