//! Region and commune repository.

use std::sync::Arc;

use crate::entities::{Commune, Region, commune, region};
use ecocomb_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Geography repository for database operations.
#[derive(Clone)]
pub struct GeoRepository {
    db: Arc<DatabaseConnection>,
}

impl GeoRepository {
    /// Create a new geography repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All regions ordered by name.
    pub async fn find_regions(&self) -> AppResult<Vec<region::Model>> {
        Region::find()
            .order_by_asc(region::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a region by ID.
    pub async fn find_region(&self, id: &str) -> AppResult<Option<region::Model>> {
        Region::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Communes of a region ordered by name.
    pub async fn find_communes_by_region(&self, region_id: &str) -> AppResult<Vec<commune::Model>> {
        Commune::find()
            .filter(commune::Column::RegionId.eq(region_id))
            .order_by_asc(commune::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a commune by ID.
    pub async fn find_commune(&self, id: &str) -> AppResult<Option<commune::Model>> {
        Commune::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a region.
    pub async fn create_region(&self, model: region::ActiveModel) -> AppResult<region::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a commune.
    pub async fn create_commune(&self, model: commune::ActiveModel) -> AppResult<commune::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_communes_by_region() {
        let communes = vec![
            commune::Model {
                id: "c1".to_string(),
                region_id: Some("r9".to_string()),
                name: "Padre Las Casas".to_string(),
            },
            commune::Model {
                id: "c2".to_string(),
                region_id: Some("r9".to_string()),
                name: "Temuco".to_string(),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([communes])
                .into_connection(),
        );

        let repo = GeoRepository::new(db);
        let result = repo.find_communes_by_region("r9").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].name, "Temuco");
    }

    #[tokio::test]
    async fn test_find_region_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<region::Model>::new()])
                .into_connection(),
        );

        let repo = GeoRepository::new(db);
        assert!(repo.find_region("r99").await.unwrap().is_none());
    }
}
