//! Regions and communes.

use ecocomb_common::{AppError, AppResult};
use ecocomb_db::{
    entities::{commune, region},
    repositories::GeoRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRegionInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommuneInput {
    pub region_id: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Clone)]
pub struct GeoService {
    geo_repo: GeoRepository,
}

impl GeoService {
    #[must_use]
    pub const fn new(geo_repo: GeoRepository) -> Self {
        Self { geo_repo }
    }

    pub async fn regions(&self) -> AppResult<Vec<region::Model>> {
        self.geo_repo.find_regions().await
    }

    /// Communes of an existing region, ordered by name.
    pub async fn communes(&self, region_id: &str) -> AppResult<Vec<commune::Model>> {
        if self.geo_repo.find_region(region_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Region: {region_id}")));
        }
        self.geo_repo.find_communes_by_region(region_id).await
    }

    pub async fn create_region(&self, input: CreateRegionInput) -> AppResult<region::Model> {
        input.validate()?;
        let region = self
            .geo_repo
            .create_region(region::ActiveModel {
                id: Set(crate::generate_id()),
                name: Set(input.name.trim().to_string()),
            })
            .await?;
        info!(region_id = %region.id, name = %region.name, "Region created");
        Ok(region)
    }

    pub async fn create_commune(&self, input: CreateCommuneInput) -> AppResult<commune::Model> {
        input.validate()?;
        if self.geo_repo.find_region(&input.region_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Unknown region: {}",
                input.region_id
            )));
        }

        let commune = self
            .geo_repo
            .create_commune(commune::ActiveModel {
                id: Set(crate::generate_id()),
                region_id: Set(Some(input.region_id)),
                name: Set(input.name.trim().to_string()),
            })
            .await?;
        info!(commune_id = %commune.id, name = %commune.name, "Commune created");
        Ok(commune)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_communes_of_unknown_region() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<region::Model>::new()])
                .into_connection(),
        );
        let service = GeoService::new(GeoRepository::new(db));

        let result = service.communes("r99").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_commune_requires_region() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<region::Model>::new()])
                .into_connection(),
        );
        let service = GeoService::new(GeoRepository::new(db));

        let result = service
            .create_commune(CreateCommuneInput {
                region_id: "r99".to_string(),
                name: "Curacautín".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_region_name_required() {
        let input = CreateRegionInput {
            name: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
