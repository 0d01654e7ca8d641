//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20251101_000001_create_geo_tables;
mod m20251101_000002_create_user_table;
mod m20251101_000003_create_role_request_table;
mod m20251101_000004_create_provider_table;
mod m20251101_000005_create_catalog_tables;
mod m20251101_000006_create_education_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_create_geo_tables::Migration),
            Box::new(m20251101_000002_create_user_table::Migration),
            Box::new(m20251101_000003_create_role_request_table::Migration),
            Box::new(m20251101_000004_create_provider_table::Migration),
            Box::new(m20251101_000005_create_catalog_tables::Migration),
            Box::new(m20251101_000006_create_education_tables::Migration),
        ]
    }
}
