//! Create `product` and `service` tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Product::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Product::ProviderId).string_len(32).not_null())
                    .col(ColumnDef::new(Product::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Product::Species)
                            .string_len(100)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Product::MoisturePercent).double())
                    .col(ColumnDef::new(Product::Format).string_len(32).not_null())
                    .col(ColumnDef::new(Product::Unit).string_len(16).not_null())
                    .col(ColumnDef::new(Product::UnitPriceClp).big_integer().not_null())
                    .col(
                        ColumnDef::new(Product::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Product::CommuneId).string_len(32))
                    .col(ColumnDef::new(Product::Stock).integer())
                    .col(
                        ColumnDef::new(Product::RegistryCertified)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Product::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Product::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Product::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_provider")
                            .from(Product::Table, Product::ProviderId)
                            .to(Provider::Table, Provider::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_commune")
                            .from(Product::Table, Product::CommuneId)
                            .to(Commune::Table, Commune::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Service::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Service::ProviderId).string_len(32).not_null())
                    .col(ColumnDef::new(Service::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Service::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Service::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Service::BasePriceClp).big_integer().not_null())
                    .col(ColumnDef::new(Service::PriceUnit).string_len(20).not_null())
                    .col(ColumnDef::new(Service::CoverageCommuneIds).json_binary().not_null())
                    .col(
                        ColumnDef::new(Service::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Service::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Service::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_provider")
                            .from(Service::Table, Service::ProviderId)
                            .to(Provider::Table, Provider::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (provider_id, is_active) for visibility cascades and listings
        manager
            .create_index(
                Index::create()
                    .name("idx_product_provider_active")
                    .table(Product::Table)
                    .col(Product::ProviderId)
                    .col(Product::IsActive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_provider_active")
                    .table(Service::Table)
                    .col(Service::ProviderId)
                    .col(Service::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Service::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Product::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Product {
    Table,
    Id,
    ProviderId,
    Kind,
    Species,
    MoisturePercent,
    Format,
    Unit,
    UnitPriceClp,
    Description,
    CommuneId,
    Stock,
    RegistryCertified,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Service {
    Table,
    Id,
    ProviderId,
    Kind,
    Name,
    Description,
    BasePriceClp,
    PriceUnit,
    CoverageCommuneIds,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Provider {
    Table,
    Id,
}

#[derive(Iden)]
enum Commune {
    Table,
    Id,
}
