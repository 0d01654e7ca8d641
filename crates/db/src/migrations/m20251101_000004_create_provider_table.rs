//! Create `provider` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Provider::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Provider::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Provider::UserId)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Provider::LegalName).string_len(255).not_null())
                    .col(ColumnDef::new(Provider::Rut).string_len(12).not_null())
                    .col(ColumnDef::new(Provider::TradeName).string_len(255).not_null())
                    .col(ColumnDef::new(Provider::ContactEmail).string_len(254).not_null())
                    .col(ColumnDef::new(Provider::ContactPhone).string_len(255).not_null())
                    .col(ColumnDef::new(Provider::Address).string_len(255).not_null())
                    .col(ColumnDef::new(Provider::CommuneId).string_len(32))
                    .col(
                        ColumnDef::new(Provider::RegistryNumber)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Provider::SuppliesBiofuel)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Provider::ProvidesServices)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Provider::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Provider::ApprovedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Provider::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Provider::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_user")
                            .from(Provider::Table, Provider::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_commune")
                            .from(Provider::Table, Provider::CommuneId)
                            .to(Commune::Table, Commune::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Provider::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Provider {
    Table,
    Id,
    UserId,
    LegalName,
    Rut,
    TradeName,
    ContactEmail,
    ContactPhone,
    Address,
    CommuneId,
    RegistryNumber,
    SuppliesBiofuel,
    ProvidesServices,
    Status,
    ApprovedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Commune {
    Table,
    Id,
}
