//! Create `role_request` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoleRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoleRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoleRequest::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(RoleRequest::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(RoleRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(RoleRequest::TradeName)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RoleRequest::LineOfBusiness)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RoleRequest::SalePointAddress)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RoleRequest::AcceptsBiofuelLaw)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RoleRequest::City)
                            .string_len(100)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RoleRequest::ContactInfo)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RoleRequest::ServicesOffered)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RoleRequest::AcceptsTerms)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(RoleRequest::Extra).json_binary())
                    .col(
                        ColumnDef::new(RoleRequest::AdminComment)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(RoleRequest::ResolvedBy).string_len(32))
                    .col(
                        ColumnDef::new(RoleRequest::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(RoleRequest::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_request_user")
                            .from(RoleRequest::Table, RoleRequest::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, submitted_at) for the latest-request fallback
        manager
            .create_index(
                Index::create()
                    .name("idx_role_request_user_submitted")
                    .table(RoleRequest::Table)
                    .col(RoleRequest::UserId)
                    .col(RoleRequest::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        // Index: status (admin review queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_role_request_status")
                    .table(RoleRequest::Table)
                    .col(RoleRequest::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoleRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RoleRequest {
    Table,
    Id,
    UserId,
    Kind,
    Status,
    TradeName,
    LineOfBusiness,
    SalePointAddress,
    AcceptsBiofuelLaw,
    City,
    ContactInfo,
    ServicesOffered,
    AcceptsTerms,
    Extra,
    AdminComment,
    ResolvedBy,
    SubmittedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
