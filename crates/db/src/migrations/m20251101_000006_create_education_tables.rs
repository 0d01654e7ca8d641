//! Create educational content and quiz tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EducationalContent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EducationalContent::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EducationalContent::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EducationalContent::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(EducationalContent::Summary)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(EducationalContent::Body).text().not_null())
                    .col(
                        ColumnDef::new(EducationalContent::Topic)
                            .string_len(100)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(EducationalContent::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(EducationalContent::AuthorId).string_len(32))
                    .col(
                        ColumnDef::new(EducationalContent::PublishedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(EducationalContent::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_educational_content_author")
                            .from(EducationalContent::Table, EducationalContent::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuizQuestion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizQuestion::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuizQuestion::ContentId).string_len(32).not_null())
                    .col(ColumnDef::new(QuizQuestion::Statement).text().not_null())
                    .col(ColumnDef::new(QuizQuestion::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(QuizQuestion::Position)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_question_content")
                            .from(QuizQuestion::Table, QuizQuestion::ContentId)
                            .to(EducationalContent::Table, EducationalContent::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuizOption::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizOption::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuizOption::QuestionId).string_len(32).not_null())
                    .col(ColumnDef::new(QuizOption::Text).string_len(255).not_null())
                    .col(
                        ColumnDef::new(QuizOption::IsCorrect)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_option_question")
                            .from(QuizOption::Table, QuizOption::QuestionId)
                            .to(QuizQuestion::Table, QuizQuestion::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuizAttempt::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizAttempt::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuizAttempt::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(QuizAttempt::ContentId).string_len(32).not_null())
                    .col(ColumnDef::new(QuizAttempt::Score).integer().not_null())
                    .col(ColumnDef::new(QuizAttempt::TotalQuestions).integer().not_null())
                    .col(
                        ColumnDef::new(QuizAttempt::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_attempt_user")
                            .from(QuizAttempt::Table, QuizAttempt::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_attempt_content")
                            .from(QuizAttempt::Table, QuizAttempt::ContentId)
                            .to(EducationalContent::Table, EducationalContent::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (content_id, position) for ordered quiz loading
        manager
            .create_index(
                Index::create()
                    .name("idx_quiz_question_content_position")
                    .table(QuizQuestion::Table)
                    .col(QuizQuestion::ContentId)
                    .col(QuizQuestion::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QuizAttempt::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuizOption::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuizQuestion::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EducationalContent::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EducationalContent {
    Table,
    Id,
    Title,
    Slug,
    Summary,
    Body,
    Topic,
    IsActive,
    AuthorId,
    PublishedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum QuizQuestion {
    Table,
    Id,
    ContentId,
    Statement,
    Kind,
    Position,
}

#[derive(Iden)]
enum QuizOption {
    Table,
    Id,
    QuestionId,
    Text,
    IsCorrect,
}

#[derive(Iden)]
enum QuizAttempt {
    Table,
    Id,
    UserId,
    ContentId,
    Score,
    TotalQuestions,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
