//! Educational content and quiz repository.

use std::sync::Arc;

use crate::entities::{
    EducationalContent, QuizAttempt, QuizOption, QuizQuestion, educational_content, quiz_attempt,
    quiz_option, quiz_question,
};
use ecocomb_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

/// Education repository for database operations.
#[derive(Clone)]
pub struct EducationRepository {
    db: Arc<DatabaseConnection>,
}

impl EducationRepository {
    /// Create a new education repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // === Content ===

    /// Find content by ID.
    pub async fn find_content_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<educational_content::Model>> {
        EducationalContent::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get content by ID, returning an error if not found.
    pub async fn get_content_by_id(&self, id: &str) -> AppResult<educational_content::Model> {
        self.find_content_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content: {id}")))
    }

    /// Find content by slug.
    pub async fn find_content_by_slug(
        &self,
        slug: &str,
    ) -> AppResult<Option<educational_content::Model>> {
        EducationalContent::find()
            .filter(educational_content::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Content listing, newest first. `active_only` hides drafts.
    pub async fn find_contents(
        &self,
        active_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<educational_content::Model>> {
        let mut query = EducationalContent::find();

        if active_only {
            query = query.filter(educational_content::Column::IsActive.eq(true));
        }

        query
            .order_by_desc(educational_content::Column::PublishedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create content.
    pub async fn create_content(
        &self,
        model: educational_content::ActiveModel,
    ) -> AppResult<educational_content::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update content.
    pub async fn update_content(
        &self,
        model: educational_content::ActiveModel,
    ) -> AppResult<educational_content::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete content. Questions, options and attempts cascade.
    pub async fn delete_content(&self, id: &str) -> AppResult<()> {
        EducationalContent::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // === Quiz ===

    /// Questions of a content ordered by position.
    pub async fn find_questions(&self, content_id: &str) -> AppResult<Vec<quiz_question::Model>> {
        QuizQuestion::find()
            .filter(quiz_question::Column::ContentId.eq(content_id))
            .order_by_asc(quiz_question::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a question by ID.
    pub async fn find_question_by_id(&self, id: &str) -> AppResult<Option<quiz_question::Model>> {
        QuizQuestion::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Options of the given questions.
    pub async fn find_options(&self, question_ids: &[String]) -> AppResult<Vec<quiz_option::Model>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        QuizOption::find()
            .filter(quiz_option::Column::QuestionId.is_in(question_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a question together with its options in one transaction.
    pub async fn create_question(
        &self,
        question: quiz_question::ActiveModel,
        options: Vec<quiz_option::ActiveModel>,
    ) -> AppResult<(quiz_question::Model, Vec<quiz_option::Model>)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let question = question
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut inserted = Vec::with_capacity(options.len());
        for option in options {
            inserted.push(
                option
                    .insert(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?,
            );
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((question, inserted))
    }

    /// Delete a question. Its options cascade.
    pub async fn delete_question(&self, id: &str) -> AppResult<()> {
        QuizQuestion::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // === Attempts ===

    /// Store a graded attempt.
    pub async fn create_attempt(
        &self,
        model: quiz_attempt::ActiveModel,
    ) -> AppResult<quiz_attempt::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Attempts of a user on a content, newest first.
    pub async fn find_attempts(
        &self,
        user_id: &str,
        content_id: &str,
    ) -> AppResult<Vec<quiz_attempt::Model>> {
        QuizAttempt::find()
            .filter(quiz_attempt::Column::UserId.eq(user_id))
            .filter(quiz_attempt::Column::ContentId.eq(content_id))
            .order_by_desc(quiz_attempt::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
