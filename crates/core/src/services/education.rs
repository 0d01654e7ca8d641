//! Educational content and quizzes.

use std::collections::HashMap;

use chrono::Utc;
use ecocomb_common::{AppError, AppResult};
use ecocomb_db::{
    entities::{
        educational_content, quiz_attempt, quiz_option,
        quiz_question::{self, QuestionKind},
    },
    repositories::EducationRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

/// Input for publishing content.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1, max = 255), custom(function = "validate_slug"))]
    pub slug: String,

    #[validate(length(max = 1000))]
    pub summary: Option<String>,

    #[validate(length(min = 1))]
    pub body: String,

    #[validate(length(max = 100))]
    pub topic: Option<String>,

    pub is_active: Option<bool>,
}

/// Input for editing content.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 255), custom(function = "validate_slug"))]
    pub slug: Option<String>,

    #[validate(length(max = 1000))]
    pub summary: Option<String>,

    #[validate(length(min = 1))]
    pub body: Option<String>,

    #[validate(length(max = 100))]
    pub topic: Option<String>,

    pub is_active: Option<bool>,
}

/// One answer option of a new question.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OptionInput {
    #[validate(length(min = 1, max = 255))]
    pub text: String,

    #[serde(default)]
    pub is_correct: bool,
}

/// Input for adding a quiz question.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionInput {
    #[validate(length(min = 1, max = 2000))]
    pub statement: String,

    #[serde(default)]
    pub kind: QuestionKind,

    /// Appended after the last question when absent.
    pub position: Option<i32>,

    #[validate(length(min = 1, max = 10), nested, custom(function = "validate_has_correct"))]
    pub options: Vec<OptionInput>,
}

/// Quiz option as shown to learners.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicOption {
    pub id: String,
    pub text: String,
}

/// Quiz question as shown to learners.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub statement: String,
    pub kind: QuestionKind,
    pub position: i32,
    pub options: Vec<PublicOption>,
}

/// A content's quiz without the answer key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub content_id: String,
    pub title: String,
    pub questions: Vec<PublicQuestion>,
}

/// A question with its options, answer key included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: quiz_question::Model,
    pub options: Vec<quiz_option::Model>,
}

/// Education service.
#[derive(Clone)]
pub struct EducationService {
    education_repo: EducationRepository,
}

impl EducationService {
    #[must_use]
    pub const fn new(education_repo: EducationRepository) -> Self {
        Self { education_repo }
    }

    // === Public ===

    /// Active content, newest first.
    pub async fn list_published(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<educational_content::Model>> {
        self.education_repo.find_contents(true, limit, offset).await
    }

    /// Active content by slug.
    pub async fn get_published(&self, slug: &str) -> AppResult<educational_content::Model> {
        self.education_repo
            .find_content_by_slug(slug)
            .await?
            .filter(|content| content.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Content: {slug}")))
    }

    /// The quiz of an active content, answer key stripped.
    pub async fn quiz(&self, slug: &str) -> AppResult<QuizView> {
        let content = self.get_published(slug).await?;
        let questions = self.questions_with_options(&content.id).await?;

        Ok(QuizView {
            content_id: content.id,
            title: content.title,
            questions: questions
                .into_iter()
                .map(|q| PublicQuestion {
                    id: q.question.id,
                    statement: q.question.statement,
                    kind: q.question.kind,
                    position: q.question.position,
                    options: q
                        .options
                        .into_iter()
                        .map(|o| PublicOption {
                            id: o.id,
                            text: o.text,
                        })
                        .collect(),
                })
                .collect(),
        })
    }

    /// Grade and store an attempt. `answers` maps question ID to option ID.
    pub async fn submit_attempt(
        &self,
        user_id: &str,
        slug: &str,
        answers: &HashMap<String, String>,
    ) -> AppResult<quiz_attempt::Model> {
        let content = self.get_published(slug).await?;
        let questions = self.questions_with_options(&content.id).await?;

        if questions.is_empty() {
            return Err(AppError::BadRequest("This content has no quiz".to_string()));
        }

        let score = grade(&questions, answers);
        let total = i32::try_from(questions.len())
            .map_err(|_| AppError::Internal("Too many questions".to_string()))?;

        let attempt = self
            .education_repo
            .create_attempt(quiz_attempt::ActiveModel {
                id: Set(crate::generate_id()),
                user_id: Set(user_id.to_string()),
                content_id: Set(content.id.clone()),
                score: Set(score),
                total_questions: Set(total),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        info!(
            user_id = %user_id,
            content_id = %content.id,
            score,
            total,
            "Quiz attempt graded"
        );

        Ok(attempt)
    }

    // === Admin ===

    /// All content including drafts.
    pub async fn list_all(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<educational_content::Model>> {
        self.education_repo.find_contents(false, limit, offset).await
    }

    pub async fn create_content(
        &self,
        author_id: &str,
        input: CreateContentInput,
    ) -> AppResult<educational_content::Model> {
        input.validate()?;
        self.ensure_slug_free(&input.slug, None).await?;

        let content = self
            .education_repo
            .create_content(educational_content::ActiveModel {
                id: Set(crate::generate_id()),
                title: Set(input.title.trim().to_string()),
                slug: Set(input.slug),
                summary: Set(input.summary.unwrap_or_default()),
                body: Set(input.body),
                topic: Set(input.topic.unwrap_or_default().trim().to_string()),
                is_active: Set(input.is_active.unwrap_or(true)),
                author_id: Set(Some(author_id.to_string())),
                published_at: Set(Utc::now().into()),
                updated_at: Set(None),
            })
            .await?;

        info!(content_id = %content.id, slug = %content.slug, "Content published");
        Ok(content)
    }

    pub async fn update_content(
        &self,
        id: &str,
        input: UpdateContentInput,
    ) -> AppResult<educational_content::Model> {
        input.validate()?;
        let content = self.education_repo.get_content_by_id(id).await?;

        if let Some(slug) = &input.slug {
            self.ensure_slug_free(slug, Some(&content.id)).await?;
        }

        let mut active: educational_content::ActiveModel = content.into();

        if let Some(title) = input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        if let Some(summary) = input.summary {
            active.summary = Set(summary);
        }
        if let Some(body) = input.body {
            active.body = Set(body);
        }
        if let Some(topic) = input.topic {
            active.topic = Set(topic.trim().to_string());
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.education_repo.update_content(active).await
    }

    pub async fn delete_content(&self, id: &str) -> AppResult<()> {
        self.education_repo.get_content_by_id(id).await?;
        self.education_repo.delete_content(id).await?;
        info!(content_id = %id, "Content deleted");
        Ok(())
    }

    /// Add a question with its options.
    pub async fn add_question(
        &self,
        content_id: &str,
        input: AddQuestionInput,
    ) -> AppResult<QuestionWithOptions> {
        input.validate()?;
        self.education_repo.get_content_by_id(content_id).await?;

        let position = match input.position {
            Some(position) => position,
            None => self
                .education_repo
                .find_questions(content_id)
                .await?
                .last()
                .map_or(1, |q| q.position + 1),
        };

        let question_id = crate::generate_id();
        let question = quiz_question::ActiveModel {
            id: Set(question_id.clone()),
            content_id: Set(content_id.to_string()),
            statement: Set(input.statement.trim().to_string()),
            kind: Set(input.kind),
            position: Set(position),
        };
        let options = input
            .options
            .into_iter()
            .map(|o| quiz_option::ActiveModel {
                id: Set(crate::generate_id()),
                question_id: Set(question_id.clone()),
                text: Set(o.text.trim().to_string()),
                is_correct: Set(o.is_correct),
            })
            .collect();

        let (question, options) = self
            .education_repo
            .create_question(question, options)
            .await?;

        Ok(QuestionWithOptions { question, options })
    }

    pub async fn delete_question(&self, id: &str) -> AppResult<()> {
        self.education_repo
            .find_question_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question: {id}")))?;
        self.education_repo.delete_question(id).await
    }

    /// Questions of a content in order, each with its options.
    pub async fn questions_with_options(
        &self,
        content_id: &str,
    ) -> AppResult<Vec<QuestionWithOptions>> {
        let questions = self.education_repo.find_questions(content_id).await?;
        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let mut options_by_question: HashMap<String, Vec<quiz_option::Model>> = HashMap::new();

        for option in self.education_repo.find_options(&ids).await? {
            options_by_question
                .entry(option.question_id.clone())
                .or_default()
                .push(option);
        }

        Ok(questions
            .into_iter()
            .map(|question| QuestionWithOptions {
                options: options_by_question.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect())
    }

    async fn ensure_slug_free(&self, slug: &str, except_id: Option<&str>) -> AppResult<()> {
        match self.education_repo.find_content_by_slug(slug).await? {
            Some(existing) if Some(existing.id.as_str()) != except_id => Err(AppError::Conflict(
                format!("Slug already in use: {slug}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Number of questions whose chosen option is a correct option of that question.
#[must_use]
pub fn grade(questions: &[QuestionWithOptions], answers: &HashMap<String, String>) -> i32 {
    let correct = questions
        .iter()
        .filter(|q| {
            answers.get(&q.question.id).is_some_and(|chosen| {
                q.options
                    .iter()
                    .any(|o| &o.id == chosen && o.is_correct)
            })
        })
        .count();

    i32::try_from(correct).unwrap_or(i32::MAX)
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !slug.starts_with('-')
        && !slug.ends_with('-');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

fn validate_has_correct(options: &[OptionInput]) -> Result<(), ValidationError> {
    if options.iter().any(|o| o.is_correct) {
        Ok(())
    } else {
        let mut error = ValidationError::new("no_correct_option");
        error.message = Some("At least one option must be correct".into());
        Err(error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn question(id: &str, correct: &str, wrong: &str) -> QuestionWithOptions {
        QuestionWithOptions {
            question: quiz_question::Model {
                id: id.to_string(),
                content_id: "c1".to_string(),
                statement: format!("Pregunta {id}"),
                kind: QuestionKind::MultipleChoice,
                position: 1,
            },
            options: vec![
                quiz_option::Model {
                    id: correct.to_string(),
                    question_id: id.to_string(),
                    text: "Correcta".to_string(),
                    is_correct: true,
                },
                quiz_option::Model {
                    id: wrong.to_string(),
                    question_id: id.to_string(),
                    text: "Incorrecta".to_string(),
                    is_correct: false,
                },
            ],
        }
    }

    #[test]
    fn test_grade_counts_correct_answers() {
        let questions = vec![question("q1", "a", "b"), question("q2", "c", "d")];

        let answers = HashMap::from([
            ("q1".to_string(), "a".to_string()),
            ("q2".to_string(), "d".to_string()),
        ]);
        assert_eq!(grade(&questions, &answers), 1);

        let answers = HashMap::from([
            ("q1".to_string(), "a".to_string()),
            ("q2".to_string(), "c".to_string()),
        ]);
        assert_eq!(grade(&questions, &answers), 2);
    }

    #[test]
    fn test_grade_ignores_options_of_other_questions() {
        let questions = vec![question("q1", "a", "b"), question("q2", "c", "d")];

        // "c" is correct, but for q2
        let answers = HashMap::from([("q1".to_string(), "c".to_string())]);
        assert_eq!(grade(&questions, &answers), 0);
    }

    #[test]
    fn test_grade_unanswered_is_zero() {
        let questions = vec![question("q1", "a", "b")];
        assert_eq!(grade(&questions, &HashMap::new()), 0);
    }

    #[test]
    fn test_question_needs_correct_option() {
        let input = AddQuestionInput {
            statement: "¿La leña verde entrega más calor?".to_string(),
            kind: QuestionKind::TrueFalse,
            position: None,
            options: vec![
                OptionInput {
                    text: "Verdadero".to_string(),
                    is_correct: false,
                },
                OptionInput {
                    text: "Falso".to_string(),
                    is_correct: false,
                },
            ],
        };
        assert!(input.validate().is_err());

        let mut input = input;
        input.options[1].is_correct = true;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_question_needs_options() {
        let input = AddQuestionInput {
            statement: "¿Qué es el SNCL?".to_string(),
            kind: QuestionKind::MultipleChoice,
            position: None,
            options: vec![],
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_question_option_limit() {
        let option = |i: usize| OptionInput {
            text: format!("Opción {i}"),
            is_correct: i == 0,
        };
        let mut input = AddQuestionInput {
            statement: "¿Qué especie seca más rápido?".to_string(),
            kind: QuestionKind::MultipleChoice,
            position: None,
            options: (0..10).map(option).collect(),
        };
        assert!(input.validate().is_ok());

        input.options.push(option(10));
        let errors = input.validate().unwrap_err();
        let field_errors = errors.field_errors();
        assert!(field_errors["options"].iter().any(|e| e.code == "length"));
    }

    #[test]
    fn test_slug_validation() {
        assert!(validate_slug("lena-seca-2025").is_ok());
        assert!(validate_slug("Leña Seca").is_err());
        assert!(validate_slug("-lena").is_err());
    }

    #[test]
    fn test_public_question_hides_answer_key() {
        let view = PublicQuestion {
            id: "q1".to_string(),
            statement: "¿?".to_string(),
            kind: QuestionKind::TrueFalse,
            position: 1,
            options: vec![PublicOption {
                id: "a".to_string(),
                text: "Verdadero".to_string(),
            }],
        };

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("isCorrect"));
        assert!(!json.contains("is_correct"));
    }
}
