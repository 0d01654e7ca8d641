//! Quiz question entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[sea_orm(string_value = "multiple_choice")]
    #[default]
    MultipleChoice,
    #[sea_orm(string_value = "true_false")]
    TrueFalse,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_question")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub content_id: String,

    #[sea_orm(column_type = "Text")]
    pub statement: String,

    pub kind: QuestionKind,

    /// Display order within the quiz (ascending)
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::educational_content::Entity",
        from = "Column::ContentId",
        to = "super::educational_content::Column::Id",
        on_delete = "Cascade"
    )]
    Content,

    #[sea_orm(has_many = "super::quiz_option::Entity")]
    Options,
}

impl Related<super::educational_content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl Related<super::quiz_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
