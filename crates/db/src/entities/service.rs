//! Service entity (offering by a service provider).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    #[sea_orm(string_value = "cutting")]
    Cutting,
    #[sea_orm(string_value = "chopping")]
    Chopping,
    #[sea_orm(string_value = "transport")]
    Transport,
    /// Stove and flue cleaning
    #[sea_orm(string_value = "flue_cleaning")]
    FlueCleaning,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub provider_id: String,

    pub kind: ServiceKind,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Base price in Chilean pesos
    pub base_price_clp: i64,

    /// e.g. "trip", "hour", "m3 transported"
    pub price_unit: String,

    /// Commune IDs covered (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub coverage_commune_ids: Json,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::provider::Entity",
        from = "Column::ProviderId",
        to = "super::provider::Column::Id",
        on_delete = "Cascade"
    )]
    Provider,
}

impl Related<super::provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
