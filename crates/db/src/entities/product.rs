//! Product entity (biofuel listing).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    #[sea_orm(string_value = "firewood")]
    Firewood,
    #[sea_orm(string_value = "pellet")]
    Pellet,
    #[sea_orm(string_value = "briquette")]
    Briquette,
    #[sea_orm(string_value = "charcoal")]
    Charcoal,
}

/// How the product is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ProductFormat {
    /// Stacked cubic meter ("metro ruma")
    #[sea_orm(string_value = "stacked_cubic_meter")]
    StackedCubicMeter,
    #[sea_orm(string_value = "bulk_cubic_meter")]
    BulkCubicMeter,
    #[sea_orm(string_value = "sack_15kg")]
    #[serde(rename = "sack_15kg")]
    Sack15Kg,
    #[sea_orm(string_value = "sack_20kg")]
    #[serde(rename = "sack_20kg")]
    Sack20Kg,
    #[sea_orm(string_value = "sack_25kg")]
    #[serde(rename = "sack_25kg")]
    Sack25Kg,
    #[sea_orm(string_value = "bag")]
    Bag,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Unit the price is charged per.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SaleUnit {
    #[sea_orm(string_value = "m3")]
    M3,
    #[sea_orm(string_value = "sack")]
    Sack,
    #[sea_orm(string_value = "kg")]
    Kg,
    #[sea_orm(string_value = "bag")]
    Bag,
    #[sea_orm(string_value = "pallet")]
    Pallet,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub provider_id: String,

    pub kind: ProductKind,

    /// Wood species, e.g. "eucalyptus"
    pub species: String,

    /// Approximate moisture content, in percent
    #[sea_orm(nullable)]
    pub moisture_percent: Option<f64>,

    pub format: ProductFormat,

    pub unit: SaleUnit,

    /// Price per unit in Chilean pesos
    pub unit_price_clp: i64,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(nullable)]
    pub commune_id: Option<String>,

    #[sea_orm(nullable)]
    pub stock: Option<i32>,

    /// Registry-certified dry firewood
    pub registry_certified: bool,

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
