//! Commercial role request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::UserRole;

/// What the user asks to become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RoleRequestKind {
    /// Biofuel supplier (firewood, pellet, ...)
    #[sea_orm(string_value = "supplier")]
    Supplier,
    /// Service provider (transport, cutting, ...)
    #[sea_orm(string_value = "service_provider")]
    ServiceProvider,
    #[sea_orm(string_value = "both")]
    Both,
}

impl RoleRequestKind {
    /// Role tag granted when a request of this kind is approved.
    #[must_use]
    pub const fn granted_role(self) -> UserRole {
        match self {
            Self::Supplier => UserRole::Supplier,
            Self::ServiceProvider => UserRole::ServiceProvider,
            Self::Both => UserRole::Both,
        }
    }

    #[must_use]
    pub const fn supplies_biofuel(self) -> bool {
        matches!(self, Self::Supplier | Self::Both)
    }

    #[must_use]
    pub const fn provides_services(self) -> bool {
        matches!(self, Self::ServiceProvider | Self::Both)
    }
}

/// Review status. `Approved` and `Rejected` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RoleRequestStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl RoleRequestStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    pub kind: RoleRequestKind,

    pub status: RoleRequestStatus,

    // --- biofuel sales block ---
    /// Commerce name
    pub trade_name: String,

    /// Line of business, e.g. "dry firewood sales"
    pub line_of_business: String,

    /// Address of the point of sale
    pub sale_point_address: String,

    /// Declares compliance with the biofuel law
    pub accepts_biofuel_law: bool,

    // --- services block ---
    /// Main city where services are offered
    pub city: String,

    /// Phone and/or email for contact
    pub contact_info: String,

    /// Free text, e.g. "transport, stove installation, flue cleaning"
    pub services_offered: String,

    pub accepts_terms: bool,

    /// Extension bag (`registry_number`, ...)
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub extra: Option<Json>,

    #[sea_orm(column_type = "Text")]
    pub admin_comment: String,

    /// Admin who resolved the request
    #[sea_orm(nullable)]
    pub resolved_by: Option<String>,

    pub submitted_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Registry number carried in the extension bag, if any.
    #[must_use]
    pub fn registry_number(&self) -> Option<&str> {
        self.extra
            .as_ref()
            .and_then(|extra| extra.get("registry_number"))
            .and_then(Json::as_str)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
