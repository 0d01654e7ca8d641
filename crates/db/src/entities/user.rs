//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Commercial role tag of a user.
///
/// Mirrors the capability flags of the user's provider record: it is set from
/// the role request kind on approval and reset to `User` whenever commercial
/// access is withdrawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "user")]
    #[default]
    User,
    #[sea_orm(string_value = "supplier")]
    Supplier,
    #[sea_orm(string_value = "service")]
    #[serde(rename = "service")]
    ServiceProvider,
    #[sea_orm(string_value = "both")]
    Both,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Access token
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    pub first_name: String,

    pub last_name: String,

    /// Personal RUT (not the business one)
    #[sea_orm(nullable)]
    pub rut: Option<String>,

    #[sea_orm(nullable)]
    pub region_id: Option<String>,

    #[sea_orm(nullable)]
    pub commune_id: Option<String>,

    pub role: UserRole,

    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    #[sea_orm(default_value = false)]
    pub email_verified: bool,

    #[sea_orm(nullable)]
    pub email_verified_at: Option<DateTimeWithTimeZone>,

    /// Set once the email verification window has lapsed
    #[sea_orm(default_value = false)]
    pub is_blocked: bool,

    /// Role request the workflow currently acts on
    #[sea_orm(nullable)]
    pub current_role_request_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// First and last name joined, empty when neither is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::role_request::Entity")]
    RoleRequests,

    #[sea_orm(has_one = "super::provider::Entity")]
    Provider,

    #[sea_orm(
        belongs_to = "super::commune::Entity",
        from = "Column::CommuneId",
        to = "super::commune::Column::Id",
        on_delete = "SetNull"
    )]
    Commune,
}

impl Related<super::role_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleRequests.def()
    }
}

impl Related<super::provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl Related<super::commune::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commune.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
