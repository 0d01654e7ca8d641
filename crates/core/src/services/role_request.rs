//! Commercial role request workflow.
//!
//! A user asks to become a biofuel supplier, a service provider, or both.
//! Requests start `Pending` and are resolved once by an administrator.
//! Approval creates or refreshes the user's provider record; rejection or a
//! new submission withdraws commercial access and hides every product and
//! service the provider listed. Each operation runs in a single transaction.

use ecocomb_common::{AppError, AppResult};
use ecocomb_db::{
    entities::{
        Product, Provider, RoleRequest, Service, User, product, provider,
        provider::ProviderStatus,
        role_request::{self, RoleRequestKind, RoleRequestStatus},
        service, user,
        user::UserRole,
    },
    repositories::RoleRequestRepository,
};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
    sea_query::Expr,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// National ID recorded on a provider whose owner never registered a RUT.
pub const PLACEHOLDER_RUT: &str = "11.111.111-1";

/// Administrator decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveAction {
    Approve,
    Reject,
}

impl ResolveAction {
    /// Parse the wire value (`approve` or `reject`).
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(AppError::InvalidAction(format!(
                "unknown action '{other}', expected approve or reject"
            ))),
        }
    }

    #[must_use]
    pub const fn resulting_status(self) -> RoleRequestStatus {
        match self {
            Self::Approve => RoleRequestStatus::Approved,
            Self::Reject => RoleRequestStatus::Rejected,
        }
    }
}

/// Input for submitting a role request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRoleRequestInput {
    pub kind: RoleRequestKind,

    #[validate(length(max = 255))]
    pub trade_name: Option<String>,

    #[validate(length(max = 255))]
    pub line_of_business: Option<String>,

    #[validate(length(max = 255))]
    pub sale_point_address: Option<String>,

    #[serde(default)]
    pub accepts_biofuel_law: bool,

    #[validate(length(max = 100))]
    pub city: Option<String>,

    #[validate(length(max = 255))]
    pub contact_info: Option<String>,

    #[validate(length(max = 2048))]
    pub services_offered: Option<String>,

    #[serde(default)]
    pub accepts_terms: bool,

    /// Firewood seller registry number, kept in the extension bag.
    #[validate(length(max = 64))]
    pub registry_number: Option<String>,
}

impl SubmitRoleRequestInput {
    /// Input carrying only the kind.
    #[must_use]
    pub const fn new(kind: RoleRequestKind) -> Self {
        Self {
            kind,
            trade_name: None,
            line_of_business: None,
            sale_point_address: None,
            accepts_biofuel_law: false,
            city: None,
            contact_info: None,
            services_offered: None,
            accepts_terms: false,
            registry_number: None,
        }
    }

    fn extra(&self) -> Option<serde_json::Value> {
        self.registry_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| serde_json::json!({ "registry_number": n }))
    }
}

/// Role request service.
#[derive(Clone)]
pub struct RoleRequestService {
    db: Arc<DatabaseConnection>,
    role_request_repo: RoleRequestRepository,
}

impl RoleRequestService {
    /// Create a new role request service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            role_request_repo: RoleRequestRepository::new(db.clone()),
            db,
        }
    }

    /// Submit a new request and withdraw any commercial access the user had.
    pub async fn submit(
        &self,
        user_id: &str,
        input: SubmitRoleRequestInput,
    ) -> AppResult<role_request::Model> {
        input.validate()?;

        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        let extra = input.extra();
        let txn = self.db.begin().await.map_err(db_err)?;

        User::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

        let request = role_request::ActiveModel {
            id: Set(crate::generate_id()),
            user_id: Set(user_id.to_string()),
            kind: Set(input.kind),
            status: Set(RoleRequestStatus::Pending),
            trade_name: Set(text(input.trade_name)),
            line_of_business: Set(text(input.line_of_business)),
            sale_point_address: Set(text(input.sale_point_address)),
            accepts_biofuel_law: Set(input.accepts_biofuel_law),
            city: Set(text(input.city)),
            contact_info: Set(text(input.contact_info)),
            services_offered: Set(text(input.services_offered)),
            accepts_terms: Set(input.accepts_terms),
            extra: Set(extra),
            admin_comment: Set(String::new()),
            resolved_by: Set(None),
            submitted_at: Set(now),
            resolved_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        deactivate_commercial(&txn, user_id, now).await?;

        User::update_many()
            .col_expr(
                user::Column::CurrentRoleRequestId,
                Expr::value(Some(request.id.clone())),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            user_id = %user_id,
            request_id = %request.id,
            kind = ?request.kind,
            "Role request submitted"
        );

        Ok(request)
    }

    /// Resolve a pending request.
    ///
    /// A request is resolved once. Only the user's current request can be
    /// approved; a request replaced by a newer submission can still be
    /// rejected, which closes it without touching the user's access.
    pub async fn resolve(
        &self,
        request_id: &str,
        action: ResolveAction,
        comment: &str,
        admin_id: &str,
    ) -> AppResult<role_request::Model> {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;

        let request = RoleRequest::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Role request: {request_id}")))?;

        if request.status != RoleRequestStatus::Pending {
            return Err(AppError::Conflict(format!(
                "role request already {}",
                request.status.as_str()
            )));
        }

        let owner = User::find_by_id(request.user_id.clone())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::UserNotFound(request.user_id.clone()))?;

        let is_current =
            current_request_id(&txn, &owner).await?.as_deref() == Some(request.id.as_str());
        if !is_current && action == ResolveAction::Approve {
            return Err(AppError::Conflict(
                "role request was superseded by a newer submission".to_string(),
            ));
        }

        let mut active: role_request::ActiveModel = request.into();
        active.status = Set(action.resulting_status());
        active.resolved_at = Set(Some(now));
        active.admin_comment = Set(comment.trim().to_string());
        active.resolved_by = Set(Some(admin_id.to_string()));
        let request = active.update(&txn).await.map_err(db_err)?;

        match action {
            ResolveAction::Approve => {
                set_role(&txn, &owner.id, request.kind.granted_role()).await?;
                let provider = upsert_provider(&txn, &request, &owner, now).await?;
                info!(
                    user_id = %owner.id,
                    provider_id = %provider.id,
                    supplies_biofuel = provider.supplies_biofuel,
                    provides_services = provider.provides_services,
                    "Provider activated"
                );
            }
            ResolveAction::Reject if is_current => {
                deactivate_commercial(&txn, &owner.id, now).await?;
            }
            ResolveAction::Reject => {
                info!(request_id = %request.id, "Superseded role request closed");
            }
        }

        txn.commit().await.map_err(db_err)?;

        info!(
            request_id = %request.id,
            admin_id = %admin_id,
            status = request.status.as_str(),
            "Role request resolved"
        );

        Ok(request)
    }

    /// The request the workflow currently acts on for a user.
    pub async fn current_for_user(
        &self,
        user: &user::Model,
    ) -> AppResult<Option<role_request::Model>> {
        if let Some(id) = &user.current_role_request_id {
            if let Some(request) = self.role_request_repo.find_by_id(id).await? {
                return Ok(Some(request));
            }
        }

        self.role_request_repo.find_latest_by_user(&user.id).await
    }

    /// Get a request by ID.
    pub async fn get(&self, id: &str) -> AppResult<role_request::Model> {
        self.role_request_repo.get_by_id(id).await
    }

    /// List requests for review with optional status filter.
    pub async fn list(
        &self,
        status: Option<RoleRequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<role_request::Model>> {
        self.role_request_repo
            .find_by_status(status, limit, offset)
            .await
    }

    /// Count requests awaiting review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.role_request_repo
            .count_by_status(RoleRequestStatus::Pending)
            .await
    }
}

/// Provider columns derived from a request and its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFields {
    pub legal_name: String,
    pub rut: String,
    pub trade_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub commune_id: Option<String>,
    pub registry_number: String,
}

impl ProviderFields {
    /// Values for a provider created from `request`.
    #[must_use]
    pub fn seed(request: &role_request::Model, owner: &user::Model) -> Self {
        let trade_name = non_empty(&request.trade_name);
        let display_name = owner.display_name();

        Self {
            legal_name: trade_name
                .or_else(|| non_empty(&display_name))
                .unwrap_or(owner.username.as_str())
                .to_string(),
            rut: owner_rut(owner).unwrap_or(PLACEHOLDER_RUT).to_string(),
            trade_name: trade_name.unwrap_or(owner.username.as_str()).to_string(),
            contact_email: owner.email.trim().to_string(),
            contact_phone: request.contact_info.trim().to_string(),
            address: request.sale_point_address.trim().to_string(),
            commune_id: owner.commune_id.clone(),
            registry_number: request.registry_number().unwrap_or_default().trim().to_string(),
        }
    }

    /// Values for an existing provider refreshed from `request`.
    ///
    /// Empty sources keep the stored value.
    #[must_use]
    pub fn merge(
        existing: &provider::Model,
        request: &role_request::Model,
        owner: &user::Model,
    ) -> Self {
        let keep = |source: Option<&str>, current: &str| {
            source.map_or_else(|| current.to_string(), str::to_string)
        };
        let trade_name = non_empty(&request.trade_name);

        Self {
            legal_name: if existing.legal_name.trim().is_empty() {
                keep(trade_name, &existing.legal_name)
            } else {
                existing.legal_name.clone()
            },
            rut: keep(owner_rut(owner), &existing.rut),
            trade_name: keep(trade_name, &existing.trade_name),
            contact_email: keep(non_empty(&owner.email), &existing.contact_email),
            contact_phone: keep(non_empty(&request.contact_info), &existing.contact_phone),
            address: keep(non_empty(&request.sale_point_address), &existing.address),
            commune_id: owner
                .commune_id
                .clone()
                .or_else(|| existing.commune_id.clone()),
            registry_number: keep(
                request.registry_number().and_then(non_empty),
                &existing.registry_number,
            ),
        }
    }
}

/// Create or refresh the provider record for an approved request.
///
/// Capability flags follow the request kind and the provider becomes active.
pub async fn upsert_provider<C: ConnectionTrait>(
    conn: &C,
    request: &role_request::Model,
    owner: &user::Model,
    now: DateTimeWithTimeZone,
) -> AppResult<provider::Model> {
    let existing = Provider::find()
        .filter(provider::Column::UserId.eq(owner.id.as_str()))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(db_err)?;

    let kind: RoleRequestKind = request.kind;

    match existing {
        Some(existing) => {
            let fields = ProviderFields::merge(&existing, request, owner);
            let mut active: provider::ActiveModel = existing.into();
            active.legal_name = Set(fields.legal_name);
            active.rut = Set(fields.rut);
            active.trade_name = Set(fields.trade_name);
            active.contact_email = Set(fields.contact_email);
            active.contact_phone = Set(fields.contact_phone);
            active.address = Set(fields.address);
            active.commune_id = Set(fields.commune_id);
            active.registry_number = Set(fields.registry_number);
            active.supplies_biofuel = Set(kind.supplies_biofuel());
            active.provides_services = Set(kind.provides_services());
            active.status = Set(ProviderStatus::Active);
            active.approved_at = Set(Some(now));
            active.updated_at = Set(Some(now));
            active.update(conn).await.map_err(db_err)
        }
        None => {
            let fields = ProviderFields::seed(request, owner);
            provider::ActiveModel {
                id: Set(crate::generate_id()),
                user_id: Set(owner.id.clone()),
                legal_name: Set(fields.legal_name),
                rut: Set(fields.rut),
                trade_name: Set(fields.trade_name),
                contact_email: Set(fields.contact_email),
                contact_phone: Set(fields.contact_phone),
                address: Set(fields.address),
                commune_id: Set(fields.commune_id),
                registry_number: Set(fields.registry_number),
                supplies_biofuel: Set(kind.supplies_biofuel()),
                provides_services: Set(kind.provides_services()),
                status: Set(ProviderStatus::Active),
                approved_at: Set(Some(now)),
                created_at: Set(now),
                updated_at: Set(None),
            }
            .insert(conn)
            .await
            .map_err(db_err)
        }
    }
}

/// Withdraw a user's commercial access.
///
/// The provider (if any) becomes inactive with both capability flags cleared,
/// all of its products and services are hidden, and the role tag goes back
/// to `User`. Returns the deactivated provider.
pub async fn deactivate_commercial<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    now: DateTimeWithTimeZone,
) -> AppResult<Option<provider::Model>> {
    let existing = Provider::find()
        .filter(provider::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(db_err)?;

    let deactivated = match existing {
        Some(existing) => {
            let provider_id = existing.id.clone();

            let mut active: provider::ActiveModel = existing.into();
            active.status = Set(ProviderStatus::Inactive);
            active.supplies_biofuel = Set(false);
            active.provides_services = Set(false);
            active.updated_at = Set(Some(now));
            let provider = active.update(conn).await.map_err(db_err)?;

            let products = Product::update_many()
                .col_expr(product::Column::IsActive, Expr::value(false))
                .col_expr(product::Column::UpdatedAt, Expr::value(Some(now)))
                .filter(product::Column::ProviderId.eq(provider_id.as_str()))
                .exec(conn)
                .await
                .map_err(db_err)?;

            let services = Service::update_many()
                .col_expr(service::Column::IsActive, Expr::value(false))
                .col_expr(service::Column::UpdatedAt, Expr::value(Some(now)))
                .filter(service::Column::ProviderId.eq(provider_id.as_str()))
                .exec(conn)
                .await
                .map_err(db_err)?;

            info!(
                user_id = %user_id,
                provider_id = %provider_id,
                products = products.rows_affected,
                services = services.rows_affected,
                "Commercial access withdrawn"
            );

            Some(provider)
        }
        None => None,
    };

    set_role(conn, user_id, UserRole::User).await?;

    Ok(deactivated)
}

async fn set_role<C: ConnectionTrait>(conn: &C, user_id: &str, role: UserRole) -> AppResult<()> {
    User::update_many()
        .col_expr(user::Column::Role, Expr::value(role.to_value()))
        .filter(user::Column::Id.eq(user_id))
        .exec(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

/// ID of the request the workflow acts on, read through `conn`.
async fn current_request_id<C: ConnectionTrait>(
    conn: &C,
    owner: &user::Model,
) -> AppResult<Option<String>> {
    if let Some(id) = &owner.current_role_request_id {
        return Ok(Some(id.clone()));
    }

    // Rows written before the user column existed
    let latest = RoleRequest::find()
        .filter(role_request::Column::UserId.eq(owner.id.as_str()))
        .order_by_desc(role_request::Column::SubmittedAt)
        .one(conn)
        .await
        .map_err(db_err)?;

    Ok(latest.map(|r| r.id))
}

fn owner_rut(owner: &user::Model) -> Option<&str> {
    owner
        .rut
        .as_deref()
        .and_then(non_empty)
        .filter(|rut| ecocomb_common::validate_rut(Some(rut)).is_ok())
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn db_err(e: sea_orm::DbErr) -> AppError {
    AppError::Database(e.to_string())
}
