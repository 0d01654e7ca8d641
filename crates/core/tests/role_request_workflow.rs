//! Role request workflow against a migrated in-memory database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use ecocomb_common::AppError;
use ecocomb_core::{
    CatalogService, CommercialService, CreateProductInput, CreateServiceInput, PLACEHOLDER_RUT,
    ResolveAction, RoleRequestService, SubmitRoleRequestInput, UpdateProductInput,
};
use ecocomb_db::{
    entities::{
        Product, Provider, RoleRequest, Service, User,
        product::{ProductFormat, ProductKind, SaleUnit},
        provider::{self, ProviderStatus},
        role_request::{self, RoleRequestKind, RoleRequestStatus},
        service::ServiceKind,
        user::{self, UserRole},
    },
    repositories::{ProductRepository, ProviderRepository, ServiceRepository},
    test_utils::memory_database,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

struct Harness {
    db: Arc<DatabaseConnection>,
    requests: RoleRequestService,
    catalog: CatalogService,
}

async fn harness() -> Harness {
    let db = Arc::new(memory_database().await.unwrap());
    let providers = ProviderRepository::new(db.clone());

    Harness {
        requests: RoleRequestService::new(db.clone()),
        catalog: CatalogService::new(
            db.clone(),
            ProductRepository::new(db.clone()),
            ServiceRepository::new(db.clone()),
            providers.clone(),
            CommercialService::new(providers),
        ),
        db,
    }
}

impl Harness {
    async fn insert_user(&self, id: &str) -> user::Model {
        user::ActiveModel {
            id: Set(id.to_string()),
            username: Set(id.to_string()),
            username_lower: Set(id.to_lowercase()),
            email: Set(format!("{id}@example.cl")),
            password_hash: Set("hash".to_string()),
            token: Set(Some(format!("token-{id}"))),
            first_name: Set("Juana".to_string()),
            last_name: Set("Huenchumil".to_string()),
            rut: Set(None),
            region_id: Set(None),
            commune_id: Set(None),
            role: Set(UserRole::User),
            is_admin: Set(false),
            email_verified: Set(true),
            email_verified_at: Set(None),
            is_blocked: Set(false),
            current_role_request_id: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await
        .unwrap()
    }

    async fn user(&self, id: &str) -> user::Model {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .unwrap()
            .unwrap()
    }

    async fn provider_of(&self, user_id: &str) -> Option<provider::Model> {
        Provider::find()
            .filter(provider::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .unwrap()
    }

    async fn approve(&self, user_id: &str, input: SubmitRoleRequestInput) -> role_request::Model {
        let request = self.requests.submit(user_id, input).await.unwrap();
        self.requests
            .resolve(&request.id, ResolveAction::Approve, "ok", "admin")
            .await
            .unwrap()
    }

    async fn active_listings(&self, provider_id: &str) -> (u64, u64) {
        let products = Product::find()
            .filter(ecocomb_db::entities::product::Column::ProviderId.eq(provider_id))
            .filter(ecocomb_db::entities::product::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .unwrap();
        let services = Service::find()
            .filter(ecocomb_db::entities::service::Column::ProviderId.eq(provider_id))
            .filter(ecocomb_db::entities::service::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .unwrap();
        (products, services)
    }
}

fn product_input() -> CreateProductInput {
    CreateProductInput {
        kind: ProductKind::Firewood,
        species: Some("hualle".to_string()),
        moisture_percent: Some(20.0),
        format: ProductFormat::StackedCubicMeter,
        unit: SaleUnit::M3,
        unit_price_clp: 48_000,
        description: None,
        commune_id: None,
        stock: Some(40),
        registry_certified: Some(true),
    }
}

fn service_input() -> CreateServiceInput {
    CreateServiceInput {
        kind: ServiceKind::Transport,
        name: "Flete de leña".to_string(),
        description: None,
        base_price_clp: 20_000,
        price_unit: "viaje".to_string(),
        coverage_commune_ids: vec![],
    }
}

#[tokio::test]
async fn test_submit_creates_pending_current_request() {
    let h = harness().await;
    h.insert_user("juana").await;

    let request = h
        .requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await
        .unwrap();

    assert_eq!(request.status, RoleRequestStatus::Pending);
    assert!(request.resolved_at.is_none());
    assert_eq!(request.admin_comment, "");

    let user = h.user("juana").await;
    assert_eq!(user.current_role_request_id.as_deref(), Some(request.id.as_str()));
    assert_eq!(user.role, UserRole::User);

    let current = h.requests.current_for_user(&user).await.unwrap().unwrap();
    assert_eq!(current.id, request.id);
}

#[tokio::test]
async fn test_submit_for_unknown_user_rolls_back() {
    let h = harness().await;

    let result = h
        .requests
        .submit("ghost", SubmitRoleRequestInput::new(RoleRequestKind::Both))
        .await;

    assert!(matches!(result, Err(AppError::UserNotFound(_))));
    assert_eq!(RoleRequest::find().count(h.db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_approve_creates_active_provider() {
    let h = harness().await;
    h.insert_user("juana").await;

    let mut input = SubmitRoleRequestInput::new(RoleRequestKind::Both);
    input.trade_name = Some("Leñas Huenchumil".to_string());
    input.contact_info = Some("+56 9 5555 0000".to_string());
    input.sale_point_address = Some("Caupolicán 1200".to_string());
    input.registry_number = Some("SNCL-0099".to_string());

    let request = h.approve("juana", input).await;

    assert_eq!(request.status, RoleRequestStatus::Approved);
    assert!(request.resolved_at.is_some());
    assert_eq!(request.admin_comment, "ok");
    assert_eq!(request.resolved_by.as_deref(), Some("admin"));

    let provider = h.provider_of("juana").await.unwrap();
    assert_eq!(provider.status, ProviderStatus::Active);
    assert!(provider.supplies_biofuel);
    assert!(provider.provides_services);
    assert!(provider.approved_at.is_some());
    assert_eq!(provider.trade_name, "Leñas Huenchumil");
    assert_eq!(provider.legal_name, "Leñas Huenchumil");
    assert_eq!(provider.rut, PLACEHOLDER_RUT);
    assert_eq!(provider.contact_email, "juana@example.cl");
    assert_eq!(provider.contact_phone, "+56 9 5555 0000");
    assert_eq!(provider.address, "Caupolicán 1200");
    assert_eq!(provider.registry_number, "SNCL-0099");

    assert_eq!(h.user("juana").await.role, UserRole::Both);
}

#[tokio::test]
async fn test_approve_sets_role_from_kind() {
    let h = harness().await;

    for (id, kind, role, biofuel, services) in [
        ("proveedora", RoleRequestKind::Supplier, UserRole::Supplier, true, false),
        (
            "prestador",
            RoleRequestKind::ServiceProvider,
            UserRole::ServiceProvider,
            false,
            true,
        ),
    ] {
        h.insert_user(id).await;
        h.approve(id, SubmitRoleRequestInput::new(kind)).await;

        let provider = h.provider_of(id).await.unwrap();
        assert_eq!(provider.supplies_biofuel, biofuel);
        assert_eq!(provider.provides_services, services);
        assert_eq!(h.user(id).await.role, role);
    }
}

#[tokio::test]
async fn test_reject_withdraws_access() {
    let h = harness().await;
    h.insert_user("juana").await;

    let request = h
        .requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await
        .unwrap();
    let request = h
        .requests
        .resolve(&request.id, ResolveAction::Reject, "  falta SNCL ", "admin")
        .await
        .unwrap();

    assert_eq!(request.status, RoleRequestStatus::Rejected);
    assert!(request.resolved_at.is_some());
    assert_eq!(request.admin_comment, "falta SNCL");
    assert!(h.provider_of("juana").await.is_none());
    assert_eq!(h.user("juana").await.role, UserRole::User);
}

#[tokio::test]
async fn test_new_submission_hides_listings() {
    let h = harness().await;
    h.insert_user("juana").await;
    h.approve("juana", SubmitRoleRequestInput::new(RoleRequestKind::Both))
        .await;

    h.catalog.create_product("juana", product_input()).await.unwrap();
    h.catalog.create_product("juana", product_input()).await.unwrap();
    h.catalog.create_service("juana", service_input()).await.unwrap();

    let provider = h.provider_of("juana").await.unwrap();
    assert_eq!(h.active_listings(&provider.id).await, (2, 1));

    h.requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await
        .unwrap();

    let provider = h.provider_of("juana").await.unwrap();
    assert_eq!(provider.status, ProviderStatus::Inactive);
    assert!(!provider.supplies_biofuel);
    assert!(!provider.provides_services);
    assert_eq!(h.active_listings(&provider.id).await, (0, 0));
    assert_eq!(h.user("juana").await.role, UserRole::User);

    let catalog = h.catalog.catalog(50, 0).await.unwrap();
    assert!(catalog.products.is_empty());
    assert!(catalog.services.is_empty());

    let refused = h.catalog.create_product("juana", product_input()).await;
    assert!(matches!(refused, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_reject_after_reapply_keeps_listings_hidden() {
    let h = harness().await;
    h.insert_user("juana").await;
    h.approve("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await;
    let product = h.catalog.create_product("juana", product_input()).await.unwrap();

    let second = h
        .requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await
        .unwrap();
    h.requests
        .resolve(&second.id, ResolveAction::Reject, "", "admin")
        .await
        .unwrap();

    let stored = Product::find_by_id(product.id.clone())
        .one(h.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_active);
    assert_eq!(
        h.provider_of("juana").await.unwrap().status,
        ProviderStatus::Inactive
    );
}

#[tokio::test]
async fn test_reapproval_lets_owner_relist() {
    let h = harness().await;
    h.insert_user("juana").await;
    h.approve("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await;
    let product = h.catalog.create_product("juana", product_input()).await.unwrap();

    h.approve("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await;

    // Approval restores the provider, not the listings
    let stored = Product::find_by_id(product.id.clone())
        .one(h.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_active);

    let relisted = h
        .catalog
        .update_product(
            "juana",
            &product.id,
            UpdateProductInput {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(relisted.is_active);
}

#[tokio::test]
async fn test_resolving_twice_is_conflict() {
    let h = harness().await;
    h.insert_user("juana").await;
    let request = h
        .approve("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await;

    let again = h
        .requests
        .resolve(&request.id, ResolveAction::Reject, "cambio de opinión", "admin")
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let stored = h.requests.get(&request.id).await.unwrap();
    assert_eq!(stored.status, RoleRequestStatus::Approved);
    assert_eq!(stored.admin_comment, "ok");
    assert_eq!(
        h.provider_of("juana").await.unwrap().status,
        ProviderStatus::Active
    );
}

#[tokio::test]
async fn test_superseded_request_cannot_be_approved() {
    let h = harness().await;
    h.insert_user("juana").await;

    let first = h
        .requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await
        .unwrap();
    h.requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::Both))
        .await
        .unwrap();

    let result = h
        .requests
        .resolve(&first.id, ResolveAction::Approve, "", "admin")
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(h.provider_of("juana").await.is_none());
    assert_eq!(h.requests.count_pending().await.unwrap(), 2);
}

#[tokio::test]
async fn test_superseded_request_can_be_rejected() {
    let h = harness().await;
    h.insert_user("juana").await;

    let first = h
        .requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await
        .unwrap();
    let second = h
        .requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::Both))
        .await
        .unwrap();

    let closed = h
        .requests
        .resolve(&first.id, ResolveAction::Reject, "duplicada", "admin")
        .await
        .unwrap();

    assert_eq!(closed.status, RoleRequestStatus::Rejected);
    assert_eq!(h.requests.count_pending().await.unwrap(), 1);
    assert_eq!(
        h.requests
            .list(Some(RoleRequestStatus::Pending), 10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect::<Vec<_>>(),
        vec![second.id.clone()]
    );
    assert_eq!(
        h.user("juana").await.current_role_request_id.as_deref(),
        Some(second.id.as_str())
    );
}

#[tokio::test]
async fn test_rejecting_superseded_request_keeps_current_approval() {
    let h = harness().await;
    h.insert_user("juana").await;

    let stale = h
        .requests
        .submit("juana", SubmitRoleRequestInput::new(RoleRequestKind::ServiceProvider))
        .await
        .unwrap();
    h.approve("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await;
    let product = h
        .catalog
        .create_product("juana", product_input())
        .await
        .unwrap();

    h.requests
        .resolve(&stale.id, ResolveAction::Reject, "", "admin")
        .await
        .unwrap();

    let provider = h.provider_of("juana").await.unwrap();
    assert_eq!(provider.status, ProviderStatus::Active);
    assert!(provider.supplies_biofuel);
    assert_eq!(h.user("juana").await.role, UserRole::Supplier);
    assert_eq!(h.active_listings(&product.provider_id).await, (1, 0));
}

#[tokio::test]
async fn test_unknown_request_is_not_found() {
    let h = harness().await;

    let result = h
        .requests
        .resolve("missing", ResolveAction::Approve, "", "admin")
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_reapproval_merges_without_erasing() {
    let h = harness().await;
    h.insert_user("juana").await;

    let mut first = SubmitRoleRequestInput::new(RoleRequestKind::Supplier);
    first.trade_name = Some("Leñas Huenchumil".to_string());
    first.contact_info = Some("+56 9 5555 0000".to_string());
    first.sale_point_address = Some("Caupolicán 1200".to_string());
    first.registry_number = Some("SNCL-0099".to_string());
    h.approve("juana", first).await;
    let before = h.provider_of("juana").await.unwrap();

    let mut second = SubmitRoleRequestInput::new(RoleRequestKind::ServiceProvider);
    second.contact_info = Some("+56 9 7777 1111".to_string());
    h.approve("juana", second).await;
    let after = h.provider_of("juana").await.unwrap();

    assert_eq!(after.id, before.id);
    assert_eq!(after.trade_name, "Leñas Huenchumil");
    assert_eq!(after.address, "Caupolicán 1200");
    assert_eq!(after.registry_number, "SNCL-0099");
    assert_eq!(after.contact_phone, "+56 9 7777 1111");
    assert!(!after.supplies_biofuel);
    assert!(after.provides_services);
    assert_eq!(after.status, ProviderStatus::Active);
    assert_eq!(Provider::find().count(h.db.as_ref()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_current_request_falls_back_to_latest() {
    let h = harness().await;
    let user = h.insert_user("juana").await;
    let now = Utc::now();

    for (id, submitted_at) in [("older", now - Duration::hours(2)), ("newer", now)] {
        role_request::ActiveModel {
            id: Set(id.to_string()),
            user_id: Set(user.id.clone()),
            kind: Set(RoleRequestKind::Supplier),
            status: Set(RoleRequestStatus::Pending),
            trade_name: Set(String::new()),
            line_of_business: Set(String::new()),
            sale_point_address: Set(String::new()),
            accepts_biofuel_law: Set(false),
            city: Set(String::new()),
            contact_info: Set(String::new()),
            services_offered: Set(String::new()),
            accepts_terms: Set(false),
            extra: Set(None),
            admin_comment: Set(String::new()),
            resolved_by: Set(None),
            submitted_at: Set(submitted_at.into()),
            resolved_at: Set(None),
        }
        .insert(h.db.as_ref())
        .await
        .unwrap();
    }

    let current = h.requests.current_for_user(&user).await.unwrap().unwrap();
    assert_eq!(current.id, "newer");

    // Only the latest row is resolvable without the explicit pointer
    let older = h
        .requests
        .resolve("older", ResolveAction::Approve, "", "admin")
        .await;
    assert!(matches!(older, Err(AppError::Conflict(_))));

    h.requests
        .resolve("newer", ResolveAction::Approve, "", "admin")
        .await
        .unwrap();
    assert!(h.provider_of("juana").await.is_some());
}

#[tokio::test]
async fn test_provider_rut_comes_from_user() {
    let h = harness().await;
    h.insert_user("juana").await;

    let mut user: user::ActiveModel = h.user("juana").await.into();
    user.rut = Set(Some("12.345.678-5".to_string()));
    user.update(h.db.as_ref()).await.unwrap();

    h.approve("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await;

    let provider = h.provider_of("juana").await.unwrap();
    assert_eq!(provider.rut, "12.345.678-5");
    // No trade name: display name for the legal name, username for the trade name
    assert_eq!(provider.legal_name, "Juana Huenchumil");
    assert_eq!(provider.trade_name, "juana");
}

#[tokio::test]
async fn test_other_users_are_independent() {
    let h = harness().await;
    h.insert_user("juana").await;
    h.insert_user("pedro").await;

    h.approve("juana", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await;
    h.catalog.create_product("juana", product_input()).await.unwrap();

    h.approve("pedro", SubmitRoleRequestInput::new(RoleRequestKind::Supplier))
        .await;
    h.requests
        .submit("pedro", SubmitRoleRequestInput::new(RoleRequestKind::Both))
        .await
        .unwrap();

    let juana = h.provider_of("juana").await.unwrap();
    assert_eq!(juana.status, ProviderStatus::Active);
    assert_eq!(h.active_listings(&juana.id).await, (1, 0));
}
