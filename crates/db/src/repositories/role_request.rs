//! Role request repository.
//!
//! Reads only. Every write to `role_request` happens inside the workflow
//! transaction in `ecocomb-core`.

use std::sync::Arc;

use crate::entities::role_request::RoleRequestStatus;
use crate::entities::{RoleRequest, role_request};
use ecocomb_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Role request repository for database operations.
#[derive(Clone)]
pub struct RoleRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl RoleRequestRepository {
    /// Create a new role request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a role request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<role_request::Model>> {
        RoleRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a role request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<role_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role request: {id}")))
    }

    /// Most recently submitted request of a user.
    pub async fn find_latest_by_user(
        &self,
        user_id: &str,
    ) -> AppResult<Option<role_request::Model>> {
        RoleRequest::find()
            .filter(role_request::Column::UserId.eq(user_id))
            .order_by_desc(role_request::Column::SubmittedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All requests of a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<role_request::Model>> {
        RoleRequest::find()
            .filter(role_request::Column::UserId.eq(user_id))
            .order_by_desc(role_request::Column::SubmittedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests for the review queue (paginated, newest first).
    pub async fn find_by_status(
        &self,
        status: Option<RoleRequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<role_request::Model>> {
        let mut query = RoleRequest::find();

        if let Some(status) = status {
            query = query.filter(role_request::Column::Status.eq(status));
        }

        query
            .order_by_desc(role_request::Column::SubmittedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count requests in a given status.
    pub async fn count_by_status(&self, status: RoleRequestStatus) -> AppResult<u64> {
        RoleRequest::find()
            .filter(role_request::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::role_request::RoleRequestKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_request(id: &str, user_id: &str) -> role_request::Model {
        role_request::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            kind: RoleRequestKind::Supplier,
            status: RoleRequestStatus::Pending,
            trade_name: "Leñas Don Tito".to_string(),
            line_of_business: "venta de leña seca".to_string(),
            sale_point_address: "Av. Alemania 123".to_string(),
            accepts_biofuel_law: true,
            city: String::new(),
            contact_info: String::new(),
            services_offered: String::new(),
            accepts_terms: true,
            extra: None,
            admin_comment: String::new(),
            resolved_by: None,
            submitted_at: Utc::now().into(),
            resolved_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_latest_by_user() {
        let request = create_test_request("req2", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request.clone()]])
                .into_connection(),
        );

        let repo = RoleRequestRepository::new(db);
        let found = repo.find_latest_by_user("user1").await.unwrap().unwrap();

        assert_eq!(found.id, "req2");
        assert_eq!(found.status, RoleRequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_find_by_status_pending() {
        let first = create_test_request("req1", "user1");
        let second = create_test_request("req2", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[first, second]])
                .into_connection(),
        );

        let repo = RoleRequestRepository::new(db);
        let queue = repo
            .find_by_status(Some(RoleRequestStatus::Pending), 20, 0)
            .await
            .unwrap();

        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_registry_number_from_extra() {
        let mut request = create_test_request("req1", "user1");
        assert_eq!(request.registry_number(), None);

        request.extra = Some(serde_json::json!({ "registry_number": "SNCL-0042" }));
        assert_eq!(request.registry_number(), Some("SNCL-0042"));
    }
}
