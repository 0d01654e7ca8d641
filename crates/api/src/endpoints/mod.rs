//! API endpoints.

mod account;
mod admin;
mod auth;
mod catalog;
mod education;
mod geo;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(catalog::router())
        .nest("/geo", geo::router())
        .nest("/i", account::router())
        .nest("/education", education::router())
        .nest("/admin", admin::router())
}

const fn default_limit() -> u64 {
    20
}

/// Offset pagination for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

impl PageQuery {
    /// Limit capped at 100.
    pub(crate) fn capped_limit(self) -> u64 {
        self.limit.min(100)
    }
}
