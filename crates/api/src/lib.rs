//! HTTP API layer for ecocomb.
//!
//! This crate provides the JSON API of the marketplace:
//!
//! - **Endpoints**: accounts, catalog, role requests, education, administration
//! - **Extractors**: authenticated user and administrator
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
