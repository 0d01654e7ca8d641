//! Database repositories.

pub mod education;
pub mod geo;
pub mod product;
pub mod provider;
pub mod role_request;
pub mod service;
pub mod user;

pub use education::EducationRepository;
pub use geo::GeoRepository;
pub use product::ProductRepository;
pub use provider::ProviderRepository;
pub use role_request::RoleRequestRepository;
pub use service::ServiceRepository;
pub use user::UserRepository;
