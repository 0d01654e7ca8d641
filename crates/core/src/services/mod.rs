//! Business logic services.

#![allow(missing_docs)]

pub mod catalog;
pub mod commercial;
pub mod education;
pub mod geo;
pub mod role_request;
pub mod user;

pub use catalog::{
    Catalog, CatalogService, CreateProductInput, CreateServiceInput, ProviderDetail,
    UpdateProductInput, UpdateServiceInput, format_clp,
};
pub use commercial::{CommercialAccess, CommercialService};
pub use education::{
    AddQuestionInput, CreateContentInput, EducationService, OptionInput, QuestionWithOptions,
    QuizView, UpdateContentInput,
};
pub use geo::{CreateCommuneInput, CreateRegionInput, GeoService};
pub use role_request::{
    PLACEHOLDER_RUT, ProviderFields, ResolveAction, RoleRequestService, SubmitRoleRequestInput,
    deactivate_commercial, upsert_provider,
};
pub use user::{SignupInput, UpdateProfileInput, UserService};
