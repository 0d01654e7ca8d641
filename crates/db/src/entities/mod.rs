//! Database entities.

pub mod commune;
pub mod educational_content;
pub mod product;
pub mod provider;
pub mod quiz_attempt;
pub mod quiz_option;
pub mod quiz_question;
pub mod region;
pub mod role_request;
pub mod service;
pub mod user;

pub use commune::Entity as Commune;
pub use educational_content::Entity as EducationalContent;
pub use product::Entity as Product;
pub use provider::Entity as Provider;
pub use quiz_attempt::Entity as QuizAttempt;
pub use quiz_option::Entity as QuizOption;
pub use quiz_question::Entity as QuizQuestion;
pub use region::Entity as Region;
pub use role_request::Entity as RoleRequest;
pub use service::Entity as Service;
pub use user::Entity as User;
