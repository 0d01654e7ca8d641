//! User service: signup, signin, profile and the email verification window.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use ecocomb_common::{AppError, AppResult, Config, IdGenerator, config::AccountsConfig, rut};
use ecocomb_db::{
    entities::{user, user::UserRole},
    repositories::{GeoRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    geo_repo: GeoRepository,
    id_gen: IdGenerator,
    accounts: AccountsConfig,
}

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    #[validate(custom(function = "rut::validate_rut_field"))]
    pub rut: Option<String>,

    pub region_id: Option<String>,

    pub commune_id: Option<String>,
}

/// Input for updating a user's profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,

    #[validate(email, length(max = 254))]
    pub email: Option<String>,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    #[validate(custom(function = "rut::validate_rut_field"))]
    pub rut: Option<String>,

    pub region_id: Option<String>,

    pub commune_id: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, geo_repo: GeoRepository, config: &Config) -> Self {
        Self {
            user_repo,
            geo_repo,
            id_gen: IdGenerator::new(),
            accounts: config.accounts.clone(),
        }
    }

    /// Register a new account.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        if !self.accounts.allow_signup {
            return Err(AppError::Forbidden("Signup is disabled".to_string()));
        }

        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        let (region_id, commune_id) = self
            .resolve_location(input.region_id, input.commune_id)
            .await?;

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(user_id),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email.trim().to_string()),
            password_hash: Set(password_hash),
            token: Set(Some(token)),
            first_name: Set(input.first_name.unwrap_or_default().trim().to_string()),
            last_name: Set(input.last_name.unwrap_or_default().trim().to_string()),
            rut: Set(normalize_rut(input.rut)),
            region_id: Set(region_id),
            commune_id: Set(commune_id),
            role: Set(UserRole::User),
            is_admin: Set(false),
            email_verified: Set(false),
            email_verified_at: Set(None),
            is_blocked: Set(false),
            current_role_request_id: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, username = %user.username, "User signed up");

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by username and password.
    pub async fn signin(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            warn!(username = %username, "Signin with wrong password");
            return Err(AppError::Unauthorized);
        }

        self.enforce_verification_window(user).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.enforce_verification_window(user).await
    }

    /// Rotate a user's token, invalidating the current one.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_token = self.id_gen.generate_token();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(new_token.clone()));
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }

    /// Sign out: the current token stops working.
    pub async fn signout(&self, user_id: &str) -> AppResult<()> {
        self.regenerate_token(user_id).await?;
        info!(user_id = %user_id, "User signed out");
        Ok(())
    }

    /// Update a user's profile.
    pub async fn update_profile(
        &self,
        id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;

        if let Some(username) = &input.username {
            if let Some(other) = self.user_repo.find_by_username(username).await? {
                if other.id != user.id {
                    return Err(AppError::BadRequest("Username already taken".to_string()));
                }
            }
        }

        let location_changed = input.region_id.is_some() || input.commune_id.is_some();
        let (region_id, commune_id) = if location_changed {
            self.resolve_location(input.region_id, input.commune_id)
                .await?
        } else {
            (user.region_id.clone(), user.commune_id.clone())
        };

        let email_changed = input
            .email
            .as_deref()
            .is_some_and(|email| email.trim() != user.email);

        let mut active: user::ActiveModel = user.into();

        if let Some(username) = input.username {
            active.username_lower = Set(username.to_lowercase());
            active.username = Set(username);
        }
        if let Some(email) = input.email {
            active.email = Set(email.trim().to_string());
        }
        if email_changed {
            active.email_verified = Set(false);
            active.email_verified_at = Set(None);
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        if input.rut.is_some() {
            active.rut = Set(normalize_rut(input.rut));
        }
        if location_changed {
            active.region_id = Set(region_id);
            active.commune_id = Set(commune_id);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Mark a user's email as verified. Lifts a verification block.
    pub async fn verify_email(&self, user_id: &str) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let now = Utc::now();

        let mut active: user::ActiveModel = user.into();
        active.email_verified = Set(true);
        active.email_verified_at = Set(Some(now.into()));
        active.is_blocked = Set(false);
        active.updated_at = Set(Some(now.into()));

        let user = self.user_repo.update(active).await?;
        info!(user_id = %user.id, "Email verified");

        Ok(user)
    }

    /// Block the user if the verification window lapsed.
    async fn enforce_verification_window(&self, user: user::Model) -> AppResult<user::Model> {
        if user.is_blocked
            || !verification_lapsed(
                &user,
                self.accounts.email_verification_grace_days,
                Utc::now(),
            )
        {
            return Ok(user);
        }

        warn!(user_id = %user.id, "Email not verified in time, blocking account");
        self.user_repo.block(user).await
    }

    /// Check that the commune exists and agrees with the region.
    ///
    /// A commune without an explicit region takes its region.
    async fn resolve_location(
        &self,
        region_id: Option<String>,
        commune_id: Option<String>,
    ) -> AppResult<(Option<String>, Option<String>)> {
        let region_id = region_id.filter(|id| !id.is_empty());
        let commune_id = commune_id.filter(|id| !id.is_empty());

        if let Some(id) = &region_id {
            if self.geo_repo.find_region(id).await?.is_none() {
                return Err(AppError::Validation(format!("Unknown region: {id}")));
            }
        }

        let Some(id) = commune_id else {
            return Ok((region_id, None));
        };

        let commune = self
            .geo_repo
            .find_commune(&id)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Unknown commune: {id}")))?;

        if let (Some(region), Some(commune_region)) = (&region_id, &commune.region_id) {
            if region != commune_region {
                return Err(AppError::Validation(format!(
                    "Commune {id} is not in region {region}"
                )));
            }
        }

        Ok((region_id.or(commune.region_id), Some(commune.id)))
    }
}

/// Whether an unverified account is past its grace window at `now`.
#[must_use]
pub fn verification_lapsed(user: &user::Model, grace_days: i64, now: DateTime<Utc>) -> bool {
    !user.email_verified
        && now > user.created_at.with_timezone(&Utc) + Duration::days(grace_days)
}

fn normalize_rut(rut: Option<String>) -> Option<String> {
    rut.map(|r| r.trim().to_ascii_uppercase())
        .filter(|r| !r.is_empty())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ecocomb_common::config::{DatabaseConfig, ServerConfig};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_config(allow_signup: bool) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/ecocomb_test".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            accounts: AccountsConfig {
                email_verification_grace_days: 7,
                allow_signup,
            },
        }
    }

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: "usuario@example.cl".to_string(),
            password_hash: hash_password("password123").unwrap(),
            token: Some("test_token".to_string()),
            first_name: String::new(),
            last_name: String::new(),
            rut: None,
            region_id: None,
            commune_id: None,
            role: UserRole::User,
            is_admin: false,
            email_verified: false,
            email_verified_at: None,
            is_blocked: false,
            current_role_request_id: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_service(db: sea_orm::DatabaseConnection, allow_signup: bool) -> UserService {
        let db = Arc::new(db);
        UserService::new(
            UserRepository::new(db.clone()),
            GeoRepository::new(db),
            &create_test_config(allow_signup),
        )
    }

    fn signup_input() -> SignupInput {
        SignupInput {
            username: "lenera".to_string(),
            email: "lenera@example.cl".to_string(),
            password: "password123".to_string(),
            first_name: None,
            last_name: None,
            rut: None,
            region_id: None,
            commune_id: None,
        }
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123", &hash).unwrap());
        assert!(!verify_password("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password123", "not-a-hash").is_err());
    }

    #[test]
    fn test_signup_input_validation() {
        let mut input = signup_input();
        assert!(input.validate().is_ok());

        input.password = "short".to_string();
        assert!(input.validate().is_err());

        let mut input = signup_input();
        input.username = String::new();
        assert!(input.validate().is_err());

        let mut input = signup_input();
        input.email = "not-an-email".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_signup_input_rejects_bad_rut() {
        let mut input = signup_input();
        input.rut = Some("123-K".to_string());

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rut"));

        input.rut = Some("12.345.678-5".to_string());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_profile_input_rejects_bad_rut() {
        let input = UpdateProfileInput {
            rut: Some("abc-5".to_string()),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_verification_lapsed() {
        let mut user = create_test_user("user1", "lenera");
        let joined = Utc::now() - Duration::days(8);
        user.created_at = joined.into();

        assert!(verification_lapsed(&user, 7, Utc::now()));
        assert!(!verification_lapsed(&user, 7, joined + Duration::days(6)));

        user.email_verified = true;
        assert!(!verification_lapsed(&user, 7, Utc::now()));
    }

    #[test]
    fn test_normalize_rut() {
        assert_eq!(normalize_rut(Some(" 6-k ".to_string())), Some("6-K".to_string()));
        assert_eq!(normalize_rut(Some(String::new())), None);
        assert_eq!(normalize_rut(None), None);
    }

    #[tokio::test]
    async fn test_signup_disabled() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = create_test_service(db, false);

        let result = service.signup(signup_input()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_signup_username_taken() {
        let existing = create_test_user("user1", "Lenera");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();
        let service = create_test_service(db, true);

        let result = service.signup(signup_input()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let user = create_test_user("user1", "lenera");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();
        let service = create_test_service(db, true);

        let result = service.signin("lenera", "wrongpassword").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let service = create_test_service(db, true);

        let result = service.authenticate_by_token("invalid_token").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_blocks_lapsed_user() {
        let mut user = create_test_user("user1", "lenera");
        user.created_at = (Utc::now() - Duration::days(30)).into();
        let mut blocked = user.clone();
        blocked.is_blocked = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .append_query_results([[blocked]])
            .into_connection();
        let service = create_test_service(db, true);

        let result = service.authenticate_by_token("test_token").await.unwrap();
        assert!(result.is_blocked);
    }

    #[tokio::test]
    async fn test_authenticate_by_token_fresh_user_untouched() {
        let user = create_test_user("user1", "lenera");

        // A second query would fail: the fresh user must not be updated.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();
        let service = create_test_service(db, true);

        let result = service.authenticate_by_token("test_token").await.unwrap();
        assert!(!result.is_blocked);
    }
}
