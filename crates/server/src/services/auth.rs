//! Registration, login, and credential issuance.

use std::sync::Arc;
use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use bazaar_core::Role;

use crate::auth::TokenIssuer;
use crate::db::users::UserStore;
use crate::error::ApiError;
use crate::models::{Credentials, NewUser, User};

use super::bounded;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Registration against a taken email.
    #[error("User with this email already exists")]
    EmailTaken,

    /// Password failed validation.
    #[error("{0}")]
    WeakPassword(String),

    /// Hashing failed. Never carries detail to the client.
    #[error("Unable to process credentials")]
    PasswordHash,

    /// Token signing failed.
    #[error("Unable to issue token")]
    TokenIssue,
}

impl AuthError {
    /// Status code this error maps to on the wire.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::WeakPassword(_) => StatusCode::BAD_REQUEST,
            Self::PasswordHash | Self::TokenIssue => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An authenticated account plus its signed credential.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
    pub user: User,
    pub token: String,
}

/// Authentication service.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    issuer: Arc<TokenIssuer>,
    deadline: Duration,
}

impl AuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, issuer: Arc<TokenIssuer>, deadline: Duration) -> Self {
        Self {
            users,
            issuer,
            deadline,
        }
    }

    /// Register a new account and sign it in.
    ///
    /// Self-registration always yields a regular user; the payload's role
    /// field only takes effect through the admin user-creation path.
    pub async fn register(&self, payload: NewUser) -> Result<AuthOutcome, ApiError> {
        validate_password(&payload.password)?;
        let password_hash = hash_password(&payload.password)?;

        let user = User::new(payload.email, payload.name, password_hash, Role::User);

        bounded(self.deadline, self.users.insert(&user))
            .await
            .map_err(|e| match e {
                ApiError::Conflict(_) => ApiError::Auth(AuthError::EmailTaken),
                other => other,
            })?;

        self.sign_in(user)
    }

    /// Verify credentials and sign the account in.
    pub async fn login(&self, credentials: Credentials) -> Result<AuthOutcome, ApiError> {
        let user = bounded(self.deadline, self.users.find_by_email(&credentials.email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&credentials.password, &user.password_hash)?;

        self.sign_in(user)
    }

    fn sign_in(&self, user: User) -> Result<AuthOutcome, ApiError> {
        let token = self
            .issuer
            .issue(user.id, &user.email, user.role)
            .map_err(|_| AuthError::TokenIssue)?;
        Ok(AuthOutcome { user, token })
    }
}

/// Validate password strength requirements.
pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    use crate::db::memory::MemoryUserStore;

    fn service() -> AuthService {
        let issuer = TokenIssuer::new(
            &SecretString::from("k9#mP2$vL8@nQ4!rT6&wZ0*bD5^hJ3%x"),
            Duration::from_secs(3600),
        );
        AuthService::new(
            Arc::new(MemoryUserStore::default()),
            Arc::new(issuer),
            Duration::from_secs(1),
        )
    }

    fn registration(email: &str) -> NewUser {
        NewUser {
            email: email.to_owned(),
            name: "Ada".to_owned(),
            password: "correct horse battery".to_owned(),
            role: None,
        }
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let service = service();
        let registered = service
            .register(registration("a@b.test"))
            .await
            .expect("register");
        assert_eq!(registered.user.role, Role::User);
        assert!(!registered.token.is_empty());

        let logged_in = service
            .login(Credentials {
                email: "a@b.test".to_owned(),
                password: "correct horse battery".to_owned(),
            })
            .await
            .expect("login");
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let service = service();
        service
            .register(registration("a@b.test"))
            .await
            .expect("register");

        let err = service
            .login(Credentials {
                email: "a@b.test".to_owned(),
                password: "not the password".to_owned(),
            })
            .await
            .expect_err("must deny");
        assert!(matches!(err, ApiError::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let err = service()
            .login(Credentials {
                email: "nobody@b.test".to_owned(),
                password: "whatever12345".to_owned(),
            })
            .await
            .expect_err("must deny");
        assert!(matches!(err, ApiError::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let service = service();
        service
            .register(registration("a@b.test"))
            .await
            .expect("register");
        let err = service
            .register(registration("a@b.test"))
            .await
            .expect_err("must conflict");
        assert!(matches!(err, ApiError::Auth(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let mut payload = registration("a@b.test");
        payload.password = "short".to_owned();
        let err = service().register(payload).await.expect_err("must reject");
        assert!(matches!(err, ApiError::Auth(AuthError::WeakPassword(_))));
    }
}
