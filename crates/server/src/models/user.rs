//! User account entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Role, UserId};

/// A registered account.
///
/// The password hash never serializes: responses carry the account
/// without its credential material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh account with the given hashed credential.
    #[must_use]
    pub fn new(email: String, name: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            email,
            name,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    /// Only honored when an admin creates the account; self-registration
    /// always yields a regular user.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Login payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Partial account update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serializes() {
        let user = User::new(
            "a@b.test".to_owned(),
            "Ada".to_owned(),
            "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_owned(),
            Role::User,
        );
        let value = serde_json::to_value(&user).expect("serialize");
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "a@b.test");
    }
}
