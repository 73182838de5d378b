//! Account administration.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use bazaar_core::{PageMeta, Role, UserId};

use crate::auth::Claims;
use crate::db::users::UserStore;
use crate::error::ApiError;
use crate::models::{NewUser, User, UserUpdate};

use super::auth::{hash_password, validate_password};
use super::{bounded, page_params};

/// User service.
pub struct UserService {
    users: Arc<dyn UserStore>,
    deadline: Duration,
}

impl UserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, deadline: Duration) -> Self {
        Self { users, deadline }
    }

    /// Admin listing of all accounts.
    pub async fn list(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<(Vec<User>, PageMeta), ApiError> {
        let (page, limit) = page_params(page, limit);
        let total = bounded(self.deadline, self.users.count()).await?;
        let users = bounded(
            self.deadline,
            self.users.list(PageMeta::skip(page, limit), limit),
        )
        .await?;
        Ok((users, PageMeta::compute(page, limit, total)))
    }

    pub async fn get(&self, id: UserId) -> Result<User, ApiError> {
        self.find(id).await
    }

    /// Admin account creation. Unlike self-registration, the payload's
    /// role is honored here.
    pub async fn create(&self, payload: NewUser) -> Result<User, ApiError> {
        validate_password(&payload.password)?;
        let password_hash = hash_password(&payload.password)?;
        let role = payload.role.unwrap_or(Role::User);

        let user = User::new(payload.email, payload.name, password_hash, role);
        bounded(self.deadline, self.users.insert(&user)).await?;
        Ok(user)
    }

    /// Partial account update.
    ///
    /// Non-admins may only update their own account, and may not change
    /// their role.
    pub async fn update(
        &self,
        id: UserId,
        claims: &Claims,
        update: UserUpdate,
    ) -> Result<User, ApiError> {
        if claims.role != Role::Admin {
            if claims.sub != id {
                return Err(ApiError::Gate(crate::auth::GateError::InsufficientRole));
            }
            if update.role.is_some() {
                return Err(ApiError::Gate(crate::auth::GateError::InsufficientRole));
            }
        }

        let mut user = self.find(id).await?;
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(password) = update.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password)?;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        bounded(self.deadline, self.users.update(&user)).await?;
        Ok(user)
    }

    /// Admin-only removal.
    pub async fn delete(&self, id: UserId) -> Result<(), ApiError> {
        let removed = bounded(self.deadline, self.users.delete(id)).await?;
        if removed {
            Ok(())
        } else {
            Err(ApiError::NotFound("User not found".to_owned()))
        }
    }

    async fn find(&self, id: UserId) -> Result<User, ApiError> {
        bounded(self.deadline, self.users.find(id))
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::memory::MemoryUserStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryUserStore::default()), Duration::from_secs(1))
    }

    fn claims(sub: UserId, role: Role) -> Claims {
        Claims {
            sub,
            email: "a@b.test".to_owned(),
            role,
            exp: 4_102_444_800,
        }
    }

    fn new_user(email: &str, role: Option<Role>) -> NewUser {
        NewUser {
            email: email.to_owned(),
            name: "Ada".to_owned(),
            password: "correct horse battery".to_owned(),
            role,
        }
    }

    #[tokio::test]
    async fn admin_creation_honors_role() {
        let user = service()
            .create(new_user("root@b.test", Some(Role::Admin)))
            .await
            .expect("create");
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn user_cannot_update_someone_else() {
        let service = service();
        let target = service
            .create(new_user("a@b.test", None))
            .await
            .expect("create");

        let err = service
            .update(
                target.id,
                &claims(UserId::generate(), Role::User),
                UserUpdate {
                    name: Some("Mallory".to_owned()),
                    ..UserUpdate::default()
                },
            )
            .await
            .expect_err("must deny");
        assert!(matches!(err, ApiError::Gate(_)));
    }

    #[tokio::test]
    async fn user_cannot_self_promote() {
        let service = service();
        let user = service
            .create(new_user("a@b.test", None))
            .await
            .expect("create");

        let err = service
            .update(
                user.id,
                &claims(user.id, Role::User),
                UserUpdate {
                    role: Some(Role::Admin),
                    ..UserUpdate::default()
                },
            )
            .await
            .expect_err("must deny");
        assert!(matches!(err, ApiError::Gate(_)));
    }

    #[tokio::test]
    async fn user_updates_own_name() {
        let service = service();
        let user = service
            .create(new_user("a@b.test", None))
            .await
            .expect("create");

        let updated = service
            .update(
                user.id,
                &claims(user.id, Role::User),
                UserUpdate {
                    name: Some("Countess".to_owned()),
                    ..UserUpdate::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.name, "Countess");
    }

    #[tokio::test]
    async fn pagination_metadata_is_computed() {
        let service = service();
        for i in 0..25 {
            service
                .create(new_user(&format!("user{i}@b.test"), None))
                .await
                .expect("create");
        }
        let (users, meta) = service.list(Some(1), Some(10)).await.expect("list");
        assert_eq!(users.len(), 10);
        assert_eq!(meta.total, 25);
        assert_eq!(meta.total_pages, 3);
    }
}
