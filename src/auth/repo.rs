use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::repo_types::User;

/// Failures surfaced by a credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    UniqueViolation,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Narrow persistence seam for user records, keyed by normalized email.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by normalized email. Pure read, no side effects.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Uniqueness is enforced by the store itself, so a
    /// concurrent insert for the same email loses with `UniqueViolation`.
    async fn create(&self, name: &str, email: &str, password_hash: &str)
        -> Result<User, StoreError>;
}

pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            _ => StoreError::Database(e),
        })?;
        Ok(user)
    }
}

/// Simple in-memory store for tests; mirrors the uniqueness contract of the
/// Postgres implementation.
#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;

    #[derive(Default)]
    pub struct MemoryCredentialStore {
        users: Mutex<HashMap<String, User>>, // key: normalized email
    }

    #[async_trait]
    impl CredentialStore for MemoryCredentialStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn create(
            &self,
            name: &str,
            email: &str,
            password_hash: &str,
        ) -> Result<User, StoreError> {
            // check-and-insert under one lock, like the database constraint
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(StoreError::UniqueViolation);
            }
            let user = User {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: OffsetDateTime::now_utc(),
            };
            users.insert(email.to_string(), user.clone());
            Ok(user)
        }
    }
}
