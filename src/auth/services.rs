use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::claims::Claims;
use crate::auth::errors::AuthError;
use crate::auth::jwt::JwtKeys;
use crate::auth::password;
use crate::auth::repo::CredentialStore;
use crate::auth::repo_types::User;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Orchestrates the credential lifecycle over a [`CredentialStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    /// Create an account: validate input, hash the password, persist.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let name = name.trim().to_string();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Missing required fields".into()));
        }
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(AuthError::Validation("Invalid email format".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            warn!("password too short");
            return Err(AuthError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }

        let hash = {
            // argon2 is CPU-bound, keep it off the async workers
            let password = password.to_string();
            tokio::task::spawn_blocking(move || password::hash_password(&password))
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?
                .map_err(|e| AuthError::Internal(e.to_string()))?
        };

        let user = self.store.create(&name, &email, &hash).await?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue a session token.
    ///
    /// An unknown email and a wrong password both come back as
    /// [`AuthError::InvalidCredentials`] so responses cannot be used to probe
    /// which accounts exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Missing email or password".into()));
        }

        let user = match self.store.find_by_email(&email).await? {
            Some(u) => u,
            None => {
                warn!(email = %email, "login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let ok = {
            let password = password.to_string();
            let hash = user.password_hash.clone();
            tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?
                .map_err(|e| AuthError::Internal(e.to_string()))?
        };

        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.sign(&user)?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok((token, user))
    }

    /// Decode a bearer token and return its claims. No store I/O.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.keys.verify(token)
    }
}
