use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::Claims;
use crate::auth::errors::AuthError;
use crate::auth::repo_types::User;
use crate::config::JwtConfig;

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::from_secs((cfg.ttl_days as u64) * 24 * 60 * 60),
        }
    }

    /// Issue a session token bound to the given user.
    pub fn sign(&self, user: &User) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    /// Decode and validate a token, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            },
        )?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            ttl_days: 30,
        })
    }

    fn make_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".into(),
            email: "test@example.com".into(),
            password_hash: "x".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Encode claims for a token issued `issued_days_ago` with a 30 day window.
    fn encode_with_window(keys: &JwtKeys, issued_days_ago: i64) -> String {
        let user = make_user();
        let iat = OffsetDateTime::now_utc() - TimeDuration::days(issued_days_ago);
        let exp = iat + TimeDuration::days(30);
        let claims = Claims {
            sub: user.id,
            email: user.email,
            name: user.name,
            iat: iat.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        encode(&Header::default(), &claims, &keys.encoding).expect("encode")
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let user = make_user();
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(&make_user()).expect("sign");

        // flip one character of the payload segment
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let replacement = if parts[1].starts_with('A') { "B" } else { "A" };
        parts[1].replace_range(0..1, replacement);
        let tampered = parts.join(".");

        assert!(matches!(
            keys.verify(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys("dev-secret");
        let other = make_keys("other-secret");
        let token = keys.sign(&make_user()).expect("sign");
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_garbage_input() {
        let keys = make_keys("dev-secret");
        assert!(matches!(
            keys.verify("definitely.not.a-jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_still_valid_near_end_of_window() {
        let keys = make_keys("dev-secret");
        let token = encode_with_window(&keys, 29);
        assert!(keys.verify(&token).is_ok());
    }

    #[test]
    fn token_expired_past_window() {
        let keys = make_keys("dev-secret");
        let token = encode_with_window(&keys, 31);
        assert!(matches!(keys.verify(&token), Err(AuthError::Expired)));
    }
}
