/// Session token issuance and verification
///
/// Tokens are HS256-signed JWTs carrying the user id and role. The signing
/// key is loaded once at startup and immutable thereafter.
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::user::Role;

const TOKEN_EXPIRY_HOURS: i64 = 24;

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Claims embedded in every issued token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Initialize the signing key from the configured secret.
///
/// MUST be called during application startup before any token operation.
/// Can only be called once - subsequent calls will return an error.
pub fn initialize(secret: &str) -> Result<()> {
    if secret.is_empty() {
        return Err(anyhow!("JWT secret must not be empty"));
    }

    JWT_ENCODING_KEY
        .set(EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| anyhow!("JWT encoding key already initialized"))?;

    JWT_DECODING_KEY
        .set(DecodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| anyhow!("JWT decoding key already initialized"))?;

    Ok(())
}

fn encoding_key() -> Result<&'static EncodingKey> {
    JWT_ENCODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT keys not initialized. Call jwt::initialize() during startup."))
}

fn decoding_key() -> Result<&'static DecodingKey, ApiError> {
    JWT_DECODING_KEY.get().ok_or_else(|| {
        ApiError::Internal("JWT keys not initialized. Call jwt::initialize() during startup.".into())
    })
}

/// Issue a token for an authenticated user
pub fn issue_token(user_id: Uuid, role: Role) -> Result<String> {
    issue_token_with_lifetime(user_id, role, Duration::hours(TOKEN_EXPIRY_HOURS))
}

/// Issue a token with an explicit lifetime (negative lifetimes produce
/// already-expired tokens, which the test suites rely on)
pub fn issue_token_with_lifetime(user_id: Uuid, role: Role, lifetime: Duration) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };

    encode(&Header::default(), &claims, encoding_key()?)
        .map_err(|e| anyhow!("Failed to issue token: {e}"))
}

/// Verify a token's signature and expiry and return the embedded claims.
///
/// Fails with `TokenExpired` past expiry and `Unauthenticated` on any other
/// signature or structural problem.
pub fn verify_token(token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, decoding_key()?, &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test_key() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            initialize("test-signing-secret").expect("Failed to initialize test key");
        });
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        init_test_key();

        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, Role::Organizer).unwrap();
        assert_eq!(token.matches('.').count(), 2); // JWT has 3 parts

        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, Role::Organizer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_role_survives_roundtrip_for_every_role() {
        init_test_key();

        for role in [Role::Student, Role::Organizer, Role::Admin] {
            let token = issue_token(Uuid::new_v4(), role).unwrap();
            assert_eq!(verify_token(&token).unwrap().role, role);
        }
    }

    #[test]
    fn test_garbage_token_rejected() {
        init_test_key();

        assert!(matches!(
            verify_token("not.a.token"),
            Err(ApiError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        init_test_key();

        let token = issue_token(Uuid::new_v4(), Role::Student).unwrap();
        let tampered = token.replace('a', "b");
        assert!(verify_token(&tampered).is_err());
    }

    #[test]
    fn test_expired_token_rejected_as_expired() {
        init_test_key();

        let token =
            issue_token_with_lifetime(Uuid::new_v4(), Role::Student, Duration::hours(-2)).unwrap();
        assert!(matches!(verify_token(&token), Err(ApiError::TokenExpired)));
    }
}
