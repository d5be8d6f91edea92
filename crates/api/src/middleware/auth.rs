//! # Authentication Module
//!
//! Password hashing, dealer access tokens, and the extractor that guards the
//! dealer-only routes.
//!
//! Passwords are stored as Argon2 PHC strings. Access tokens are HS256 JWTs
//! whose subject is the dealer id.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Duration, Utc};
use dealerbook_core::ServiceError;
use eyre::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Hashes a password with Argon2 and a fresh random salt.
///
/// # Arguments
///
/// * `password` - The plain text password to hash
///
/// # Returns
///
/// * `Result<String>` - The hash in PHC string format
///
/// # Example
///
/// ```
/// use dealerbook_api::middleware::auth::{hash_password, verify_password};
///
/// let hash = hash_password("rahasia123").unwrap();
/// assert!(verify_password("rahasia123", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks `password` against a stored PHC string.
///
/// # Returns
///
/// * `Result<bool>` - `false` on a mismatch, an error only when the stored hash is malformed
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| eyre::eyre!("Invalid password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

/// Signing and verification keys for dealer access tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Signs a token for `dealer_id` and returns it with its expiry.
    ///
    /// # Example
    ///
    /// ```
    /// use dealerbook_api::middleware::auth::TokenKeys;
    /// use uuid::Uuid;
    ///
    /// let keys = TokenKeys::new("secret", chrono::Duration::hours(1));
    /// let dealer_id = Uuid::new_v4();
    /// let (token, _expires_at) = keys.issue(dealer_id, "honda-kemang").unwrap();
    /// assert_eq!(keys.verify(&token).unwrap(), dealer_id);
    /// ```
    pub fn issue(&self, dealer_id: Uuid, username: &str) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: dealer_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| eyre::eyre!("Error signing token: {}", e))?;

        Ok((token, expires_at))
    }

    /// Returns the dealer id carried by a valid, unexpired token.
    ///
    /// # Returns
    ///
    /// * `Result<Uuid, ServiceError>` - `Unauthorized` for a bad signature, expiry or subject
    pub fn verify(&self, token: &str) -> Result<Uuid, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected access token");
                invalid_token()
            })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| invalid_token())
    }
}

fn invalid_token() -> ServiceError {
    ServiceError::Unauthorized("Invalid or expired token".to_string())
}

/// The dealer behind the request's bearer token.
///
/// Use as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthDealer {
    pub id: Uuid,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthDealer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ServiceError::Unauthorized("Missing or malformed bearer token".to_string())
            })?;

        let dealer = state.accounts.authenticate(token).await?;

        Ok(AuthDealer {
            id: dealer.id,
            username: dealer.username,
        })
    }
}
