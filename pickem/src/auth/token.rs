//! Access and refresh token lifecycle.
//!
//! Access tokens are HS256 JWTs carrying the sanitized profile and an absolute
//! expiry; they are never stored. Refresh tokens are opaque random strings kept
//! in the refresh token store until logout removes them.

use super::error::AuthError;
use super::models::{RefreshTokenRecord, UserProfile};
use super::repository::{RefreshTokenRepository, UserRepository};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Bytes of entropy in a refresh token
pub const REFRESH_TOKEN_BYTES: usize = 64;

pub const DEFAULT_ACCESS_TOKEN_TTL_HOURS: i64 = 72;

/// Claims embedded in every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user: UserProfile,
    /// Expiry as a unix timestamp in seconds
    pub exp: i64,
}

pub struct TokenService {
    keys: Option<(EncodingKey, DecodingKey)>,
    ttl: Duration,
    user_repo: Arc<dyn UserRepository>,
    token_repo: Arc<dyn RefreshTokenRepository>,
}

impl TokenService {
    /// A missing or empty `secret` leaves the service unable to sign; issuance
    /// then fails with `SigningError` instead of signing with a weak key.
    pub fn new(
        secret: Option<&str>,
        ttl: Duration,
        user_repo: Arc<dyn UserRepository>,
        token_repo: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        let keys = secret.filter(|s| !s.is_empty()).map(|s| {
            (
                EncodingKey::from_secret(s.as_bytes()),
                DecodingKey::from_secret(s.as_bytes()),
            )
        });

        Self {
            keys,
            ttl,
            user_repo,
            token_repo,
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a new access token for `profile`, expiring `ttl` from now
    pub fn issue(&self, profile: &UserProfile) -> Result<String, AuthError> {
        let (encoding_key, _) = self.keys.as_ref().ok_or_else(|| {
            error!("Cannot issue access token: signing secret is not configured");
            AuthError::SigningError("signing secret is not configured".to_string())
        })?;

        let expires_at = Utc::now().checked_add_signed(self.ttl).ok_or_else(|| {
            error!("Access token lifetime {} is out of range", self.ttl);
            AuthError::SigningError("access token lifetime is out of range".to_string())
        })?;

        let claims = AccessClaims {
            user: profile.clone(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, encoding_key).map_err(|e| {
            error!("Error creating the access token: {}", e);
            AuthError::SigningError(e.to_string())
        })
    }

    /// Check signature and expiry of an access token and return its claims
    pub fn validate(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let (_, decoding_key) = self.keys.as_ref().ok_or(AuthError::InvalidToken)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<AccessClaims>(token, decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected access token: {}", e);
                AuthError::InvalidToken
            })
    }

    /// Draw a fresh refresh token value from the OS random source
    pub fn generate_refresh_token() -> Result<String, AuthError> {
        generate_refresh_token_with(&mut OsRng)
    }

    pub async fn persist_refresh_token(&self, user_id: &str, value: &str) -> Result<(), AuthError> {
        let record = RefreshTokenRecord::new(user_id.to_string(), value.to_string());
        self.token_repo.insert(record).await
    }

    /// Resolve a refresh token to its owner's profile. The record is left in place,
    /// so the same value keeps working until it is revoked.
    pub async fn redeem_refresh_token(&self, value: &str) -> Result<UserProfile, AuthError> {
        let record = self
            .token_repo
            .find_by_token(value)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;

        let user = self
            .user_repo
            .find_by_id(&record.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.profile())
    }

    pub async fn revoke_refresh_token(&self, value: &str) -> Result<(), AuthError> {
        self.token_repo
            .remove_by_token(value)
            .await?
            .map(|_| ())
            .ok_or(AuthError::RefreshTokenNotFound)
    }

    /// Remove every refresh token belonging to `user_id`
    pub async fn revoke_user_tokens(&self, user_id: &str) -> Result<usize, AuthError> {
        self.token_repo.remove_by_user(user_id).await
    }
}

fn generate_refresh_token_with<R: TryRngCore>(rng: &mut R) -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rng.try_fill_bytes(&mut bytes).map_err(|e| {
        error!("Error creating the refresh token: {}", e);
        AuthError::EntropySourceError(e.to_string())
    })?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
