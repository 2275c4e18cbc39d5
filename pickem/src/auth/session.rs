use super::auth_service::AuthService;
use super::error::AuthError;
use super::token::TokenService;
use std::sync::Arc;
use tracing::{error, info};

/// Handle returned by a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login, refresh and logout on top of credential checks and the token service
pub struct SessionService {
    auth_service: Arc<AuthService>,
    token_service: Arc<TokenService>,
}

impl SessionService {
    pub fn new(auth_service: Arc<AuthService>, token_service: Arc<TokenService>) -> Self {
        Self {
            auth_service,
            token_service,
        }
    }

    /// Verify credentials and open a session.
    ///
    /// Once the password has been accepted every later failure is returned as
    /// is; a login never succeeds without a persisted refresh token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let profile = self.auth_service.authenticate(username, password).await?;

        let access_token = self.token_service.issue(&profile)?;
        let refresh_token = TokenService::generate_refresh_token()?;

        if let Err(e) = self
            .token_service
            .persist_refresh_token(&profile.id, &refresh_token)
            .await
        {
            error!("Failed to persist refresh token for {}: {}", profile.username, e);
            return Err(e);
        }

        info!("LOGIN: username={}", profile.username);

        Ok(Session {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token. The refresh token stays valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let profile = self
            .token_service
            .redeem_refresh_token(refresh_token)
            .await?;

        self.token_service.issue(&profile)
    }

    /// Revoke a refresh token
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.token_service.revoke_refresh_token(refresh_token).await
    }
}
