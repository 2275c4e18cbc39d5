use chrono::Duration;
use pickem::auth::{
    AuthService, RefreshTokenRepository, SessionService, TokenService, UserRepository,
    UserService,
};
use std::sync::Arc;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub user_service: Arc<UserService>,
    pub token_service: Arc<TokenService>,
}

impl AppState {
    /// Wire the services on top of the given stores. Each request works on
    /// clones of these handles; nothing else is shared between requests.
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_repo: Arc<dyn RefreshTokenRepository>,
        jwt_secret: Option<&str>,
        access_token_ttl: Duration,
    ) -> Self {
        let token_service = Arc::new(TokenService::new(
            jwt_secret,
            access_token_ttl,
            user_repo.clone(),
            token_repo,
        ));
        let auth_service = Arc::new(AuthService::new(user_repo.clone()));
        let session_service = Arc::new(SessionService::new(auth_service, token_service.clone()));
        let user_service = Arc::new(UserService::new(user_repo, token_service.clone()));

        Self {
            session_service,
            user_service,
            token_service,
        }
    }
}
