use super::error::AuthError;
use super::models::UserProfile;
use super::password::verify_password;
use super::repository::UserRepository;
use std::sync::Arc;
use tracing::warn;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Authenticate a user by username and password.
    ///
    /// An unknown username, a wrong password and an unreadable stored hash all
    /// come back as `InvalidCredentials` so callers cannot tell them apart.
    /// Store failures still propagate as `StorageError`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(user.profile()),
            Ok(false) => {
                warn!("Passwords did not match for user {}", username);
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                warn!("Stored password hash for {} is unusable: {}", username, e);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
