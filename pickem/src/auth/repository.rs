use super::error::AuthError;
use super::models::{RefreshTokenRecord, User};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. Fails with `UserAlreadyExists` if the username is taken.
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;

    /// List all users
    async fn list_all(&self) -> Result<Vec<User>, AuthError>;

    /// Replace a stored user. A changed username must still be unique.
    async fn update(&self, user: User) -> Result<User, AuthError>;

    /// Delete a user by ID
    async fn delete(&self, id: &str) -> Result<(), AuthError>;

    /// Check if a username exists
    async fn username_exists(&self, username: &str) -> Result<bool, AuthError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Store a new refresh token record
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), AuthError>;

    /// Look up a record by its token value
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Atomically find and delete the record for `token`
    async fn remove_by_token(&self, token: &str)
    -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Delete every record owned by `user_id`, returning how many were removed
    async fn remove_by_user(&self, user_id: &str) -> Result<usize, AuthError>;
}
