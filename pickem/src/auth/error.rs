use sled::transaction::TransactionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("User not found")]
    UserNotFound,

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Username is already in use")]
    UserAlreadyExists,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid or expired access token")]
    InvalidToken,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),

    #[error("Token signing error: {0}")]
    SigningError(String),

    #[error("Entropy source error: {0}")]
    EntropySourceError(String),
}

impl AuthError {
    /// Store, signing, hashing and entropy failures. These are never shown to clients.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::StorageError(_)
                | AuthError::SerializationError(_)
                | AuthError::PasswordHashError(_)
                | AuthError::SigningError(_)
                | AuthError::EntropySourceError(_)
        )
    }
}

impl From<sled::Error> for AuthError {
    fn from(err: sled::Error) -> Self {
        AuthError::StorageError(err.to_string())
    }
}

impl From<TransactionError<AuthError>> for AuthError {
    fn from(err: TransactionError<AuthError>) -> Self {
        match err {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::SerializationError(err.to_string())
    }
}
