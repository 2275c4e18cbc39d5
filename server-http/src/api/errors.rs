use super::responses::{EmptyResponse, ErrorResponse};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pickem::auth::AuthError;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error returned from handlers. Renders either `{}` or
/// `{"errorStatus": .., "errorMessage": ..}` with the given status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    /// An error with an empty JSON object as body
    pub fn bare(status: StatusCode) -> Self {
        Self {
            status,
            message: None,
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(message) => ApiError::new(StatusCode::BAD_REQUEST, message),
            AuthError::UserAlreadyExists => ApiError::new(StatusCode::BAD_REQUEST, err.to_string()),
            AuthError::InvalidCredentials => ApiError::bare(StatusCode::FORBIDDEN),
            AuthError::PermissionDenied => ApiError::new(StatusCode::FORBIDDEN, err.to_string()),
            AuthError::UserNotFound | AuthError::RefreshTokenNotFound => {
                ApiError::new(StatusCode::NOT_FOUND, err.to_string())
            }
            AuthError::InvalidToken => ApiError::new(StatusCode::UNAUTHORIZED, err.to_string()),
            other => {
                error!("Request failed: {}", other);
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.message {
            Some(message) => (
                self.status,
                Json(ErrorResponse {
                    error_status: self.status.as_u16(),
                    error_message: message,
                }),
            )
                .into_response(),
            None => (self.status, Json(EmptyResponse {})).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_mapping() {
        let cases = [
            (AuthError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AuthError::UserAlreadyExists, StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::FORBIDDEN),
            (AuthError::PermissionDenied, StatusCode::FORBIDDEN),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::RefreshTokenNotFound, StatusCode::NOT_FOUND),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (
                AuthError::StorageError("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::SigningError("key".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::EntropySourceError("rng".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_credentials_error_has_no_detail() {
        let err = ApiError::from(AuthError::InvalidCredentials);
        assert!(err.message().is_none());
    }

    #[test]
    fn test_infrastructure_detail_is_not_leaked() {
        let err = ApiError::from(AuthError::StorageError("/var/lib/secret-path".into()));
        assert_eq!(err.message(), Some(INTERNAL_ERROR_MESSAGE));
    }
}
