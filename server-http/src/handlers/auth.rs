use crate::api::{ApiError, LoginRequest, LoginResponse, RefreshResponse, RefreshTokenRequest};
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use pickem::auth::AuthError;
use tracing::{error, info, warn};

/// POST /auth/login
///
/// Exchanges `{"username", "password"}` for an access token and a refresh
/// token. Bad credentials get a 403 with an empty body whether the username or
/// the password was wrong.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;

    match state.session_service.login(&req.username, &req.password).await {
        Ok(session) => Ok(Json(LoginResponse {
            jwt: session.access_token,
            refresh_token: session.refresh_token,
        })),
        Err(AuthError::InvalidCredentials) => {
            warn!("LOGIN_REJECTED: username={}", req.username);
            Err(ApiError::bare(StatusCode::FORBIDDEN))
        }
        Err(e) => {
            error!("Login failed for {}: {}", req.username, e);
            Err(ApiError::bare(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// POST /auth/refresh
///
/// Issues a new access token for a stored refresh token. The refresh token
/// itself stays valid.
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let Json(req) = body?;

    match state.session_service.refresh(&req.refresh_token).await {
        Ok(jwt) => Ok(Json(RefreshResponse { jwt })),
        Err(e @ (AuthError::RefreshTokenNotFound | AuthError::UserNotFound)) => {
            warn!("Unable to refresh session: {}", e);
            Err(ApiError::bare(StatusCode::NOT_FOUND))
        }
        Err(e) => {
            error!("Refresh failed: {}", e);
            Err(ApiError::bare(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// POST /auth/logout
///
/// Revokes a refresh token. Clients should drop their access token as well;
/// it stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    body: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = body?;

    match state.session_service.logout(&req.refresh_token).await {
        Ok(()) => {
            info!("LOGOUT: refresh token revoked");
            Ok(StatusCode::OK)
        }
        Err(AuthError::RefreshTokenNotFound) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "Unable to find and remove refresh token",
        )),
        Err(e) => {
            error!("Logout failed: {}", e);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to remove refresh token",
            ))
        }
    }
}
