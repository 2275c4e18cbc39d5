use crate::api::{ApiError, CreateUserRequest, SuccessResponse, UpdateUserRequest};
use crate::state::AppState;
use crate::validation::UserInputFactory;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use pickem::auth::{AuthError, UserProfile};
use tracing::{error, info, warn};

/// POST /users - Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserProfile>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = body?;

    let new_user = UserInputFactory::new_user(req).map_err(|e| {
        warn!("CREATE_USER rejected: {}", e);
        ApiError::from(e)
    })?;

    info!(
        "CREATE_USER: username={}, requested_by={}",
        new_user.username, current_user.username
    );

    match state.user_service.create_user(new_user).await {
        Ok(_) => Ok(Json(SuccessResponse::ok())),
        Err(e) => {
            if e.is_infrastructure() {
                error!("Failed to create user: {}", e);
            }
            Err(e.into())
        }
    }
}

/// GET /users - List all users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    match state.user_service.list_users().await {
        Ok(users) => Ok(Json(users)),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(e.into())
        }
    }
}

/// GET /users/{username} - Get user by username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    match state.user_service.get_user(&username).await {
        Ok(user) => Ok(Json(user)),
        Err(AuthError::UserNotFound) => {
            Err(ApiError::new(StatusCode::NOT_FOUND, "User not found"))
        }
        Err(e) => {
            error!("Failed to get user {}: {}", username, e);
            Err(e.into())
        }
    }
}

/// PUT /users/{username} - Update your own profile
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserProfile>,
    Path(username): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    // Only allow users to update themselves
    if current_user.username != username {
        warn!(
            "UPDATE_USER denied: username={}, requested_by={}",
            username, current_user.username
        );
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "Not allowed to update other users",
        ));
    }

    let Json(req) = body?;
    let update = UserInputFactory::update(req)?;

    match state
        .user_service
        .update_user(&current_user, &username, update)
        .await
    {
        Ok(_) => Ok(Json(SuccessResponse::ok())),
        Err(AuthError::PermissionDenied) => Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "Not allowed to update other users",
        )),
        Err(AuthError::UserNotFound) => {
            Err(ApiError::new(StatusCode::NOT_FOUND, "User was not found"))
        }
        Err(e) => {
            if e.is_infrastructure() {
                error!("Failed to update user {}: {}", username, e);
            }
            Err(e.into())
        }
    }
}

/// DELETE /users/{username} - Delete your own account
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserProfile>,
    Path(username): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    // Only allow users to delete themselves
    if current_user.username != username {
        warn!(
            "DELETE_USER denied: username={}, requested_by={}",
            username, current_user.username
        );
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "Not allowed to delete other users",
        ));
    }

    match state
        .user_service
        .delete_user(&current_user, &username)
        .await
    {
        Ok(()) => Ok(Json(SuccessResponse::ok())),
        Err(AuthError::PermissionDenied) => Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "Not allowed to delete other users",
        )),
        Err(AuthError::UserNotFound) => {
            Err(ApiError::new(StatusCode::NOT_FOUND, "User was not found"))
        }
        Err(e) => {
            error!("Failed to delete user {}: {}", username, e);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to delete user",
            ))
        }
    }
}
