use super::error::AuthError;
use super::models::NewUser;
use super::user_service::UserService;

/// Registration input for the account seeded at startup.
/// First and last name default to the username.
pub fn bootstrap_user(username: String, password: String) -> NewUser {
    NewUser {
        first_name: username.clone(),
        last_name: username.clone(),
        username,
        password,
    }
}

/// Create the bootstrap account unless the username is already taken.
/// Returns whether a new account was created.
pub async fn ensure_bootstrap_user(
    user_service: &UserService,
    username: &str,
    password: &str,
) -> Result<bool, AuthError> {
    match user_service
        .create_user(bootstrap_user(username.to_string(), password.to_string()))
        .await
    {
        Ok(_) => Ok(true),
        Err(AuthError::UserAlreadyExists) => Ok(false),
        Err(e) => Err(e),
    }
}
