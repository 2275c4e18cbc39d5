use crate::api::{ApiError, CreateUserRequest, UpdateUserRequest};
use axum::http::StatusCode;
use pickem::auth::password::MIN_PASSWORD_LENGTH;
use pickem::auth::{NewUser, UserUpdate};

const MIN_NAME_LENGTH: usize = 1;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingRequiredField { field: &'static str },
    TooShort { field: &'static str, min: usize },
    PasswordMismatch,
    EmptyUpdate,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingRequiredField { field } => {
                write!(f, "Missing required field '{}'", field)
            }
            ValidationError::TooShort { field, min } => {
                write!(f, "Field '{}' must be at least {} characters", field, min)
            }
            ValidationError::PasswordMismatch => {
                write!(f, "Password and Confirmation did not match")
            }
            ValidationError::EmptyUpdate => {
                write!(
                    f,
                    "Provide at least one of 'username', 'firstName' or 'lastName'"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

pub struct UserInputFactory;

impl UserInputFactory {
    /// Validate a registration body and turn it into a `NewUser`
    pub fn new_user(req: CreateUserRequest) -> Result<NewUser, ValidationError> {
        let username = Self::required("username", req.username, MIN_NAME_LENGTH)?;
        let first_name = Self::required("firstName", req.first_name, MIN_NAME_LENGTH)?;
        let last_name = Self::required("lastName", req.last_name, MIN_NAME_LENGTH)?;
        let password = Self::required("password", req.password, MIN_PASSWORD_LENGTH)?;
        let confirm_password =
            Self::required("confirmPassword", req.confirm_password, MIN_PASSWORD_LENGTH)?;

        if password != confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(NewUser {
            username,
            first_name,
            last_name,
            password,
        })
    }

    /// Validate a partial update body. Present fields must be non-empty.
    pub fn update(req: UpdateUserRequest) -> Result<UserUpdate, ValidationError> {
        let update = UserUpdate {
            username: Self::optional("username", req.username)?,
            first_name: Self::optional("firstName", req.first_name)?,
            last_name: Self::optional("lastName", req.last_name)?,
        };

        if update.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }

        Ok(update)
    }

    fn required(
        field: &'static str,
        value: Option<String>,
        min: usize,
    ) -> Result<String, ValidationError> {
        let value = value.ok_or(ValidationError::MissingRequiredField { field })?;
        Self::check_length(field, value, min)
    }

    fn optional(
        field: &'static str,
        value: Option<String>,
    ) -> Result<Option<String>, ValidationError> {
        value
            .map(|v| Self::check_length(field, v, MIN_NAME_LENGTH))
            .transpose()
    }

    fn check_length(
        field: &'static str,
        value: String,
        min: usize,
    ) -> Result<String, ValidationError> {
        if value.chars().count() < min {
            return Err(ValidationError::TooShort { field, min });
        }
        Ok(value)
    }
}
