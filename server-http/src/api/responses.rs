use serde::Serialize;

#[derive(Serialize)]
pub struct HomeResponse {
    pub hello: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

/// Response body for a successful login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed access token
    pub jwt: String,
    /// Opaque token for /auth/refresh and /auth/logout
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub jwt: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// Error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_status: u16,
    pub error_message: String,
}

/// Serializes as `{}`
#[derive(Debug, Serialize)]
pub struct EmptyResponse {}
