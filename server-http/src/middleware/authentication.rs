use crate::api::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use pickem::auth::TokenService;
use std::sync::Arc;
use tracing::warn;

/// Extract Bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    // Authorization: Bearer <token>
    let mut parts = auth_header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("Bearer") => Some(token),
        _ => None,
    }
}

fn unauthorized(message: &str) -> Response {
    let mut response = ApiError::new(StatusCode::UNAUTHORIZED, message).into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

/// Bearer access token middleware.
///
/// Verifies signature and expiry only; no store lookup happens here. The
/// profile carried in the token is attached to the request extensions.
pub async fn auth_middleware(
    State(token_service): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

    let claims = token_service.validate(token).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        unauthorized("Invalid or expired access token")
    })?;

    request.extensions_mut().insert(claims.user);

    Ok(next.run(request).await)
}
