use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use chrono::Duration;
use pickem::auth::{NewUser, SledRefreshTokenRepository, SledUserRepository};
use serde_json::Value;
use server_http::{build_router, App, AppState};
use shared::config::Config;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "longpw12";

pub struct TestHarness {
    _temp_dir: TempDir,
    pub state: AppState,
    app: App,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_secret(Some(TEST_SECRET))
    }

    /// Harness whose server has no signing secret configured
    pub fn without_secret() -> Self {
        Self::with_secret(None)
    }

    fn with_secret(secret: Option<&str>) -> Self {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let user_repo = Arc::new(
            SledUserRepository::new(temp_dir.path().join("users.sled")).expect("user store"),
        );
        let token_repo = Arc::new(
            SledRefreshTokenRepository::new(temp_dir.path().join("tokens.sled"))
                .expect("token store"),
        );
        let state = AppState::new(user_repo, token_repo, secret, Duration::hours(1));
        let app = build_router(state.clone(), &Config::from_lookup(|_| None));

        Self {
            _temp_dir: temp_dir,
            state,
            app,
        }
    }

    pub async fn seed_user(&self, username: &str) {
        self.state
            .user_service
            .create_user(NewUser {
                username: username.to_string(),
                first_name: "First".to_string(),
                last_name: "Last".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("seed user");
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send_request(builder.body(body).expect("request")).await
    }

    pub fn app(&self) -> App {
        self.app.clone()
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        send_to(self.app(), request).await
    }

    /// Log in and return `(jwt, refresh_token)`
    pub async fn login(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        (
            body["jwt"].as_str().expect("jwt").to_string(),
            body["refreshToken"].as_str().expect("refresh token").to_string(),
        )
    }
}

/// Drive one request through the app and decode the JSON body, if any
pub async fn send_to(app: App, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
