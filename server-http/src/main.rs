use axum::extract::Request;
use axum::ServiceExt;
use chrono::Duration;
use pickem::auth::defaults::ensure_bootstrap_user;
use pickem::auth::{SledRefreshTokenRepository, SledUserRepository};
use server_http::{build_router, AppState};
use shared::config::Config;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Pickem HTTP Server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    let state = init_auth_system(&config).await?;
    let router = build_router(state, &config);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("HTTP Server listening on http://{}", address);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(router))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn init_auth_system(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let data_dir = Path::new(&config.data_dir);
    std::fs::create_dir_all(data_dir)?;

    let user_repo = Arc::new(SledUserRepository::new(data_dir.join("users.sled"))?);
    let token_repo = Arc::new(SledRefreshTokenRepository::new(data_dir.join("tokens.sled"))?);

    let state = AppState::new(
        user_repo,
        token_repo,
        config.jwt_secret.as_deref(),
        Duration::hours(config.access_token_ttl_hours),
    );

    match (&config.bootstrap_username, &config.bootstrap_password) {
        (Some(username), Some(password)) => {
            if ensure_bootstrap_user(&state.user_service, username, password).await? {
                info!("Bootstrap user created: {}", username);
            } else {
                info!("Bootstrap user already exists: {}", username);
            }
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("Both PICKEM_BOOTSTRAP_USERNAME and PICKEM_BOOTSTRAP_PASSWORD are needed to seed an account");
        }
        (None, None) => {}
    }

    Ok(state)
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
