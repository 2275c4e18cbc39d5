// Public API
pub mod auth_service;
pub mod defaults;
pub mod error;
pub mod models;
pub mod password;
pub mod repository;
pub mod session;
pub mod sled_repository;
pub mod token;
pub mod user_service;

// Re-export commonly used types
pub use auth_service::AuthService;
pub use error::AuthError;
pub use models::{NewUser, RefreshTokenRecord, User, UserProfile, UserUpdate};
pub use repository::{RefreshTokenRepository, UserRepository};
pub use session::{Session, SessionService};
pub use sled_repository::{SledRefreshTokenRepository, SledUserRepository};
pub use token::{AccessClaims, TokenService};
pub use user_service::UserService;
