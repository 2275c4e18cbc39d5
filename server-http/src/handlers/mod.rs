pub mod auth;
pub mod health;
pub mod users;

pub use auth::{login, logout, refresh};
pub use health::{health_check, home};
pub use users::{create_user, delete_user, get_user, list_users, update_user};
