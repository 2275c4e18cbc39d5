pub mod authentication;

pub use authentication::auth_middleware;
