//! Application services for the cinema backend.

pub mod auth;

pub use auth::{AuthService, Claims};
