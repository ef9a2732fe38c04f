//! Request middleware for the cinema backend.

mod auth;

pub use auth::auth_middleware;
