//! Authentication middleware for the cinema backend.
//!
//! Validates bearer tokens and exposes the resulting identity to handlers.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, Result};
use crate::AppState;

/// Extracts the Bearer token from the Authorization header.
fn extract_bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Authentication middleware that validates JWT tokens.
///
/// Extracts the Bearer token from the Authorization header, validates it,
/// and adds the claims to the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = extract_bearer_token(&request).ok_or(AppError::Unauthorized)?;

    let auth_service = state.auth_service();
    let claims = auth_service.verify_token(token)?;

    // Add claims to request extensions for downstream handlers
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
