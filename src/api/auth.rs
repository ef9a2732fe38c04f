//! Authentication API endpoints.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::Claims;
use crate::AppState;

/// Dummy hash for timing attack prevention.
/// This is a valid Argon2 hash that will always fail verification.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nYXR0YWNr$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with JWT token.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information returned in responses (without password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub is_staff: bool,
}

/// POST /api/auth/register
///
/// Creates a new non-staff user account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>)> {
    if body.email.is_empty() || !body.email.contains('@') {
        return Err(AppError::BadRequest(
            "A valid email address is required".to_string(),
        ));
    }
    if body.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let auth_service = state.auth_service();
    let password_hash = auth_service.hash_password(&body.password)?;

    let db = state.db.lock().await;

    let exists: bool = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        [&body.email],
        |row| row.get(0),
    )?;
    if exists {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    db.execute(
        "INSERT INTO users (email, password_hash, is_staff) VALUES (?1, ?2, 0)",
        rusqlite::params![body.email, password_hash],
    )?;
    let user_id = db.last_insert_rowid();

    tracing::info!(user_id = user_id, email = %body.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(UserInfo {
            id: user_id,
            email: body.email,
            is_staff: false,
        }),
    ))
}

/// POST /api/auth/login
///
/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let db = state.db.lock().await;
    let auth_service = state.auth_service();

    let user_result = db.query_row(
        "SELECT id, email, password_hash, is_staff FROM users WHERE email = ?1",
        [&body.email],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
            ))
        },
    );

    let (user_id, email, is_staff, authenticated) = match user_result {
        Ok((id, email, hash, staff)) => {
            let valid = auth_service.verify_password(&body.password, &hash)?;
            (id, email, staff, valid)
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            // Perform dummy verification to prevent timing attack
            let _ = auth_service.verify_password(&body.password, DUMMY_HASH);
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(AppError::Sqlite(e)),
    };

    if !authenticated {
        return Err(AppError::Unauthorized);
    }

    // Stateless JWT - no session storage needed
    let token = auth_service.create_token(user_id, is_staff)?;

    tracing::info!(user_id = user_id, email = %email, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: user_id,
            email,
            is_staff,
        },
    }))
}

/// GET /api/auth/me
///
/// Returns the current authenticated user's information.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserInfo>> {
    let db = state.db.lock().await;

    let user = db
        .query_row(
            "SELECT id, email, is_staff FROM users WHERE id = ?1",
            [claims.sub],
            |row| {
                Ok(UserInfo {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    is_staff: row.get(2)?,
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::NotFound("User not found".to_string())
            }
            _ => AppError::Sqlite(e),
        })?;

    Ok(Json(user))
}
