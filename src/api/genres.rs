//! Genre endpoints.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::db::models::Genre;
use crate::error::{AppError, Result};
use crate::services::Claims;
use crate::AppState;

/// Request body for creating a genre.
#[derive(Debug, Deserialize)]
pub struct CreateGenreRequest {
    pub name: String,
}

/// GET /api/genres
///
/// Lists all genres.
pub async fn list_genres(State(state): State<AppState>) -> Result<Json<Vec<Genre>>> {
    let db = state.db.lock().await;

    let mut stmt = db.prepare("SELECT id, name FROM genres ORDER BY id")?;
    let genres = stmt
        .query_map([], |row| {
            Ok(Genre {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Json(genres))
}

/// POST /api/genres
///
/// Creates a new genre (staff only). Genre names are unique.
pub async fn create_genre(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateGenreRequest>,
) -> Result<(StatusCode, Json<Genre>)> {
    claims.require_staff()?;

    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let db = state.db.lock().await;

    let exists: bool = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM genres WHERE name = ?1)",
        [&body.name],
        |row| row.get(0),
    )?;
    if exists {
        return Err(AppError::BadRequest("Genre already exists".to_string()));
    }

    db.execute("INSERT INTO genres (name) VALUES (?1)", [&body.name])?;
    let genre_id = db.last_insert_rowid();

    let genre = db.query_row(
        "SELECT id, name FROM genres WHERE id = ?1",
        [genre_id],
        |row| {
            Ok(Genre {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )?;

    tracing::info!(genre_id = genre.id, name = %genre.name, "Genre created");

    Ok((StatusCode::CREATED, Json(genre)))
}
