//! Movie catalog endpoints.
//!
//! Reads require authentication; writes additionally require staff
//! privileges.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::models::Movie;
use crate::error::{AppError, Result};
use crate::services::Claims;
use crate::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query parameters for listing movies.
#[derive(Debug, Deserialize)]
pub struct ListMoviesQuery {
    /// Case-insensitive title substring match.
    pub title: Option<String>,
    /// Comma-separated genre id list; matches movies with any listed genre.
    pub genres: Option<String>,
    /// Comma-separated actor id list; matches movies with any listed actor.
    pub actors: Option<String>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Items per page (default: 20, max: 100).
    pub limit: Option<u32>,
}

/// Paginated response wrapper.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// Items in the current page.
    pub results: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number (1-indexed).
    pub page: u32,
    /// Total number of pages.
    pub pages: u32,
}

/// Request body for creating a movie (also used for full updates).
#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub description: String,
    /// Running time in minutes.
    pub duration: i64,
    #[serde(default)]
    pub genres: Vec<i64>,
    #[serde(default)]
    pub actors: Vec<i64>,
}

/// Request body for partially updating a movie.
#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i64>,
    /// Replaces the genre association set when present.
    pub genres: Option<Vec<i64>>,
    /// Replaces the actor association set when present.
    pub actors: Option<Vec<i64>>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/movies
///
/// Lists movies with optional filtering and pagination.
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<ListMoviesQuery>,
) -> Result<Json<PaginatedResponse<Movie>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1).saturating_mul(limit);

    let genre_ids = query
        .genres
        .as_deref()
        .map(|raw| parse_id_list(raw, "genres"))
        .transpose()?;
    let actor_ids = query
        .actors
        .as_deref()
        .map(|raw| parse_id_list(raw, "actors"))
        .transpose()?;

    // Build the WHERE clause dynamically from the supplied filters
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql + Send>> = Vec::new();

    if let Some(title) = query.title.as_deref().filter(|t| !t.is_empty()) {
        clauses.push("instr(lower(m.title), lower(?)) > 0".to_string());
        params.push(Box::new(title.to_string()));
    }

    if let Some(ids) = genre_ids.filter(|ids| !ids.is_empty()) {
        clauses.push(format!(
            "m.id IN (SELECT movie_id FROM movie_genres WHERE genre_id IN ({}))",
            placeholders(ids.len())
        ));
        for id in ids {
            params.push(Box::new(id));
        }
    }

    if let Some(ids) = actor_ids.filter(|ids| !ids.is_empty()) {
        clauses.push(format!(
            "m.id IN (SELECT movie_id FROM movie_actors WHERE actor_id IN ({}))",
            placeholders(ids.len())
        ));
        for id in ids {
            params.push(Box::new(id));
        }
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let db = state.db.lock().await;

    let count_sql = format!("SELECT COUNT(*) FROM movies m{}", where_sql);
    let param_refs: Vec<&dyn rusqlite::ToSql> =
        params.iter().map(|p| p.as_ref() as &dyn rusqlite::ToSql).collect();
    let total: u64 = db.query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))?;

    let page_sql = format!(
        "SELECT m.id, m.title, m.description, m.duration, m.created_at, m.updated_at
         FROM movies m{}
         ORDER BY m.id
         LIMIT ? OFFSET ?",
        where_sql
    );
    params.push(Box::new(limit as i64));
    params.push(Box::new(offset as i64));
    let param_refs: Vec<&dyn rusqlite::ToSql> =
        params.iter().map(|p| p.as_ref() as &dyn rusqlite::ToSql).collect();

    let mut stmt = db.prepare(&page_sql)?;
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut results = Vec::with_capacity(rows.len());
    for (id, title, description, duration, created_at, updated_at) in rows {
        results.push(Movie {
            id,
            title,
            description,
            duration,
            genres: association_ids(&db, "movie_genres", "genre_id", id)?,
            actors: association_ids(&db, "movie_actors", "actor_id", id)?,
            created_at,
            updated_at,
        });
    }

    let pages = ((total as f64) / (limit as f64)).ceil() as u32;

    Ok(Json(PaginatedResponse {
        results,
        total,
        page,
        pages,
    }))
}

/// GET /api/movies/:id
///
/// Gets a single movie by ID.
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<Movie>> {
    let db = state.db.lock().await;
    let movie = fetch_movie(&db, movie_id)?;
    Ok(Json(movie))
}

/// POST /api/movies
///
/// Creates a new movie (staff only).
pub async fn create_movie(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<Movie>)> {
    claims.require_staff()?;
    validate_title(&body.title)?;
    validate_duration(body.duration)?;

    let db = state.db.lock().await;

    // Reject unknown association ids before writing anything
    ensure_ids_exist(&db, "genres", &body.genres)?;
    ensure_ids_exist(&db, "actors", &body.actors)?;

    db.execute(
        "INSERT INTO movies (title, description, duration) VALUES (?1, ?2, ?3)",
        rusqlite::params![body.title, body.description, body.duration],
    )?;
    let movie_id = db.last_insert_rowid();

    replace_associations(&db, "movie_genres", "genre_id", movie_id, &body.genres)?;
    replace_associations(&db, "movie_actors", "actor_id", movie_id, &body.actors)?;

    let movie = fetch_movie(&db, movie_id)?;

    tracing::info!(
        movie_id = movie.id,
        title = %movie.title,
        created_by = claims.sub,
        "Movie created"
    );

    Ok((StatusCode::CREATED, Json(movie)))
}

/// PATCH /api/movies/:id
///
/// Partially updates a movie (staff only). Only supplied fields change;
/// supplying `genres` or `actors` replaces that association set.
pub async fn update_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateMovieRequest>,
) -> Result<Json<Movie>> {
    claims.require_staff()?;

    let db = state.db.lock().await;
    ensure_movie_exists(&db, movie_id)?;

    if let Some(ref title) = body.title {
        validate_title(title)?;
    }
    if let Some(duration) = body.duration {
        validate_duration(duration)?;
    }
    if let Some(ref genres) = body.genres {
        ensure_ids_exist(&db, "genres", genres)?;
    }
    if let Some(ref actors) = body.actors {
        ensure_ids_exist(&db, "actors", actors)?;
    }

    // Build dynamic UPDATE query
    let mut updates = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(ref title) = body.title {
        updates.push("title = ?");
        params.push(Box::new(title.clone()));
    }
    if let Some(ref description) = body.description {
        updates.push("description = ?");
        params.push(Box::new(description.clone()));
    }
    if let Some(duration) = body.duration {
        updates.push("duration = ?");
        params.push(Box::new(duration));
    }

    if updates.is_empty() && body.genres.is_none() && body.actors.is_none() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    updates.push("updated_at = datetime('now')");
    let query = format!("UPDATE movies SET {} WHERE id = ?", updates.join(", "));
    params.push(Box::new(movie_id));

    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    db.execute(&query, param_refs.as_slice())?;

    if let Some(ref genres) = body.genres {
        replace_associations(&db, "movie_genres", "genre_id", movie_id, genres)?;
    }
    if let Some(ref actors) = body.actors {
        replace_associations(&db, "movie_actors", "actor_id", movie_id, actors)?;
    }

    let movie = fetch_movie(&db, movie_id)?;

    tracing::info!(movie_id = movie.id, updated_by = claims.sub, "Movie updated");

    Ok(Json(movie))
}

/// PUT /api/movies/:id
///
/// Fully replaces a movie (staff only). Omitted `genres`/`actors` clear
/// the corresponding association set.
pub async fn replace_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateMovieRequest>,
) -> Result<Json<Movie>> {
    claims.require_staff()?;
    validate_title(&body.title)?;
    validate_duration(body.duration)?;

    let db = state.db.lock().await;
    ensure_movie_exists(&db, movie_id)?;
    ensure_ids_exist(&db, "genres", &body.genres)?;
    ensure_ids_exist(&db, "actors", &body.actors)?;

    db.execute(
        "UPDATE movies
         SET title = ?1, description = ?2, duration = ?3, updated_at = datetime('now')
         WHERE id = ?4",
        rusqlite::params![body.title, body.description, body.duration, movie_id],
    )?;

    replace_associations(&db, "movie_genres", "genre_id", movie_id, &body.genres)?;
    replace_associations(&db, "movie_actors", "actor_id", movie_id, &body.actors)?;

    let movie = fetch_movie(&db, movie_id)?;

    tracing::info!(movie_id = movie.id, updated_by = claims.sub, "Movie replaced");

    Ok(Json(movie))
}

/// DELETE /api/movies/:id
///
/// Deletes a movie (staff only). Association rows cascade with the movie.
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode> {
    claims.require_staff()?;

    let db = state.db.lock().await;
    ensure_movie_exists(&db, movie_id)?;

    db.execute("DELETE FROM movies WHERE id = ?1", [movie_id])?;

    tracing::info!(movie_id = movie_id, deleted_by = claims.sub, "Movie deleted");

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Helpers
// =============================================================================

/// Parses a comma-separated id list, tolerating surrounding whitespace.
fn parse_id_list(raw: &str, param: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                AppError::BadRequest(format!("{} must be a comma-separated list of ids", param))
            })
        })
        .collect()
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    Ok(())
}

fn validate_duration(duration: i64) -> Result<()> {
    if duration <= 0 {
        return Err(AppError::BadRequest(
            "Duration must be a positive number of minutes".to_string(),
        ));
    }
    Ok(())
}

fn ensure_movie_exists(db: &Connection, movie_id: i64) -> Result<()> {
    let exists: bool = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM movies WHERE id = ?1)",
        [movie_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(AppError::NotFound("Movie not found".to_string()));
    }
    Ok(())
}

/// Verifies that every id references an existing row of `table`.
fn ensure_ids_exist(db: &Connection, table: &str, ids: &[i64]) -> Result<()> {
    let mut stmt = db.prepare(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
        table
    ))?;
    for id in ids {
        let exists: bool = stmt.query_row([id], |row| row.get(0))?;
        if !exists {
            return Err(AppError::BadRequest(format!(
                "Unknown {} id {}",
                table.trim_end_matches('s'),
                id
            )));
        }
    }
    Ok(())
}

/// Replaces a movie's association rows in the given join table.
fn replace_associations(
    db: &Connection,
    table: &str,
    column: &str,
    movie_id: i64,
    ids: &[i64],
) -> Result<()> {
    db.execute(
        &format!("DELETE FROM {} WHERE movie_id = ?1", table),
        [movie_id],
    )?;
    let mut stmt = db.prepare(&format!(
        "INSERT OR IGNORE INTO {} (movie_id, {}) VALUES (?1, ?2)",
        table, column
    ))?;
    for id in ids {
        stmt.execute(rusqlite::params![movie_id, id])?;
    }
    Ok(())
}

fn association_ids(
    db: &Connection,
    table: &str,
    column: &str,
    movie_id: i64,
) -> Result<Vec<i64>> {
    let mut stmt = db.prepare(&format!(
        "SELECT {} FROM {} WHERE movie_id = ?1 ORDER BY {}",
        column, table, column
    ))?;
    let ids = stmt
        .query_map([movie_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Loads a movie with its genre and actor ids, mapping a missing row
/// to `NotFound`.
fn fetch_movie(db: &Connection, movie_id: i64) -> Result<Movie> {
    let (id, title, description, duration, created_at, updated_at) = db
        .query_row(
            "SELECT id, title, description, duration, created_at, updated_at
             FROM movies WHERE id = ?1",
            [movie_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::NotFound("Movie not found".to_string())
            }
            _ => AppError::Sqlite(e),
        })?;

    Ok(Movie {
        id,
        title,
        description,
        duration,
        genres: association_ids(db, "movie_genres", "genre_id", id)?,
        actors: association_ids(db, "movie_actors", "actor_id", id)?,
        created_at,
        updated_at,
    })
}
