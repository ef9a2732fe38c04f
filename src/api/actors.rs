//! Actor endpoints.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::db::models::Actor;
use crate::error::{AppError, Result};
use crate::services::Claims;
use crate::AppState;

/// Request body for creating an actor.
#[derive(Debug, Deserialize)]
pub struct CreateActorRequest {
    pub name: String,
}

/// GET /api/actors
///
/// Lists all actors.
pub async fn list_actors(State(state): State<AppState>) -> Result<Json<Vec<Actor>>> {
    let db = state.db.lock().await;

    let mut stmt = db.prepare("SELECT id, name FROM actors ORDER BY id")?;
    let actors = stmt
        .query_map([], |row| {
            Ok(Actor {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Json(actors))
}

/// POST /api/actors
///
/// Creates a new actor (staff only). Unlike genres, actor names are not
/// unique; two people can share a name.
pub async fn create_actor(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateActorRequest>,
) -> Result<(StatusCode, Json<Actor>)> {
    claims.require_staff()?;

    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let db = state.db.lock().await;

    db.execute("INSERT INTO actors (name) VALUES (?1)", [&body.name])?;
    let actor_id = db.last_insert_rowid();

    let actor = db.query_row(
        "SELECT id, name FROM actors WHERE id = ?1",
        [actor_id],
        |row| {
            Ok(Actor {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )?;

    tracing::info!(actor_id = actor.id, name = %actor.name, "Actor created");

    Ok((StatusCode::CREATED, Json(actor)))
}
