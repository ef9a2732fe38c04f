use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A movie as exposed by the API: scalar columns plus the ids of the
/// associated genres and actors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Running time in minutes.
    pub duration: i64,
    pub genres: Vec<i64>,
    pub actors: Vec<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
}
