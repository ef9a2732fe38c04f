//! Database module for the cinema backend.
//!
//! Provides database initialization, migrations, and models.

use rusqlite::Connection;
use std::path::Path;

pub mod models;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("src/db/migrations");
}

#[derive(Debug)]
pub enum DbError {
    Connection(rusqlite::Error),
    Migration(refinery::Error),
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::Connection(e) => write!(f, "Database connection error: {}", e),
            DbError::Migration(e) => write!(f, "Migration error: {}", e),
        }
    }
}

impl std::error::Error for DbError {}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        DbError::Connection(err)
    }
}

impl From<refinery::Error> for DbError {
    fn from(err: refinery::Error) -> Self {
        DbError::Migration(err)
    }
}

/// Configure connection with recommended pragmas
fn configure_connection(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

/// Initialize database connection and run migrations
pub fn init_db<P: AsRef<Path>>(db_path: P) -> Result<Connection, DbError> {
    let mut conn = Connection::open(db_path)?;
    configure_connection(&conn)?;
    embedded::migrations::runner().run(&mut conn)?;
    Ok(conn)
}

/// Initialize an in-memory database (useful for testing)
pub fn init_db_memory() -> Result<Connection, DbError> {
    let mut conn = Connection::open_in_memory()?;
    configure_connection(&conn)?;
    embedded::migrations::runner().run(&mut conn)?;
    Ok(conn)
}
