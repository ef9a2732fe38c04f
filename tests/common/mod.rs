//! Test infrastructure for cinema backend integration tests.
//!
//! Provides a `TestApp` wrapper around `axum_test::TestServer` with helper
//! methods for creating users, generating auth tokens, and seeding catalog
//! data.

use axum_test::TestServer;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::Mutex;

use cinema_backend::services::AuthService;
use cinema_backend::{config::Config, db, router, AppState};

const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";

/// Test application wrapper around axum_test::TestServer.
pub struct TestApp {
    server: TestServer,
    db: Arc<Mutex<Connection>>,
    auth_service: Arc<AuthService>,
}

impl TestApp {
    /// Create a new test application with in-memory database.
    ///
    /// Sets up the complete backend with:
    /// - In-memory SQLite database with all migrations applied
    /// - Test configuration with default values
    /// - AuthService with test JWT secret
    /// - The production router from `cinema_backend::router`
    pub async fn new() -> Self {
        let conn = db::init_db_memory().expect("Failed to initialize test database");
        let db = Arc::new(Mutex::new(conn));

        let config = Config {
            server: cinema_backend::config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                jwt_secret: Some(TEST_JWT_SECRET.to_string()),
            },
            database: cinema_backend::config::DatabaseConfig {
                path: ":memory:".into(),
            },
        };

        let auth_service = Arc::new(AuthService::new(TEST_JWT_SECRET.to_string()));

        let state = AppState {
            config: Arc::new(config),
            db: Arc::clone(&db),
            auth_service: Arc::clone(&auth_service),
        };

        let app = router(state);
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            db,
            auth_service,
        }
    }

    /// Get a reference to the test server.
    pub fn server(&self) -> &TestServer {
        &self.server
    }

    /// Get a reference to the database connection.
    ///
    /// Useful for seeding test data or verifying database state.
    #[allow(dead_code)]
    pub fn db(&self) -> &Arc<Mutex<Connection>> {
        &self.db
    }

    /// Create a test user in the database.
    ///
    /// Returns the user_id of the created user.
    pub async fn create_test_user(&self, email: &str, password: &str, is_staff: bool) -> i64 {
        let password_hash = self
            .auth_service
            .hash_password(password)
            .expect("Failed to hash password");

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO users (email, password_hash, is_staff) VALUES (?1, ?2, ?3)",
            rusqlite::params![email, password_hash, is_staff],
        )
        .expect("Failed to create test user");

        db.last_insert_rowid()
    }

    /// Generate a JWT token for the given user.
    pub fn get_auth_token(&self, user_id: i64, staff: bool) -> String {
        self.auth_service
            .create_token(user_id, staff)
            .expect("Failed to create token")
    }

    /// Create an Authorization header tuple for use with HTTP requests.
    pub fn auth_header(&self, token: &str) -> (axum::http::HeaderName, axum::http::HeaderValue) {
        use axum::http::{header::AUTHORIZATION, HeaderValue};
        (
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid token format"),
        )
    }

    /// Create a staff user and return their ID and auth token.
    #[allow(dead_code)]
    pub async fn create_staff(&self) -> (i64, String) {
        let user_id = self
            .create_test_user("admin@admin.test", "adminpass", true)
            .await;
        let token = self.get_auth_token(user_id, true);
        (user_id, token)
    }

    /// Create a regular (non-staff) user and return their ID and auth token.
    #[allow(dead_code)]
    pub async fn create_user(&self) -> (i64, String) {
        let user_id = self
            .create_test_user("test@test.test", "testpass1", false)
            .await;
        let token = self.get_auth_token(user_id, false);
        (user_id, token)
    }

    /// Insert a movie directly into the database and return its id.
    #[allow(dead_code)]
    pub async fn sample_movie(&self, title: &str) -> i64 {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO movies (title, description, duration) VALUES (?1, 'Some description', 120)",
            [title],
        )
        .expect("Failed to insert sample movie");
        db.last_insert_rowid()
    }

    /// Insert a genre directly into the database and return its id.
    #[allow(dead_code)]
    pub async fn create_genre(&self, name: &str) -> i64 {
        let db = self.db.lock().await;
        db.execute("INSERT INTO genres (name) VALUES (?1)", [name])
            .expect("Failed to insert genre");
        db.last_insert_rowid()
    }

    /// Insert an actor directly into the database and return its id.
    #[allow(dead_code)]
    pub async fn create_actor(&self, name: &str) -> i64 {
        let db = self.db.lock().await;
        db.execute("INSERT INTO actors (name) VALUES (?1)", [name])
            .expect("Failed to insert actor");
        db.last_insert_rowid()
    }

    /// Associate a movie with a genre.
    #[allow(dead_code)]
    pub async fn link_genre(&self, movie_id: i64, genre_id: i64) {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO movie_genres (movie_id, genre_id) VALUES (?1, ?2)",
            [movie_id, genre_id],
        )
        .expect("Failed to link genre");
    }

    /// Associate a movie with an actor.
    #[allow(dead_code)]
    pub async fn link_actor(&self, movie_id: i64, actor_id: i64) {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO movie_actors (movie_id, actor_id) VALUES (?1, ?2)",
            [movie_id, actor_id],
        )
        .expect("Failed to link actor");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_creation() {
        let app = TestApp::new().await;
        assert!(app.db.lock().await.is_autocommit());
    }

    #[tokio::test]
    async fn test_create_test_user() {
        let app = TestApp::new().await;
        let user_id = app.create_test_user("a@b.test", "pass123", false).await;
        assert!(user_id > 0);

        let db = app.db.lock().await;
        let email: String = db
            .query_row("SELECT email FROM users WHERE id = ?1", [user_id], |row| {
                row.get(0)
            })
            .expect("User not found");
        assert_eq!(email, "a@b.test");
    }

    #[tokio::test]
    async fn test_get_auth_token() {
        let app = TestApp::new().await;
        let token = app.get_auth_token(1, true);
        assert!(!token.is_empty());

        let claims = app
            .auth_service
            .verify_token(&token)
            .expect("Token should be valid");
        assert_eq!(claims.sub, 1);
        assert!(claims.staff);
    }

    #[tokio::test]
    async fn test_health_check_endpoint() {
        let app = TestApp::new().await;
        let response = app.server().get("/health").await;

        response.assert_status_ok();
        response.assert_json_contains(&serde_json::json!({
            "message": "Cinema Backend is running"
        }));
    }
}
