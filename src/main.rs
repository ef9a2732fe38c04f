use rand::Rng;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinema_backend::config::Config;
use cinema_backend::services::AuthService;
use cinema_backend::{db, router, AppState};

fn init_tracing() {
    // RUST_LOG environment variable controls log levels
    // Default: debug for our crate, info for axum, warn for dependencies
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("cinema_backend=debug,tower_http=debug,axum=info,warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Ensure a default staff user exists.
fn ensure_staff_user(conn: &Connection, auth_service: &AuthService) {
    let staff_exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE is_staff = 1)",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);

    if staff_exists {
        tracing::debug!("Staff user already exists");
        return;
    }

    let admin_email =
        std::env::var("CINEMA_ADMIN_EMAIL").unwrap_or_else(|_| "admin@cinema.local".to_string());

    // Generate a random password if not provided via environment
    let admin_password = std::env::var("CINEMA_ADMIN_PASSWORD").unwrap_or_else(|_| {
        let password: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        tracing::warn!("Generated staff password: {}", password);
        tracing::warn!("Set CINEMA_ADMIN_PASSWORD environment variable to use a fixed password");
        password
    });

    let password_hash = match auth_service.hash_password(&admin_password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Failed to hash staff password: {}", e);
            return;
        }
    };

    match conn.execute(
        "INSERT INTO users (email, password_hash, is_staff) VALUES (?1, ?2, 1)",
        rusqlite::params![admin_email, password_hash],
    ) {
        Ok(_) => tracing::info!(email = %admin_email, "Created default staff user"),
        Err(e) => tracing::error!("Failed to create staff user: {}", e),
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing first so we can log configuration loading
    init_tracing();

    tracing::info!("Starting Cinema Backend v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match Config::load() {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            tracing::debug!("Server: {}:{}", cfg.server.host, cfg.server.port);
            tracing::debug!("Database: {:?}", cfg.database.path);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Ensure database directory exists
    if let Some(parent) = config.database.path.parent() {
        if !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::error!("Failed to create database directory: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize database
    let conn = match db::init_db(&config.database.path) {
        Ok(conn) => {
            tracing::info!("Database initialized at {:?}", config.database.path);
            conn
        }
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    // Get JWT secret, generating one if not configured (development mode)
    let jwt_secret = config.server.jwt_secret.clone().unwrap_or_else(|| {
        let secret: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        tracing::warn!("No JWT secret configured, using random secret");
        tracing::warn!("Set CINEMA_SERVER__JWT_SECRET for production use");
        secret
    });

    // Create auth service
    let auth_service = AuthService::new(jwt_secret);

    // Ensure a staff user exists so the catalog can be administered
    ensure_staff_user(&conn, &auth_service);

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        db: Arc::new(Mutex::new(conn)),
        auth_service: Arc::new(auth_service),
    };

    let app = router(state);

    let addr = config.server_addr();
    tracing::info!("Cinema Backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
