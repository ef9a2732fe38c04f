//! Cinema Backend Library
//!
//! Core functionality for the cinema catalog backend. This library exposes
//! modules and the application router for use by the binary and the
//! integration tests.

use axum::{
    middleware as axum_mw,
    response::Json,
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod services;

use config::Config;
use services::AuthService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Mutex<Connection>>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Get a reference to the auth service.
    pub fn auth_service(&self) -> &AuthService {
        &self.auth_service
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub version: String,
}

pub async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Cinema Backend is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the complete application router.
///
/// Used by both `main` and the integration test harness so tests run
/// against the production routes.
pub fn router(state: AppState) -> Router {
    // Auth routes: register and login are public, /me requires a token
    let auth_routes = Router::new()
        .route("/register", post(api::auth::register))
        .route("/login", post(api::auth::login))
        .route(
            "/me",
            get(api::auth::me).layer(axum_mw::from_fn_with_state(
                state.clone(),
                middleware::auth_middleware,
            )),
        );

    // Catalog routes require authentication; write handlers enforce the
    // staff check themselves since reads and writes share paths.
    let movies_routes = Router::new()
        .route(
            "/",
            get(api::movies::list_movies).post(api::movies::create_movie),
        )
        .route(
            "/:id",
            get(api::movies::get_movie)
                .put(api::movies::replace_movie)
                .patch(api::movies::update_movie)
                .delete(api::movies::delete_movie),
        )
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let genres_routes = Router::new()
        .route(
            "/",
            get(api::genres::list_genres).post(api::genres::create_genre),
        )
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let actors_routes = Router::new()
        .route(
            "/",
            get(api::actors::list_actors).post(api::actors::create_actor),
        )
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/movies", movies_routes)
        .nest("/api/genres", genres_routes)
        .nest("/api/actors", actors_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
