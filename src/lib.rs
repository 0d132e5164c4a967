//! Backend de rutas, puntos e info items
//!
//! API JSON para listar y filtrar rutas y añadir puntos con imágenes base64.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod navigation;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{extract::DefaultBodyLimit, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use middleware::cors::cors_layer;
use state::AppState;

/// Construir el router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/routes", routes::route_routes::create_route_router());

    let prefix = state.config.public_storage_prefix.clone();
    if prefix.starts_with('/') && prefix.len() > 1 {
        app = app.nest_service(&prefix, ServeDir::new(state.config.storage_root.clone()));
    } else {
        warn!("⚠️ PUBLIC_STORAGE_PREFIX '{}' no es una ruta servible; imágenes sin servir", prefix);
    }

    app.layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Endpoint de salud simple
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "trail-routes",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
