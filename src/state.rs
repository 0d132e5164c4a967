//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Es inmutable después del arranque.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    InMemoryStore, PgPointRepository, PgRouteRepository, PointRepository, RouteRepository,
};
use crate::services::image_service::ImageStorage;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub routes: Arc<dyn RouteRepository>,
    pub points: Arc<dyn PointRepository>,
    pub images: ImageStorage,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        routes: Arc<dyn RouteRepository>,
        points: Arc<dyn PointRepository>,
    ) -> Self {
        let images = ImageStorage::new(
            config.storage_root.clone(),
            config.public_storage_prefix.clone(),
        );
        Self {
            config,
            routes,
            points,
            images,
        }
    }

    /// Estado respaldado por PostgreSQL
    pub fn with_postgres(config: EnvironmentConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgRouteRepository::new(pool.clone())),
            Arc::new(PgPointRepository::new(pool)),
        )
    }

    /// Estado respaldado por el store en memoria
    pub fn with_memory(config: EnvironmentConfig, store: Arc<InMemoryStore>) -> Self {
        Self::new(config, store.clone(), store)
    }
}
