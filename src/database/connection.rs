//! Configuración de conexión a PostgreSQL
//!
//! Este módulo maneja la conexión a la base de datos y la creación del schema.

use anyhow::{Context, Result};
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::database::{mask_database_url, DatabaseConfig};

/// Schema inicial; idempotente (`CREATE ... IF NOT EXISTS`)
const INIT_SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Conexión a la base de datos
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Conectar usando la configuración dada
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("🔗 Conectando a PostgreSQL: {}", mask_database_url(&config.url));

        let pool = config
            .create_pool()
            .await
            .context("No se pudo crear el pool de conexiones")?;

        info!("✅ PostgreSQL conectado (max_connections={})", config.max_connections);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Crear las tablas si no existen
    pub async fn run_migrations(&self) -> Result<()> {
        // Sin argumentos sqlx usa el protocolo simple, que acepta varias sentencias
        self.pool
            .execute(INIT_SCHEMA)
            .await
            .context("Error aplicando el schema inicial")?;
        info!("📐 Schema verificado");
        Ok(())
    }
}
