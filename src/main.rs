use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trail_routes::config::{DatabaseConfig, EnvironmentConfig};
use trail_routes::database::DatabaseConnection;
use trail_routes::repositories::InMemoryStore;
use trail_routes::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🗺️ Trail Routes - API de rutas y puntos");
    info!("========================================");

    let config = EnvironmentConfig::from_env()?;
    info!(
        "⚙️ Entorno: {} | storage: {} | política de imágenes: {:?}",
        config.environment,
        config.storage_root.display(),
        config.image_decode_policy
    );

    let app_state = match DatabaseConfig::from_env()? {
        Some(db_config) => {
            let connection = match DatabaseConnection::connect(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            connection.run_migrations().await?;
            AppState::with_postgres(config.clone(), connection.pool().clone())
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida: usando almacenamiento en memoria");
            let store = match &config.seed_file {
                Some(path) => InMemoryStore::from_seed_file(path).await?,
                None => InMemoryStore::new(),
            };
            AppState::with_memory(config.clone(), Arc::new(store))
        }
    };

    let app = trail_routes::create_app(app_state);

    let listener = tokio::net::TcpListener::bind(config.server_url()).await?;
    let addr = listener.local_addr()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   GET  /api/routes - Listar rutas");
    info!("   GET  /api/routes/:id - Obtener ruta");
    info!("   POST /api/routes/filter - Filtrar rutas");
    info!("   POST /api/routes/:id_or_slug/points - Añadir punto");
    info!("   GET  {}/points/* - Imágenes guardadas", config.public_storage_prefix);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
