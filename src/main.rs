use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use talleres_unidos::build_router;
use talleres_unidos::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use talleres_unidos::database::{mask_database_url, DatabaseConnection};
use talleres_unidos::state::AppState;

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

    info!("🔧 Talleres Unidos - Solicitudes de piezas");
    info!("==========================================");

    let config = EnvironmentConfig::from_env()?;
    if config.is_development() {
        warn!("🧪 Modo desarrollo");
    }

    let app_state = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_environment(&config)
                .ok_or_else(|| anyhow!("DATABASE_URL no definido"))?;
            info!("🗄️ Conectando a {}", mask_database_url(&db_config.url));

            let db_connection = match DatabaseConnection::new(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow!("Error de base de datos: {}", e));
                }
            };
            db_connection.run_migrations().await?;
            info!("✅ Esquema verificado");

            AppState::postgres(db_connection.pool().clone(), config.clone())?
        }
        StorageBackend::Memory => {
            warn!("⚠️ Backend en memoria: los datos se pierden al reiniciar");
            AppState::in_memory(config.clone())?
        }
    };

    let app = build_router(app_state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("📝 Solicitudes:");
    info!("   POST /api/solicitudes - Crear solicitud");
    info!("   GET  /api/solicitudes?estado= - Listar por estado");
    info!("   GET  /api/solicitudes/:id - Obtener solicitud");
    info!("   DELETE /api/solicitudes/:id - Eliminar solicitud instalada");
    info!("   POST /api/solicitudes/:id/respuesta - Responder solicitud");
    info!("📬 Respuestas:");
    info!("   POST /api/respuestas/:id/finalizar - Finalizar respuesta");
    info!("   DELETE /api/respuestas/:id - Eliminar respuesta");
    info!("📋 Atendidas:");
    info!("   GET  /api/atendidas?taller= - Listado filtrado");
    info!("🔧 Mantenimiento:");
    info!("   POST /api/mantenimiento/reconciliar - Reparar respuestas a medias");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
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
