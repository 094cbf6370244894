//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Todo el estado de negocio vive en los
//! repositorios; aquí sólo hay handles.

use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::config::environment::{EnvironmentConfig, StorageBackend};
use crate::repositories::{
    InMemoryRequestRepository, InMemoryResponseRepository, PgRequestRepository,
    PgRespondTransaction, PgResponseRepository, RequestRepository, ResponseRepository,
};
use crate::services::{
    AttachmentStore, AttendedListingService, FixedGeoLocation, HttpAttachmentStore,
    LifecycleService, MemoryAttachmentStore,
};
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub lifecycle: Arc<LifecycleService>,
    pub listing: Arc<AttendedListingService>,
    pub backend: StorageBackend,
}

impl AppState {
    /// Estado con repositorios en memoria
    pub fn in_memory(config: EnvironmentConfig) -> AppResult<Self> {
        let adjuntos = attachment_store(&config)?;
        let solicitudes: Arc<dyn RequestRepository> = Arc::new(InMemoryRequestRepository::new());
        let respuestas: Arc<dyn ResponseRepository> = Arc::new(InMemoryResponseRepository::new());

        let lifecycle = LifecycleService::new(solicitudes.clone(), respuestas.clone(), adjuntos);
        Ok(Self::assemble(config, lifecycle, solicitudes, respuestas, StorageBackend::Memory))
    }

    /// Estado sobre PostgreSQL; responder usa una sola transacción.
    pub fn postgres(pool: PgPool, config: EnvironmentConfig) -> AppResult<Self> {
        let adjuntos = attachment_store(&config)?;
        let solicitudes: Arc<dyn RequestRepository> =
            Arc::new(PgRequestRepository::new(pool.clone()));
        let respuestas: Arc<dyn ResponseRepository> =
            Arc::new(PgResponseRepository::new(pool.clone()));

        let lifecycle = LifecycleService::new(solicitudes.clone(), respuestas.clone(), adjuntos)
            .with_transaction(Arc::new(PgRespondTransaction::new(pool)));
        Ok(Self::assemble(config, lifecycle, solicitudes, respuestas, StorageBackend::Postgres))
    }

    fn assemble(
        config: EnvironmentConfig,
        lifecycle: LifecycleService,
        solicitudes: Arc<dyn RequestRepository>,
        respuestas: Arc<dyn ResponseRepository>,
        backend: StorageBackend,
    ) -> Self {
        let lifecycle = match config.taller_localizacion {
            Some(localizacion) => {
                info!(
                    "📍 Ubicación fija del taller: {}, {}",
                    localizacion.latitude, localizacion.longitude
                );
                lifecycle.with_geolocation(Arc::new(FixedGeoLocation::new(localizacion)))
            }
            None => lifecycle,
        };

        Self {
            config: Arc::new(config),
            lifecycle: Arc::new(lifecycle),
            listing: Arc::new(AttendedListingService::new(solicitudes, respuestas)),
            backend,
        }
    }
}

fn attachment_store(config: &EnvironmentConfig) -> AppResult<Arc<dyn AttachmentStore>> {
    match &config.attachment_base_url {
        Some(base_url) => {
            info!("📎 Adjuntos vía HTTP en {}", base_url);
            Ok(Arc::new(HttpAttachmentStore::new(
                base_url.clone(),
                config.attachment_token.clone(),
            )?))
        }
        None => {
            info!("📎 Adjuntos en memoria (ATTACHMENT_BASE_URL no definido)");
            Ok(Arc::new(MemoryAttachmentStore::new()))
        }
    }
}
