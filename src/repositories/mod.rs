//! Repositorios
//!
//! Contratos de persistencia para solicitudes y respuestas. Hay dos backends:
//! `memory` (desarrollo y tests) y `postgres` (durable).

use async_trait::async_trait;

use crate::models::{
    EstadoSolicitud, Estatus, NuevaRespuesta, NuevaSolicitud, Solicitud, SolicitudRespondida,
};
use crate::utils::errors::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryRequestRepository, InMemoryResponseRepository};
pub use postgres::{PgRequestRepository, PgResponseRepository, PgRespondTransaction};

/// Persistencia de `Solicitud` (colección `solicitudes`)
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Valida, asigna id y guarda.
    async fn create(&self, nueva: NuevaSolicitud) -> AppResult<Solicitud>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Solicitud>>;
    /// Orden estable entre llamadas (orden de inserción).
    async fn list_by_status(&self, estado: EstadoSolicitud) -> AppResult<Vec<Solicitud>>;
    /// Falla con `NotFound` si no existe; borrar dos veces es un error.
    async fn delete(&self, id: &str) -> AppResult<()>;
}

/// Persistencia de `SolicitudRespondida` (colección `solicitudes_respondidas`)
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Valida, asigna id y guarda con estatus `enviado`.
    async fn create(&self, nueva: NuevaRespuesta) -> AppResult<SolicitudRespondida>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<SolicitudRespondida>>;
    async fn list_all(&self) -> AppResult<Vec<SolicitudRespondida>>;
    /// Sólo `enviado -> finalizado`; cualquier otra cosa es `InvalidTransition`.
    async fn update_status(&self, id: &str, estatus: Estatus) -> AppResult<SolicitudRespondida>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    /// Limpia la marca `borradoPendiente` una vez borrado el original.
    async fn confirm_deletion(&self, id: &str) -> AppResult<()>;
    async fn list_pending_deletion(&self) -> AppResult<Vec<SolicitudRespondida>>;
}

/// Backends capaces de responder una solicitud en una sola transacción.
#[async_trait]
pub trait RespondTransaction: Send + Sync {
    /// Verifica que la solicitud siga `Pendiente`, crea la respuesta y borra el
    /// original de forma atómica.
    async fn respond_atomically(
        &self,
        solicitud_id: &str,
        respuesta: crate::models::RespuestaSolicitud,
    ) -> AppResult<SolicitudRespondida>;
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
