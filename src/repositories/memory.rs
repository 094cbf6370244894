//! Backend en memoria
//!
//! Guarda los registros en `Vec`s protegidos por `tokio::sync::RwLock`, lo que
//! conserva el orden de inserción para los listados. No es durable: todo se
//! pierde al reiniciar el proceso. Pensado para desarrollo local y tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{new_id, RequestRepository, ResponseRepository};
use crate::models::{
    EstadoSolicitud, Estatus, NuevaRespuesta, NuevaSolicitud, Solicitud, SolicitudRespondida,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Clone, Default)]
pub struct InMemoryRequestRepository {
    items: Arc<RwLock<Vec<Solicitud>>>,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn create(&self, nueva: NuevaSolicitud) -> AppResult<Solicitud> {
        let solicitud = nueva.into_solicitud(new_id())?;
        self.items.write().await.push(solicitud.clone());
        debug!("💾 Solicitud {} guardada en memoria", solicitud.id);
        Ok(solicitud)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Solicitud>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|s| s.id == id).cloned())
    }

    async fn list_by_status(&self, estado: EstadoSolicitud) -> AppResult<Vec<Solicitud>> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|s| s.estado == estado).cloned().collect())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut items = self.items.write().await;
        let pos = items
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found_error("Solicitud", id))?;
        items.remove(pos);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryResponseRepository {
    items: Arc<RwLock<Vec<SolicitudRespondida>>>,
}

impl InMemoryResponseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseRepository for InMemoryResponseRepository {
    async fn create(&self, nueva: NuevaRespuesta) -> AppResult<SolicitudRespondida> {
        let record = nueva.into_record(new_id())?;
        self.items.write().await.push(record.clone());
        debug!("💾 Respuesta {} guardada en memoria", record.id);
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<SolicitudRespondida>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|r| r.id == id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<SolicitudRespondida>> {
        Ok(self.items.read().await.clone())
    }

    async fn update_status(&self, id: &str, estatus: Estatus) -> AppResult<SolicitudRespondida> {
        let mut items = self.items.write().await;
        let record = items
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found_error("Respuesta", id))?;

        if !record.estatus.can_transition_to(estatus) {
            return Err(AppError::InvalidTransition(format!(
                "{} -> {} no está permitido para la respuesta '{}'",
                record.estatus, estatus, id
            )));
        }

        record.estatus = estatus;
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut items = self.items.write().await;
        let pos = items
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found_error("Respuesta", id))?;
        items.remove(pos);
        Ok(())
    }

    async fn confirm_deletion(&self, id: &str) -> AppResult<()> {
        let mut items = self.items.write().await;
        let record = items
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found_error("Respuesta", id))?;
        record.borrado_pendiente = false;
        Ok(())
    }

    async fn list_pending_deletion(&self) -> AppResult<Vec<SolicitudRespondida>> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|r| r.borrado_pendiente).cloned().collect())
    }
}
