//! Ciclo de vida de las solicitudes
//!
//! ```text
//! [creada, estadoInstalacion=false] -> Pendiente
//! [creada, estadoInstalacion=true]  -> Instalada (terminal)
//! Pendiente --responder--> [solicitud borrada] + respuesta{enviado}
//! respuesta.enviado --finalizar--> respuesta.finalizado
//! respuesta / Instalada --eliminar--> [borrada]
//! ```
//!
//! Responder toca dos almacenes. Si hay un backend transaccional configurado
//! se usa; si no, la respuesta se escribe con `borradoPendiente = true`, se
//! borra el original y se limpia la marca. Un fallo intermedio deja ambos
//! registros visibles y marcados hasta que `reconcile` los repare.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::attachment_store::{AttachmentFolder, AttachmentStore};
use super::geolocation::GeoLocationProvider;
use crate::models::{
    EstadoSolicitud, Estatus, Localizacion, NuevaRespuesta, NuevaSolicitud, OrigenAtendida,
    RespuestaSolicitud, Solicitud, SolicitudRespondida,
};
use crate::repositories::{RequestRepository, RespondTransaction, ResponseRepository};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct LifecycleService {
    solicitudes: Arc<dyn RequestRepository>,
    respuestas: Arc<dyn ResponseRepository>,
    adjuntos: Arc<dyn AttachmentStore>,
    ubicacion: Option<Arc<dyn GeoLocationProvider>>,
    transaccion: Option<Arc<dyn RespondTransaction>>,
}

impl LifecycleService {
    pub fn new(
        solicitudes: Arc<dyn RequestRepository>,
        respuestas: Arc<dyn ResponseRepository>,
        adjuntos: Arc<dyn AttachmentStore>,
    ) -> Self {
        Self {
            solicitudes,
            respuestas,
            adjuntos,
            ubicacion: None,
            transaccion: None,
        }
    }

    pub fn with_geolocation(mut self, provider: Arc<dyn GeoLocationProvider>) -> Self {
        self.ubicacion = Some(provider);
        self
    }

    pub fn with_transaction(mut self, transaccion: Arc<dyn RespondTransaction>) -> Self {
        self.transaccion = Some(transaccion);
        self
    }

    /// Crea una solicitud. La foto es opcional; una referencia vacía es válida.
    pub async fn submit_request(&self, mut nueva: NuevaSolicitud) -> AppResult<Solicitud> {
        if nueva.localizacion.is_none() {
            nueva.localizacion = self.locate().await;
        }
        nueva.validar()?;

        let solicitud = self.solicitudes.create(nueva).await?;
        info!(
            "📝 Solicitud {} creada ({}) para taller '{}'",
            solicitud.id, solicitud.estado, solicitud.taller
        );
        Ok(solicitud)
    }

    /// Igual que `submit_request`, subiendo antes la foto. Si la subida falla
    /// se conserva la referencia que ya traía la solicitud, si había una.
    pub async fn submit_request_with_photo(
        &self,
        mut nueva: NuevaSolicitud,
        foto: Vec<u8>,
    ) -> AppResult<Solicitud> {
        nueva.validar()?;

        nueva.foto = match self.adjuntos.upload(AttachmentFolder::Images, foto).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!(
                    "⚠️ No se pudo subir la foto, se crea la solicitud sin la nueva evidencia: {}",
                    e
                );
                nueva.foto.take()
            }
        };

        self.submit_request(nueva).await
    }

    pub async fn get_request(&self, id: &str) -> AppResult<Solicitud> {
        self.solicitudes
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Solicitud", id))
    }

    pub async fn list_by_status(&self, estado: EstadoSolicitud) -> AppResult<Vec<Solicitud>> {
        self.solicitudes.list_by_status(estado).await
    }

    /// Responde una solicitud `Pendiente`: crea la respuesta con una copia del
    /// original y borra el original.
    pub async fn respond_to_request(
        &self,
        solicitud_id: &str,
        mut respuesta: RespuestaSolicitud,
    ) -> AppResult<SolicitudRespondida> {
        let original = self.get_request(solicitud_id).await?;
        if !original.is_pendiente() {
            return Err(AppError::InvalidState(format!(
                "La solicitud '{}' está {} y no puede responderse",
                solicitud_id, original.estado
            )));
        }

        if respuesta.localizacion.is_none() {
            respuesta.localizacion = self.locate().await;
        }
        respuesta.validar()?;

        if let Some(transaccion) = &self.transaccion {
            return transaccion.respond_atomically(solicitud_id, respuesta).await;
        }

        let record = self
            .respuestas
            .create(NuevaRespuesta::new(respuesta, original).marcar_borrado_pendiente())
            .await?;

        if let Err(e) = self.solicitudes.delete(solicitud_id).await {
            error!(
                "❌ Respuesta {} creada pero la solicitud {} no se pudo borrar: {}",
                record.id, solicitud_id, e
            );
            return Err(e);
        }

        if let Err(e) = self.respuestas.confirm_deletion(&record.id).await {
            warn!("⚠️ Marca de borrado pendiente sin limpiar en {}: {}", record.id, e);
            return Ok(record);
        }

        info!("✅ Solicitud {} respondida como {}", solicitud_id, record.id);
        Ok(SolicitudRespondida {
            borrado_pendiente: false,
            ..record
        })
    }

    /// Sube la evidencia y responde. La evidencia es obligatoria: si la subida
    /// falla no se escribe nada.
    pub async fn respond_with_photo(
        &self,
        solicitud_id: &str,
        mut respuesta: RespuestaSolicitud,
        foto: Vec<u8>,
    ) -> AppResult<SolicitudRespondida> {
        let reference = self
            .adjuntos
            .upload(AttachmentFolder::Respuestas, foto)
            .await?;
        respuesta.foto = Some(reference);
        self.respond_to_request(solicitud_id, respuesta).await
    }

    pub async fn finalize_response(&self, respuesta_id: &str) -> AppResult<SolicitudRespondida> {
        let record = self
            .respuestas
            .update_status(respuesta_id, Estatus::Finalizado)
            .await?;
        info!("🏁 Respuesta {} finalizada", respuesta_id);
        Ok(record)
    }

    /// Limpieza final desde la vista de atendidas.
    ///
    /// Las respuestas se borran en cualquier estatus. Las solicitudes sólo si
    /// están `Instalada`: una pendiente sale únicamente respondiéndola.
    pub async fn purge(&self, origen: OrigenAtendida, id: &str) -> AppResult<()> {
        match origen {
            OrigenAtendida::Respuesta => self.respuestas.delete(id).await?,
            OrigenAtendida::Instalacion => {
                let solicitud = self.get_request(id).await?;
                if solicitud.is_pendiente() {
                    return Err(AppError::InvalidState(format!(
                        "La solicitud '{}' está Pendiente; debe responderse, no eliminarse",
                        id
                    )));
                }
                self.solicitudes.delete(id).await?;
            }
        }
        info!("🗑️ Registro {} ({:?}) eliminado", id, origen);
        Ok(())
    }

    /// Repara respuestas que quedaron con `borradoPendiente`: borra el original
    /// si aún existe y limpia la marca. Devuelve cuántas se repararon.
    pub async fn reconcile(&self) -> AppResult<usize> {
        let marcadas = self.respuestas.list_pending_deletion().await?;
        let mut reparadas = 0;

        for record in marcadas {
            match self.solicitudes.delete(&record.solicitud_original_id).await {
                Ok(()) => info!(
                    "🔧 Solicitud {} borrada (respondida como {})",
                    record.solicitud_original_id, record.id
                ),
                Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
            self.respuestas.confirm_deletion(&record.id).await?;
            reparadas += 1;
        }

        if reparadas > 0 {
            info!("🔧 {} respuestas reconciliadas", reparadas);
        }
        Ok(reparadas)
    }

    async fn locate(&self) -> Option<Localizacion> {
        let provider = self.ubicacion.as_ref()?;
        match provider.current().await {
            Ok(localizacion) => Some(localizacion),
            Err(e) => {
                warn!("⚠️ Ubicación no disponible: {}", e);
                None
            }
        }
    }
}
