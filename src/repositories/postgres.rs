//! Backend PostgreSQL
//!
//! Tablas `solicitudes` y `solicitudes_respondidas` (ver
//! `database::connection::SCHEMA`). `localizacion` y `solicitud_original` se
//! guardan como JSONB con los mismos nombres de campo que los documentos
//! originales. La columna `orden` (BIGSERIAL) da el orden estable de listado.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use super::{new_id, RequestRepository, RespondTransaction, ResponseRepository};
use crate::models::{
    EstadoSolicitud, Estatus, Localizacion, NuevaRespuesta, NuevaSolicitud, RespuestaSolicitud,
    Solicitud, SolicitudRespondida,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

const SOLICITUD_COLUMNS: &str =
    "id, vin, pieza, taller, fecha, localizacion, foto, nombre_mecanico, estado_instalacion, estado";

const RESPUESTA_COLUMNS: &str = "id, mecanico, taller, fecha_envio, localizacion, foto, \
     solicitud_original, solicitud_original_id, estatus, borrado_pendiente";

#[derive(Debug, sqlx::FromRow)]
struct SolicitudRow {
    id: String,
    vin: Option<String>,
    pieza: String,
    taller: String,
    fecha: DateTime<Utc>,
    localizacion: Option<Json<Localizacion>>,
    foto: Option<String>,
    nombre_mecanico: Option<String>,
    estado_instalacion: bool,
    estado: String,
}

impl TryFrom<SolicitudRow> for Solicitud {
    type Error = AppError;

    fn try_from(row: SolicitudRow) -> Result<Self, Self::Error> {
        Ok(Solicitud {
            id: row.id,
            vin: row.vin,
            pieza: row.pieza,
            taller: row.taller,
            fecha: row.fecha,
            localizacion: row.localizacion.map(|j| j.0),
            foto: row.foto,
            nombre_mecanico: row.nombre_mecanico,
            estado_instalacion: row.estado_instalacion,
            estado: row
                .estado
                .parse()
                .map_err(|_| AppError::Storage(format!("Estado inválido en BD: {}", row.estado)))?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RespuestaRow {
    id: String,
    mecanico: String,
    taller: String,
    fecha_envio: DateTime<Utc>,
    localizacion: Json<Localizacion>,
    foto: String,
    solicitud_original: Json<Solicitud>,
    solicitud_original_id: String,
    estatus: String,
    borrado_pendiente: bool,
}

impl TryFrom<RespuestaRow> for SolicitudRespondida {
    type Error = AppError;

    fn try_from(row: RespuestaRow) -> Result<Self, Self::Error> {
        Ok(SolicitudRespondida {
            id: row.id,
            mecanico: row.mecanico,
            taller: row.taller,
            fecha_envio: row.fecha_envio,
            localizacion: row.localizacion.0,
            foto: row.foto,
            solicitud_original: row.solicitud_original.0,
            solicitud_original_id: row.solicitud_original_id,
            estatus: row
                .estatus
                .parse()
                .map_err(|_| {
                    AppError::Storage(format!("Estatus inválido en BD: {}", row.estatus))
                })?,
            borrado_pendiente: row.borrado_pendiente,
        })
    }
}

pub struct PgRequestRepository {
    pool: PgPool,
}

impl PgRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for PgRequestRepository {
    async fn create(&self, nueva: NuevaSolicitud) -> AppResult<Solicitud> {
        let solicitud = nueva.into_solicitud(new_id())?;

        sqlx::query(
            r#"
            INSERT INTO solicitudes (id, vin, pieza, taller, fecha, localizacion, foto, nombre_mecanico, estado_instalacion, estado)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&solicitud.id)
        .bind(&solicitud.vin)
        .bind(&solicitud.pieza)
        .bind(&solicitud.taller)
        .bind(solicitud.fecha)
        .bind(solicitud.localizacion.map(Json))
        .bind(&solicitud.foto)
        .bind(&solicitud.nombre_mecanico)
        .bind(solicitud.estado_instalacion)
        .bind(solicitud.estado.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Error creating solicitud: {}", e)))?;

        debug!("💾 Solicitud {} guardada en PostgreSQL", solicitud.id);
        Ok(solicitud)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Solicitud>> {
        let row = sqlx::query_as::<_, SolicitudRow>(&format!(
            "SELECT {} FROM solicitudes WHERE id = $1",
            SOLICITUD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Error finding solicitud: {}", e)))?;

        row.map(Solicitud::try_from).transpose()
    }

    async fn list_by_status(&self, estado: EstadoSolicitud) -> AppResult<Vec<Solicitud>> {
        let rows = sqlx::query_as::<_, SolicitudRow>(&format!(
            "SELECT {} FROM solicitudes WHERE estado = $1 ORDER BY orden",
            SOLICITUD_COLUMNS
        ))
        .bind(estado.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Error listing solicitudes: {}", e)))?;

        rows.into_iter().map(Solicitud::try_from).collect()
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM solicitudes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("Error deleting solicitud: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Solicitud", id));
        }
        Ok(())
    }
}

pub struct PgResponseRepository {
    pool: PgPool,
}

impl PgResponseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_respuesta<'e, E>(executor: E, record: &SolicitudRespondida) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO solicitudes_respondidas
            (id, mecanico, taller, fecha_envio, localizacion, foto, solicitud_original, solicitud_original_id, estatus, borrado_pendiente)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&record.id)
    .bind(&record.mecanico)
    .bind(&record.taller)
    .bind(record.fecha_envio)
    .bind(Json(record.localizacion))
    .bind(&record.foto)
    .bind(Json(&record.solicitud_original))
    .bind(&record.solicitud_original_id)
    .bind(record.estatus.as_str())
    .bind(record.borrado_pendiente)
    .execute(executor)
    .await
    .map_err(|e| AppError::Storage(format!("Error creating respuesta: {}", e)))?;

    Ok(())
}

#[async_trait]
impl ResponseRepository for PgResponseRepository {
    async fn create(&self, nueva: NuevaRespuesta) -> AppResult<SolicitudRespondida> {
        let record = nueva.into_record(new_id())?;
        insert_respuesta(&self.pool, &record).await?;
        debug!("💾 Respuesta {} guardada en PostgreSQL", record.id);
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<SolicitudRespondida>> {
        let row = sqlx::query_as::<_, RespuestaRow>(&format!(
            "SELECT {} FROM solicitudes_respondidas WHERE id = $1",
            RESPUESTA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Error finding respuesta: {}", e)))?;

        row.map(SolicitudRespondida::try_from).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<SolicitudRespondida>> {
        let rows = sqlx::query_as::<_, RespuestaRow>(&format!(
            "SELECT {} FROM solicitudes_respondidas ORDER BY orden",
            RESPUESTA_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Error listing respuestas: {}", e)))?;

        rows.into_iter().map(SolicitudRespondida::try_from).collect()
    }

    async fn update_status(&self, id: &str, estatus: Estatus) -> AppResult<SolicitudRespondida> {
        // El UPDATE condicionado al estatus de origen evita carreras entre dos finalizaciones
        let updated = if Estatus::Enviado.can_transition_to(estatus) {
            sqlx::query_as::<_, RespuestaRow>(&format!(
                "UPDATE solicitudes_respondidas SET estatus = $2 WHERE id = $1 AND estatus = $3 RETURNING {}",
                RESPUESTA_COLUMNS
            ))
            .bind(id)
            .bind(estatus.as_str())
            .bind(Estatus::Enviado.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("Error updating respuesta: {}", e)))?
        } else {
            None
        };

        if let Some(row) = updated {
            return row.try_into();
        }

        match self.find_by_id(id).await? {
            None => Err(not_found_error("Respuesta", id)),
            Some(actual) => Err(AppError::InvalidTransition(format!(
                "{} -> {} no está permitido para la respuesta '{}'",
                actual.estatus, estatus, id
            ))),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM solicitudes_respondidas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("Error deleting respuesta: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Respuesta", id));
        }
        Ok(())
    }

    async fn confirm_deletion(&self, id: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE solicitudes_respondidas SET borrado_pendiente = FALSE WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Storage(format!("Error clearing marker: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Respuesta", id));
        }
        Ok(())
    }

    async fn list_pending_deletion(&self) -> AppResult<Vec<SolicitudRespondida>> {
        let rows = sqlx::query_as::<_, RespuestaRow>(&format!(
            "SELECT {} FROM solicitudes_respondidas WHERE borrado_pendiente ORDER BY orden",
            RESPUESTA_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Error listing marked respuestas: {}", e)))?;

        rows.into_iter().map(SolicitudRespondida::try_from).collect()
    }
}

/// Respuesta transaccional: ambas tablas viven en la misma base.
pub struct PgRespondTransaction {
    pool: PgPool,
}

impl PgRespondTransaction {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_solicitud(
        tx: &mut Transaction<'_, Postgres>,
        solicitud_id: &str,
    ) -> AppResult<Solicitud> {
        let row = sqlx::query_as::<_, SolicitudRow>(&format!(
            "SELECT {} FROM solicitudes WHERE id = $1 FOR UPDATE",
            SOLICITUD_COLUMNS
        ))
        .bind(solicitud_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::Storage(format!("Error locking solicitud: {}", e)))?;

        row.ok_or_else(|| not_found_error("Solicitud", solicitud_id))?
            .try_into()
    }
}

#[async_trait]
impl RespondTransaction for PgRespondTransaction {
    async fn respond_atomically(
        &self,
        solicitud_id: &str,
        respuesta: RespuestaSolicitud,
    ) -> AppResult<SolicitudRespondida> {
        respuesta.validar()?;

        let mut tx = self.pool.begin().await?;
        let original = Self::lock_solicitud(&mut tx, solicitud_id).await?;

        if !original.is_pendiente() {
            return Err(AppError::InvalidState(format!(
                "La solicitud '{}' está {} y no puede responderse",
                solicitud_id, original.estado
            )));
        }

        let record = NuevaRespuesta::new(respuesta, original).into_record(new_id())?;
        insert_respuesta(&mut *tx, &record).await?;

        sqlx::query("DELETE FROM solicitudes WHERE id = $1")
            .bind(solicitud_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Storage(format!("Error deleting solicitud: {}", e)))?;

        tx.commit().await?;
        info!("✅ Solicitud {} respondida en transacción como {}", solicitud_id, record.id);
        Ok(record)
    }
}
