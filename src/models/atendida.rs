//! Vista unificada de solicitudes atendidas
//!
//! Las solicitudes instaladas directamente y las respuestas comparten aquí un
//! único vocabulario de estatus, de modo que ordenar y decidir acciones sea un
//! `match` exhaustivo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::localizacion::Localizacion;
use super::respuesta::{Estatus, SolicitudRespondida};
use super::solicitud::{EstadoSolicitud, Solicitud};

/// Entrada sintética del filtro de talleres
pub const FILTRO_TODOS: &str = "All";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EstatusAtendida {
    #[serde(rename = "Pendiente")]
    Pendiente,
    #[serde(rename = "Instalada")]
    InstaladaDirecta,
    #[serde(rename = "enviado")]
    Enviado,
    #[serde(rename = "finalizado")]
    Finalizado,
}

impl EstatusAtendida {
    pub fn acciones(&self) -> Vec<AccionAtendida> {
        match self {
            EstatusAtendida::Enviado => vec![AccionAtendida::Finalizar],
            EstatusAtendida::Finalizado | EstatusAtendida::InstaladaDirecta => {
                vec![AccionAtendida::Eliminar]
            }
            EstatusAtendida::Pendiente => Vec::new(),
        }
    }

    pub fn is_enviado(&self) -> bool {
        matches!(self, EstatusAtendida::Enviado)
    }
}

impl From<Estatus> for EstatusAtendida {
    fn from(estatus: Estatus) -> Self {
        match estatus {
            Estatus::Enviado => EstatusAtendida::Enviado,
            Estatus::Finalizado => EstatusAtendida::Finalizado,
        }
    }
}

impl From<EstadoSolicitud> for EstatusAtendida {
    fn from(estado: EstadoSolicitud) -> Self {
        match estado {
            EstadoSolicitud::Pendiente => EstatusAtendida::Pendiente,
            EstadoSolicitud::Instalada => EstatusAtendida::InstaladaDirecta,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccionAtendida {
    Finalizar,
    Eliminar,
}

/// De qué almacén proviene un elemento atendido
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrigenAtendida {
    Respuesta,
    Instalacion,
}

/// Elemento de la lista de atendidas
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolicitudAtendida {
    pub id: String,
    pub origen: OrigenAtendida,
    /// Valor crudo, tal como se guardó
    pub taller: String,
    pub estatus: EstatusAtendida,
    pub acciones: Vec<AccionAtendida>,
    pub pieza: String,
    pub vin: Option<String>,
    pub mecanico: Option<String>,
    pub fecha: DateTime<Utc>,
    pub foto: Option<String>,
    pub localizacion: Option<Localizacion>,
    pub solicitud_original: Option<Solicitud>,
}

impl From<SolicitudRespondida> for SolicitudAtendida {
    fn from(r: SolicitudRespondida) -> Self {
        let estatus = EstatusAtendida::from(r.estatus);
        Self {
            id: r.id,
            origen: OrigenAtendida::Respuesta,
            taller: r.taller,
            estatus,
            acciones: estatus.acciones(),
            pieza: r.solicitud_original.pieza.clone(),
            vin: r.solicitud_original.vin.clone(),
            mecanico: Some(r.mecanico),
            fecha: r.fecha_envio,
            foto: Some(r.foto),
            localizacion: Some(r.localizacion),
            solicitud_original: Some(r.solicitud_original),
        }
    }
}

impl From<Solicitud> for SolicitudAtendida {
    fn from(s: Solicitud) -> Self {
        let estatus = EstatusAtendida::from(s.estado);
        Self {
            id: s.id,
            origen: OrigenAtendida::Instalacion,
            taller: s.taller,
            estatus,
            acciones: estatus.acciones(),
            pieza: s.pieza,
            vin: s.vin,
            mecanico: s.nombre_mecanico,
            fecha: s.fecha,
            foto: s.foto,
            localizacion: s.localizacion,
            solicitud_original: None,
        }
    }
}

/// Resultado del listado: dominio del filtro + elementos filtrados y ordenados
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VistaAtendidas {
    pub talleres: Vec<String>,
    pub taller_seleccionado: String,
    pub solicitudes: Vec<SolicitudAtendida>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acciones_por_estatus() {
        assert_eq!(EstatusAtendida::Enviado.acciones(), vec![AccionAtendida::Finalizar]);
        assert_eq!(EstatusAtendida::Finalizado.acciones(), vec![AccionAtendida::Eliminar]);
        assert_eq!(
            EstatusAtendida::InstaladaDirecta.acciones(),
            vec![AccionAtendida::Eliminar]
        );
        assert!(EstatusAtendida::Pendiente.acciones().is_empty());
    }

    #[test]
    fn test_vocabulario_serializado() {
        let json = serde_json::to_value([
            EstatusAtendida::InstaladaDirecta,
            EstatusAtendida::Enviado,
            EstatusAtendida::Finalizado,
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!(["Instalada", "enviado", "finalizado"]));
    }
}
