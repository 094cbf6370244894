//! Modelo de SolicitudRespondida
//!
//! Registro creado al responder una solicitud pendiente. Guarda una copia
//! inmutable de la solicitud original para poder mostrarla aunque el original
//! ya no exista.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use super::localizacion::Localizacion;
use super::solicitud::Solicitud;
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::validation::{is_blank, validate_not_empty};

/// Estatus de una respuesta - mapea a los valores `enviado`/`finalizado`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Estatus {
    Enviado,
    Finalizado,
}

impl Estatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Estatus::Enviado => "enviado",
            Estatus::Finalizado => "finalizado",
        }
    }

    /// Única transición permitida: `enviado -> finalizado`
    pub fn can_transition_to(&self, destino: Estatus) -> bool {
        matches!((self, destino), (Estatus::Enviado, Estatus::Finalizado))
    }
}

impl fmt::Display for Estatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Estatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enviado" => Ok(Estatus::Enviado),
            "finalizado" => Ok(Estatus::Finalizado),
            other => Err(AppError::BadRequest(format!("Estatus desconocido: {}", other))),
        }
    }
}

/// Respuesta persistida en `solicitudes_respondidas`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolicitudRespondida {
    pub id: String,
    pub mecanico: String,
    pub taller: String,
    pub fecha_envio: DateTime<Utc>,
    pub localizacion: Localizacion,
    pub foto: String,
    pub solicitud_original: Solicitud,
    pub solicitud_original_id: String,
    pub estatus: Estatus,
    /// Marca de compensación: la solicitud original aún no se ha borrado.
    #[serde(default)]
    pub borrado_pendiente: bool,
}

/// Respuesta del taller a una solicitud pendiente
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RespuestaSolicitud {
    #[serde(default)]
    #[validate(custom = "validate_not_empty")]
    pub mecanico: String,

    #[serde(default)]
    #[validate(custom = "validate_not_empty")]
    pub taller: String,

    /// Si no llega se usa la hora actual
    #[serde(default)]
    pub fecha_envio: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate]
    pub localizacion: Option<Localizacion>,

    #[serde(default)]
    pub foto: Option<String>,
}

impl RespuestaSolicitud {
    /// A diferencia de una solicitud, la respuesta exige ubicación y evidencia.
    pub fn validar(&self) -> AppResult<()> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if self.localizacion.is_none() {
            errors.add("localizacion", ValidationError::new("required"));
        }
        if is_blank(self.foto.as_deref()) {
            errors.add("foto", ValidationError::new("required"));
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

/// Registro listo para `ResponseRepository::create`
#[derive(Debug, Clone)]
pub struct NuevaRespuesta {
    pub respuesta: RespuestaSolicitud,
    /// Copia de la solicitud respondida
    pub solicitud_original: Solicitud,
    pub borrado_pendiente: bool,
}

impl NuevaRespuesta {
    pub fn new(respuesta: RespuestaSolicitud, solicitud_original: Solicitud) -> Self {
        Self {
            respuesta,
            solicitud_original,
            borrado_pendiente: false,
        }
    }

    pub fn marcar_borrado_pendiente(mut self) -> Self {
        self.borrado_pendiente = true;
        self
    }

    pub fn validar(&self) -> AppResult<()> {
        self.respuesta.validar()
    }

    /// Construye el registro persistido; siempre nace en `enviado`.
    pub fn into_record(self, id: String) -> AppResult<SolicitudRespondida> {
        self.validar()?;
        let RespuestaSolicitud {
            mecanico,
            taller,
            fecha_envio,
            localizacion,
            foto,
        } = self.respuesta;

        let localizacion = localizacion
            .ok_or_else(|| validation_error("localizacion", "La ubicación es obligatoria"))?;
        let foto = foto.ok_or_else(|| validation_error("foto", "La evidencia es obligatoria"))?;

        Ok(SolicitudRespondida {
            id,
            mecanico,
            taller,
            fecha_envio: fecha_envio.unwrap_or_else(Utc::now),
            localizacion,
            foto,
            solicitud_original_id: self.solicitud_original.id.clone(),
            solicitud_original: self.solicitud_original,
            estatus: Estatus::Enviado,
            borrado_pendiente: self.borrado_pendiente,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::solicitud::tests::nueva_pendiente;

    pub(crate) fn respuesta_completa() -> RespuestaSolicitud {
        RespuestaSolicitud {
            mecanico: "Lee".to_string(),
            taller: "North Shop".to_string(),
            fecha_envio: None,
            localizacion: Some(Localizacion::new(1.0, 1.0)),
            foto: Some("ref1".to_string()),
        }
    }

    #[test]
    fn test_transiciones_de_estatus() {
        assert!(Estatus::Enviado.can_transition_to(Estatus::Finalizado));
        assert!(!Estatus::Finalizado.can_transition_to(Estatus::Finalizado));
        assert!(!Estatus::Finalizado.can_transition_to(Estatus::Enviado));
        assert!(!Estatus::Enviado.can_transition_to(Estatus::Enviado));
    }

    #[test]
    fn test_respuesta_exige_ubicacion_y_foto() {
        let mut respuesta = respuesta_completa();
        respuesta.localizacion = None;
        respuesta.foto = Some(String::new());
        match respuesta.validar().unwrap_err() {
            AppError::Validation(errors) => {
                let fields = errors.errors();
                assert!(fields.contains_key("localizacion"));
                assert!(fields.contains_key("foto"));
                assert_eq!(fields.len(), 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_registro_nace_enviado_con_copia() {
        let original = nueva_pendiente().into_solicitud("s1".into()).unwrap();
        let record = NuevaRespuesta::new(respuesta_completa(), original.clone())
            .into_record("r1".into())
            .unwrap();
        assert_eq!(record.estatus, Estatus::Enviado);
        assert_eq!(record.solicitud_original_id, "s1");
        assert_eq!(record.solicitud_original, original);
        assert!(!record.borrado_pendiente);
    }

    #[test]
    fn test_documento_sin_marca_se_lee() {
        let original = nueva_pendiente().into_solicitud("s1".into()).unwrap();
        let record = NuevaRespuesta::new(respuesta_completa(), original)
            .into_record("r1".into())
            .unwrap();
        let mut json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["estatus"], "enviado");
        assert_eq!(json["solicitudOriginal"]["pieza"], "brake pad");
        json.as_object_mut().unwrap().remove("borradoPendiente");
        let leido: SolicitudRespondida = serde_json::from_value(json).unwrap();
        assert!(!leido.borrado_pendiente);
    }
}
