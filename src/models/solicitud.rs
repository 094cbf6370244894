//! Modelo de Solicitud
//!
//! Una solicitud de refacción levantada por un taller contra un vehículo.
//! Los nombres de campo serializados coinciden con los documentos ya guardados
//! en la colección `solicitudes`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use super::localizacion::Localizacion;
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::validation::{is_blank, validate_not_empty};

/// Estado de la solicitud - derivado de `estadoInstalacion` al crearla
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EstadoSolicitud {
    Pendiente,
    Instalada,
}

impl EstadoSolicitud {
    pub fn from_instalacion(estado_instalacion: bool) -> Self {
        if estado_instalacion {
            EstadoSolicitud::Instalada
        } else {
            EstadoSolicitud::Pendiente
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoSolicitud::Pendiente => "Pendiente",
            EstadoSolicitud::Instalada => "Instalada",
        }
    }
}

impl fmt::Display for EstadoSolicitud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoSolicitud {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pendiente" => Ok(EstadoSolicitud::Pendiente),
            "Instalada" => Ok(EstadoSolicitud::Instalada),
            other => Err(AppError::BadRequest(format!("Estado desconocido: {}", other))),
        }
    }
}

/// Solicitud persistida
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Solicitud {
    pub id: String,
    #[serde(default)]
    pub vin: Option<String>,
    pub pieza: String,
    pub taller: String,
    pub fecha: DateTime<Utc>,
    #[serde(default)]
    pub localizacion: Option<Localizacion>,
    #[serde(default)]
    pub foto: Option<String>,
    #[serde(default)]
    pub nombre_mecanico: Option<String>,
    pub estado_instalacion: bool,
    pub estado: EstadoSolicitud,
}

impl Solicitud {
    pub fn is_pendiente(&self) -> bool {
        self.estado == EstadoSolicitud::Pendiente
    }
}

/// Datos para crear una solicitud
///
/// Valor inmutable entregado por la capa de captura; `pieza` y `taller` llevan
/// `serde(default)` para que su ausencia llegue como error de validación y no
/// como error de deserialización.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NuevaSolicitud {
    #[serde(default)]
    pub vin: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_not_empty")]
    pub pieza: String,

    #[serde(default)]
    #[validate(custom = "validate_not_empty")]
    pub taller: String,

    #[serde(default)]
    #[validate(required)]
    pub fecha: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate]
    pub localizacion: Option<Localizacion>,

    #[serde(default)]
    pub foto: Option<String>,

    #[serde(default)]
    pub nombre_mecanico: Option<String>,

    #[serde(default)]
    pub estado_instalacion: bool,
}

impl NuevaSolicitud {
    /// Valida los campos obligatorios, incluyendo la regla condicional:
    /// VIN y mecánico sólo se exigen si la pieza no llega ya instalada.
    pub fn validar(&self) -> AppResult<()> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if !self.estado_instalacion {
            if is_blank(self.vin.as_deref()) {
                errors.add("vin", ValidationError::new("required_unless_installed"));
            }
            if is_blank(self.nombre_mecanico.as_deref()) {
                errors.add(
                    "nombreMecanico",
                    ValidationError::new("required_unless_installed"),
                );
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }

    /// Construye el registro persistible con el id asignado por el repositorio.
    pub fn into_solicitud(self, id: String) -> AppResult<Solicitud> {
        self.validar()?;
        let fecha = self
            .fecha
            .ok_or_else(|| validation_error("fecha", "La fecha es obligatoria"))?;

        Ok(Solicitud {
            id,
            vin: non_blank(self.vin),
            pieza: self.pieza,
            taller: self.taller,
            fecha,
            localizacion: self.localizacion,
            foto: non_blank(self.foto),
            nombre_mecanico: non_blank(self.nombre_mecanico),
            estado_instalacion: self.estado_instalacion,
            estado: EstadoSolicitud::from_instalacion(self.estado_instalacion),
        })
    }
}

// Los documentos antiguos guardan "" para campos ausentes.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
