//! Proveedor de ubicación
//!
//! En el servidor no hay GPS; el proveedor sólo se configura cuando el
//! despliegue conoce la ubicación fija del taller.

use async_trait::async_trait;

use crate::models::Localizacion;
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait GeoLocationProvider: Send + Sync {
    async fn current(&self) -> AppResult<Localizacion>;
}

/// Ubicación fija (o ausente, en cuyo caso siempre falla)
#[derive(Debug, Clone, Default)]
pub struct FixedGeoLocation {
    localizacion: Option<Localizacion>,
}

impl FixedGeoLocation {
    pub fn new(localizacion: Localizacion) -> Self {
        Self {
            localizacion: Some(localizacion),
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GeoLocationProvider for FixedGeoLocation {
    async fn current(&self) -> AppResult<Localizacion> {
        self.localizacion
            .ok_or_else(|| AppError::ExternalApi("No se pudo obtener la ubicación".to_string()))
    }
}
