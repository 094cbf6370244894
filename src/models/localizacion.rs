use serde::{Deserialize, Serialize};
use validator::Validate;

/// Par de coordenadas GPS tal como lo entrega el proveedor de ubicación.
///
/// Los campos extra que traiga el proveedor (altitud, precisión...) se ignoran
/// al deserializar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct Localizacion {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Localizacion {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}
