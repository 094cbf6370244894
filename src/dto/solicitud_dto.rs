use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::models::{NuevaSolicitud, RespuestaSolicitud};
use crate::utils::errors::{bad_request_error, AppResult};

// Body de POST /api/solicitudes
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearSolicitudRequest {
    #[serde(flatten)]
    pub solicitud: NuevaSolicitud,
    /// Foto sin subir; si llega se sube antes de crear la solicitud
    #[serde(default)]
    pub foto_base64: Option<String>,
}

// Body de POST /api/solicitudes/:id/respuesta
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponderSolicitudRequest {
    #[serde(flatten)]
    pub respuesta: RespuestaSolicitud,
    #[serde(default)]
    pub foto_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstadoQuery {
    pub estado: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AtendidasQuery {
    pub taller: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReconciliacionResponse {
    pub reparadas: usize,
}

pub fn decode_foto(encoded: &str) -> AppResult<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| bad_request_error("fotoBase64 no es base64 válido"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_foto() {
        assert_eq!(decode_foto("AQID").unwrap(), vec![1, 2, 3]);
        assert!(decode_foto("%%%").is_err());
    }

    #[test]
    fn test_payload_plano() {
        let json = serde_json::json!({
            "pieza": "filtro",
            "taller": "Acme",
            "fecha": "2024-01-01T00:00:00Z",
            "estadoInstalacion": true,
            "fotoBase64": "AQID"
        });
        let request: CrearSolicitudRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.solicitud.pieza, "filtro");
        assert!(request.solicitud.estado_instalacion);
        assert_eq!(request.foto_base64.as_deref(), Some("AQID"));
    }
}
