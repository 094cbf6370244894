use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::dto::{
    decode_foto, ApiResponse, CrearSolicitudRequest, EstadoQuery, ResponderSolicitudRequest,
};
use crate::models::{EstadoSolicitud, OrigenAtendida, Solicitud, SolicitudRespondida};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_solicitud_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_solicitud))
        .route("/", get(list_solicitudes))
        .route("/:id", get(get_solicitud).delete(delete_solicitud))
        .route("/:id/respuesta", post(responder_solicitud))
}

async fn create_solicitud(
    State(state): State<AppState>,
    Json(request): Json<CrearSolicitudRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Solicitud>>), AppError> {
    let solicitud = match request.foto_base64.as_deref().filter(|f| !f.trim().is_empty()) {
        Some(encoded) => {
            let foto = decode_foto(encoded)?;
            state
                .lifecycle
                .submit_request_with_photo(request.solicitud, foto)
                .await?
        }
        None => state.lifecycle.submit_request(request.solicitud).await?,
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            solicitud,
            "Solicitud creada exitosamente".to_string(),
        )),
    ))
}

/// `?estado=Pendiente|Instalada`, por defecto `Pendiente`
async fn list_solicitudes(
    State(state): State<AppState>,
    Query(query): Query<EstadoQuery>,
) -> Result<Json<Vec<Solicitud>>, AppError> {
    let estado = match query.estado.as_deref() {
        Some(value) => value.parse::<EstadoSolicitud>()?,
        None => EstadoSolicitud::Pendiente,
    };
    let solicitudes = state.lifecycle.list_by_status(estado).await?;
    Ok(Json(solicitudes))
}

async fn get_solicitud(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Solicitud>, AppError> {
    let solicitud = state.lifecycle.get_request(&id).await?;
    Ok(Json(solicitud))
}

// Sólo solicitudes instaladas; las pendientes se responden
async fn delete_solicitud(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.lifecycle.purge(OrigenAtendida::Instalacion, &id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Solicitud eliminada exitosamente"
    })))
}

async fn responder_solicitud(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ResponderSolicitudRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SolicitudRespondida>>), AppError> {
    let respondida = match request.foto_base64.as_deref().filter(|f| !f.trim().is_empty()) {
        Some(encoded) => {
            let foto = decode_foto(encoded)?;
            state
                .lifecycle
                .respond_with_photo(&id, request.respuesta, foto)
                .await?
        }
        None => state.lifecycle.respond_to_request(&id, request.respuesta).await?,
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            respondida,
            "Solicitud respondida exitosamente".to_string(),
        )),
    ))
}
