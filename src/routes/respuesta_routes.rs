use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Json, Router,
};

use crate::dto::ApiResponse;
use crate::models::{OrigenAtendida, SolicitudRespondida};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_respuesta_router() -> Router<AppState> {
    Router::new()
        .route("/:id/finalizar", post(finalizar_respuesta))
        .route("/:id", delete(delete_respuesta))
}

async fn finalizar_respuesta(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SolicitudRespondida>>, AppError> {
    let respuesta = state.lifecycle.finalize_response(&id).await?;
    Ok(Json(ApiResponse::success(respuesta)))
}

async fn delete_respuesta(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.lifecycle.purge(OrigenAtendida::Respuesta, &id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Respuesta eliminada exitosamente"
    })))
}
