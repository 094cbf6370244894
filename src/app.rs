//! Construcción del router HTTP

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_middleware;
use crate::routes::{
    atendidas_routes::create_atendidas_router, mantenimiento_routes::create_mantenimiento_router,
    respuesta_routes::create_respuesta_router, solicitud_routes::create_solicitud_router,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_middleware(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/solicitudes", create_solicitud_router())
        .nest("/api/respuestas", create_respuesta_router())
        .nest("/api/atendidas", create_atendidas_router())
        .nest("/api/mantenimiento", create_mantenimiento_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "backend": state.backend.as_str(),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
