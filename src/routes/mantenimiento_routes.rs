use axum::{extract::State, routing::post, Json, Router};

use crate::dto::ReconciliacionResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_mantenimiento_router() -> Router<AppState> {
    Router::new().route("/reconciliar", post(reconciliar))
}

async fn reconciliar(
    State(state): State<AppState>,
) -> Result<Json<ReconciliacionResponse>, AppError> {
    let reparadas = state.lifecycle.reconcile().await?;
    Ok(Json(ReconciliacionResponse { reparadas }))
}
