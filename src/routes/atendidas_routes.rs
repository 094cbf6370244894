use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::dto::AtendidasQuery;
use crate::models::VistaAtendidas;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_atendidas_router() -> Router<AppState> {
    Router::new().route("/", get(list_atendidas))
}

async fn list_atendidas(
    State(state): State<AppState>,
    Query(query): Query<AtendidasQuery>,
) -> Result<Json<VistaAtendidas>, AppError> {
    let vista = state.listing.list(query.taller.as_deref()).await?;
    Ok(Json(vista))
}
