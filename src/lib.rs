//! Talleres Unidos - backend de solicitudes de piezas entre talleres

pub mod app;
pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use app::build_router;
pub use state::AppState;
