//! DTOs de la API HTTP

pub mod api_response;
pub mod solicitud_dto;

pub use api_response::ApiResponse;
pub use solicitud_dto::*;
