//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos. Los nombres serializados
//! coinciden con los documentos ya guardados (`solicitudes` y
//! `solicitudes_respondidas`).

pub mod atendida;
pub mod localizacion;
pub mod respuesta;
pub mod solicitud;

pub use atendida::*;
pub use localizacion::Localizacion;
pub use respuesta::*;
pub use solicitud::*;
