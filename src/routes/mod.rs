pub mod atendidas_routes;
pub mod mantenimiento_routes;
pub mod respuesta_routes;
pub mod solicitud_routes;
