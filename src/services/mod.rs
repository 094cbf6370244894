//! Services module
//!
//! Este módulo contiene la lógica de negocio: el ciclo de vida de las
//! solicitudes, el listado de atendidas y los colaboradores externos
//! (adjuntos y ubicación).

pub mod attachment_store;
pub mod attended_listing_service;
pub mod geolocation;
pub mod lifecycle_service;

pub use attachment_store::{
    AttachmentFolder, AttachmentStore, HttpAttachmentStore, MemoryAttachmentStore,
};
pub use attended_listing_service::AttendedListingService;
pub use geolocation::{FixedGeoLocation, GeoLocationProvider};
pub use lifecycle_service::LifecycleService;
