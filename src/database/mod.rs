//! Módulo de base de datos
//!
//! Maneja la conexión y el esquema en PostgreSQL

pub mod connection;

pub use connection::{mask_database_url, run_migrations, DatabaseConnection};
