//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! `.env` se carga en `main` con `dotenvy` antes de llamar a `from_env`.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::models::Localizacion;

/// Backend de persistencia para solicitudes y respuestas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "memoria" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("STORAGE_BACKEND desconocido: {}", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Base de subida de adjuntos; sin ella se usa el almacén en memoria
    pub attachment_base_url: Option<String>,
    pub attachment_token: Option<String>,
    /// Vacío = CORS permisivo
    pub cors_origins: Vec<String>,
    /// Ubicación fija del taller para completar registros sin GPS
    pub taller_localizacion: Option<Localizacion>,
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la configuración a partir de cualquier fuente clave/valor.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL");
        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None if database_url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        };

        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("STORAGE_BACKEND=postgres requiere DATABASE_URL"));
        }

        Ok(Self {
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: var("PORT")
                .map(|p| p.parse().context("PORT must be a valid number"))
                .transpose()?
                .unwrap_or(3000),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            storage_backend,
            database_url,
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .map(|n| n.parse().context("DATABASE_MAX_CONNECTIONS must be a valid number"))
                .transpose()?
                .unwrap_or(5),
            attachment_base_url: var("ATTACHMENT_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            attachment_token: var("ATTACHMENT_TOKEN"),
            cors_origins: var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            taller_localizacion: taller_localizacion(
                var("TALLER_LATITUDE"),
                var("TALLER_LONGITUDE"),
            )?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `TALLER_LATITUDE` y `TALLER_LONGITUDE` van juntas o no van.
fn taller_localizacion(
    latitude: Option<String>,
    longitude: Option<String>,
) -> Result<Option<Localizacion>> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            let localizacion = Localizacion::new(
                lat.trim().parse().context("TALLER_LATITUDE must be a valid number")?,
                lng.trim().parse().context("TALLER_LONGITUDE must be a valid number")?,
            );
            localizacion
                .validate()
                .map_err(|e| anyhow!("Ubicación del taller fuera de rango: {}", e))?;
            Ok(Some(localizacion))
        }
        _ => Err(anyhow!("TALLER_LATITUDE y TALLER_LONGITUDE deben definirse juntas")),
    }
}
