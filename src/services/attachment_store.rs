//! Almacén de adjuntos (fotos de evidencia)
//!
//! El motor nunca inspecciona los bytes: sólo los entrega al almacén y guarda
//! la referencia que éste devuelve.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::utils::errors::{AppError, AppResult};

/// Carpeta destino dentro del almacén
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentFolder {
    /// Fotos tomadas al crear una solicitud
    Images,
    /// Evidencia adjunta a una respuesta
    Respuestas,
}

impl AttachmentFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentFolder::Images => "images",
            AttachmentFolder::Respuestas => "respuestas",
        }
    }
}

#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Sube los bytes y devuelve una referencia durable (URL/ID).
    async fn upload(&self, folder: AttachmentFolder, bytes: Vec<u8>) -> AppResult<String>;
}

/// Sube adjuntos por HTTP PUT a `{base_url}/{carpeta}/{millis}-{uuid}.jpg`
pub struct HttpAttachmentStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAttachmentStore {
    pub fn new(base_url: String, token: Option<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn object_url(&self, folder: AttachmentFolder) -> String {
        // Dos subidas en el mismo milisegundo no deben pisarse
        format!(
            "{}/{}/{}-{}.jpg",
            self.base_url,
            folder.as_str(),
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4()
        )
    }
}

#[async_trait]
impl AttachmentStore for HttpAttachmentStore {
    async fn upload(&self, folder: AttachmentFolder, bytes: Vec<u8>) -> AppResult<String> {
        let url = self.object_url(folder);
        info!("📤 Subiendo adjunto ({} bytes) a {}", bytes.len(), url);

        let mut request = self
            .client
            .put(&url)
            .header("Content-Type", "image/jpeg")
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("❌ Subida de adjunto falló con status {}: {}", status, error_text);
            return Err(AppError::ExternalApi(format!("Upload failed: {}", status)));
        }

        Ok(url)
    }
}

/// Almacén en memoria para desarrollo y tests.
///
/// Nada se libera: el mapa crece con cada subida mientras viva el proceso.
#[derive(Clone, Default)]
pub struct MemoryAttachmentStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get(&self, reference: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(reference).cloned()
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn upload(&self, folder: AttachmentFolder, bytes: Vec<u8>) -> AppResult<String> {
        let reference = format!("memoria://{}/{}.jpg", folder.as_str(), uuid::Uuid::new_v4());
        self.objects.write().await.insert(reference.clone(), bytes);
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_memory_store_devuelve_referencia() {
        let store = MemoryAttachmentStore::new();
        let reference = store
            .upload(AttachmentFolder::Respuestas, vec![1, 2, 3])
            .await
            .unwrap();
        assert!(reference.starts_with("memoria://respuestas/"));
        assert_eq!(store.get(&reference).await, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_http_store_url_por_carpeta() {
        let store = HttpAttachmentStore::new("https://files.test/bucket/".into(), None).unwrap();
        let url = store.object_url(AttachmentFolder::Images);
        assert!(url.starts_with("https://files.test/bucket/images/"));
        assert!(url.ends_with(".jpg"));
    }

    #[test]
    fn test_http_store_urls_distintas_en_el_mismo_milisegundo() {
        let store = HttpAttachmentStore::new("https://files.test/bucket".into(), None).unwrap();
        let a = store.object_url(AttachmentFolder::Respuestas);
        let b = store.object_url(AttachmentFolder::Respuestas);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_http_upload_exitoso_envia_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/bucket/images/\d+-[0-9a-f-]+\.jpg$"))
            .and(header("authorization", "Bearer secreto"))
            .and(header("content-type", "image/jpeg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpAttachmentStore::new(
            format!("{}/bucket", server.uri()),
            Some("secreto".to_string()),
        )
        .unwrap();
        let reference = store
            .upload(AttachmentFolder::Images, vec![0xFF, 0xD8])
            .await
            .unwrap();

        assert!(reference.starts_with(&format!("{}/bucket/images/", server.uri())));
        let recibidas = server.received_requests().await.unwrap();
        assert_eq!(recibidas[0].body, vec![0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_http_upload_sin_token_no_envia_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let store = HttpAttachmentStore::new(server.uri(), None).unwrap();
        store
            .upload(AttachmentFolder::Respuestas, vec![1])
            .await
            .unwrap();

        let recibidas = server.received_requests().await.unwrap();
        assert!(!recibidas[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_http_upload_error_del_servidor() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = HttpAttachmentStore::new(server.uri(), Some("secreto".to_string())).unwrap();
        let result = store.upload(AttachmentFolder::Respuestas, vec![1]).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
