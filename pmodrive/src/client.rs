//! Client HTTP pour l'API REST Google Drive v3
//!
//! Seules les deux opérations nécessaires à l'agrégation sont exposées :
//! la résolution du nom d'un dossier et le listing paginé de ses enfants.
//!
//! # Exemple
//!
//! ```no_run
//! use pmodrive::DriveClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DriveClient::builder().api_key("my-api-key").build()?;
//!     let name = client.get_folder_name("1AbCdEf").await?;
//!     println!("Folder: {}", name);
//!     Ok(())
//! }
//! ```

use crate::error::{DriveError, Result};
use crate::models::{DriveEntry, DriveFile, FOLDER_MIME_TYPE, IMAGE_MIME_PREFIX, ListingPage};
use crate::store::FolderStore;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// URL de base de l'API Drive
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Taille de page maximale acceptée par Drive
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Timeout par défaut des requêtes HTTP (30 secondes)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// User-Agent par défaut
pub const DEFAULT_USER_AGENT: &str = "PMOSlides/0.1.0 (pmodrive)";

/// Mode d'authentification des requêtes
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Credentials {
    /// Aucune authentification (dossiers publics derrière un proxy, tests)
    #[default]
    Anonymous,
    /// Jeton OAuth envoyé en `Authorization: Bearer`
    AccessToken(String),
    /// Clé d'API envoyée en paramètre `key`
    ApiKey(String),
}

/// Réponse de l'endpoint `/files`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Réponse de l'endpoint `/files/{id}?fields=name`
#[derive(Debug, Deserialize)]
struct FileNameResponse {
    name: String,
}

/// Client Drive
#[derive(Debug, Clone)]
pub struct DriveClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    page_size: u32,
}

impl DriveClient {
    /// Crée un client anonyme avec les paramètres par défaut
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Crée un builder pour configurer le client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Crée un client depuis la configuration globale de pmoconfig
    #[cfg(feature = "pmoconfig")]
    pub fn from_config() -> Result<Self> {
        let config = pmoconfig::get_config();
        Self::from_config_obj(config.as_ref())
    }

    /// Crée un client depuis un objet Config spécifique
    #[cfg(feature = "pmoconfig")]
    pub fn from_config_obj(config: &pmoconfig::Config) -> Result<Self> {
        use crate::config_ext::DriveConfigExt;

        let mut builder = Self::builder()
            .base_url(config.get_drive_api_base_url()?)
            .page_size(config.get_drive_page_size()?)
            .timeout(config.get_drive_request_timeout()?);

        if let Some(token) = config.get_drive_access_token()? {
            builder = builder.access_token(token);
        } else if let Some(key) = config.get_drive_api_key()? {
            builder = builder.api_key(key);
        } else {
            warn!("No Drive credentials configured, requests will be anonymous");
        }

        builder.build()
    }

    /// Retourne l'URL de base
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retourne la taille de page utilisée pour les listings
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Récupère le nom affiché d'un dossier
    pub async fn get_folder_name(&self, folder_id: &str) -> Result<String> {
        debug!("Resolving name of folder {}", folder_id);
        let endpoint = format!("/files/{}", folder_id);
        let response: FileNameResponse = self.get(&endpoint, &[("fields", "name")]).await?;
        Ok(response.name)
    }

    /// Récupère une page des enfants (dossiers et images) d'un dossier
    pub async fn list_children_page(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<ListingPage> {
        let query = Self::children_query(folder_id);
        let page_size = self.page_size.to_string();
        let mut params = vec![
            ("q", query.as_str()),
            ("fields", "nextPageToken, files(id, name, mimeType)"),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response: FileListResponse = self.get("/files", &params).await?;
        debug!(
            "Folder {} page: {} files, more: {}",
            folder_id,
            response.files.len(),
            response.next_page_token.is_some()
        );

        let entries = response
            .files
            .into_iter()
            .filter_map(|file| DriveEntry::classify(file, folder_id))
            .collect();

        Ok(ListingPage {
            entries,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    /// Construit la requête de recherche des enfants directs non supprimés
    pub(crate) fn children_query(folder_id: &str) -> String {
        let escaped = folder_id.replace('\\', "\\\\").replace('\'', "\\'");
        format!(
            "'{}' in parents and (mimeType contains '{}' or mimeType = '{}') and trashed = false",
            escaped, IMAGE_MIME_PREFIX, FOLDER_MIME_TYPE
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::Anonymous => request,
            Credentials::AccessToken(token) => request.bearer_auth(token),
            Credentials::ApiKey(key) => request.query(&[("key", key.as_str())]),
        }
    }

    /// Effectue une requête GET à l'API
    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} with {} params", url, params.len());

        let request = self.authorize(self.client.get(&url)).query(params);
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Traite la réponse HTTP
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let status_code = status.as_u16();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = Self::error_message(&error_text);
            warn!("Drive API error ({}): {}", status_code, message);
            return Err(DriveError::from_status_code(status_code, message));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            DriveError::JsonParse(e)
        })
    }

    /// Extrait `error.message` d'un corps d'erreur Drive, sinon le corps brut
    fn error_message(body: &str) -> String {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string())
    }
}

#[async_trait]
impl FolderStore for DriveClient {
    async fn folder_name(&self, folder_id: &str) -> Result<String> {
        self.get_folder_name(folder_id).await
    }

    async fn list_page(&self, folder_id: &str, page_token: Option<&str>) -> Result<ListingPage> {
        self.list_children_page(folder_id, page_token).await
    }
}

/// Builder pour configurer un DriveClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    credentials: Credentials,
    page_size: u32,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: Credentials::Anonymous,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Utilise un client reqwest existant (partage du pool de connexions)
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Credentials::AccessToken(token.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials = Credentials::ApiKey(key.into());
        self
    }

    /// Taille de page des listings, bornée à [1, 1000]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    pub fn build(self) -> Result<DriveClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(DriveClient {
            client,
            base_url: self.base_url,
            credentials: self.credentials,
            page_size: self.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_query() {
        assert_eq!(
            DriveClient::children_query("ABC123"),
            "'ABC123' in parents and (mimeType contains 'image/' or mimeType = \
             'application/vnd.google-apps.folder') and trashed = false"
        );
    }

    #[test]
    fn test_children_query_escapes_quotes() {
        assert!(DriveClient::children_query("a'b").starts_with("'a\\'b' in parents"));
    }

    #[test]
    fn test_builder_defaults() {
        let client = DriveClient::new().unwrap();
        assert_eq!(client.base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(client.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(client.credentials, Credentials::Anonymous);
    }

    #[test]
    fn test_builder_clamps_page_size_and_trims_url() {
        let client = DriveClient::builder()
            .base_url("http://localhost:1234/")
            .page_size(5000)
            .api_key("k")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
        assert_eq!(client.page_size(), 1000);
        assert_eq!(client.credentials, Credentials::ApiKey("k".into()));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"code":404,"message":"File not found: X."}}"#;
        assert_eq!(DriveClient::error_message(body), "File not found: X.");
        assert_eq!(DriveClient::error_message("plain"), "plain");
    }
}
