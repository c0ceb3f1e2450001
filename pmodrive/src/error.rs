//! Gestion des erreurs pour le client Drive

use thiserror::Error;

/// Type Result personnalisé pour pmodrive
pub type Result<T> = std::result::Result<T, DriveError>;

/// Erreurs possibles lors de l'accès au stockage Drive
#[derive(Error, Debug)]
pub enum DriveError {
    /// Credentials absents, invalides ou sans droit sur la ressource
    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    /// Dossier ou fichier introuvable
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Erreur renvoyée par l'API Drive
    #[error("Drive API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// Quota dépassé (rate limiting)
    #[error("Rate limit exceeded, please try again later")]
    RateLimitExceeded,

    /// Le store a renvoyé un jeton de page qui ne fait pas avancer le listing
    #[error("Pagination did not advance for folder {0}")]
    StalledPagination(String),

    /// Erreur générique
    #[error("Drive error: {0}")]
    Other(String),
}

impl DriveError {
    /// Crée une erreur API depuis un code de statut HTTP et un message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            429 => Self::RateLimitExceeded,
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    /// Vérifie si l'erreur signifie que la ressource n'existe pas
    pub fn is_not_found(&self) -> bool {
        matches!(self, DriveError::NotFound(_))
    }

    /// Vérifie si l'erreur est une erreur de credentials (401/403)
    pub fn is_auth_error(&self) -> bool {
        matches!(self, DriveError::Unauthorized(_))
    }
}
