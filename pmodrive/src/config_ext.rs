//! Extension pour intégrer la configuration Drive dans pmoconfig
//!
//! Ce module fournit le trait `DriveConfigExt` qui ajoute à
//! `pmoconfig::Config` les paramètres d'accès à Drive (credentials,
//! pagination, timeout) et les options de l'agrégateur.
//!
//! # Exemple
//!
//! ```rust,ignore
//! use pmoconfig::get_config;
//! use pmodrive::DriveConfigExt;
//!
//! let config = get_config();
//! let options = config.get_drive_aggregator_options()?;
//! println!("Images served from {}", options.image_base_url);
//! ```

use crate::aggregator::{
    AggregatorOptions, DEFAULT_IMAGE_BASE_URL, DEFAULT_MAX_CONCURRENT_LISTINGS,
    DEFAULT_PLACEHOLDER_FOLDER_NAME,
};
use crate::client::{DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS};
use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::Value;
use std::time::Duration;

/// Trait d'extension pour gérer la configuration Drive dans pmoconfig
pub trait DriveConfigExt {
    /// URL de base de l'API REST
    fn get_drive_api_base_url(&self) -> Result<String>;

    /// Préfixe des URLs d'affichage des images
    fn get_drive_image_base_url(&self) -> Result<String>;

    /// Jeton OAuth, ou None si non configuré
    fn get_drive_access_token(&self) -> Result<Option<String>>;

    /// Définit le jeton OAuth
    fn set_drive_access_token(&self, token: &str) -> Result<()>;

    /// Clé d'API, ou None si non configurée
    fn get_drive_api_key(&self) -> Result<Option<String>>;

    /// Définit la clé d'API
    fn set_drive_api_key(&self, key: &str) -> Result<()>;

    /// Taille de page des listings (défaut 1000)
    fn get_drive_page_size(&self) -> Result<u32>;

    /// Timeout des requêtes HTTP (défaut 30 s)
    fn get_drive_request_timeout(&self) -> Result<Duration>;

    /// Borne sur les listings simultanés (0 = pas de borne)
    fn get_drive_max_concurrent_listings(&self) -> Result<usize>;

    /// Nom de repli du dossier racine
    fn get_drive_placeholder_folder_name(&self) -> Result<String>;

    /// Suppression des doublons (désactivée par défaut)
    fn get_drive_deduplicate(&self) -> Result<bool>;

    /// Options complètes de l'agrégateur
    fn get_drive_aggregator_options(&self) -> Result<AggregatorOptions> {
        Ok(AggregatorOptions {
            image_base_url: self.get_drive_image_base_url()?,
            placeholder_folder_name: self.get_drive_placeholder_folder_name()?,
            max_concurrent_listings: self.get_drive_max_concurrent_listings()?,
            deduplicate: self.get_drive_deduplicate()?,
        })
    }
}

impl DriveConfigExt for Config {
    fn get_drive_api_base_url(&self) -> Result<String> {
        Ok(self
            .get_string(&["drive", "api_base_url"])
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()))
    }

    fn get_drive_image_base_url(&self) -> Result<String> {
        Ok(self
            .get_string(&["drive", "image_base_url"])
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string()))
    }

    fn get_drive_access_token(&self) -> Result<Option<String>> {
        Ok(self.get_string(&["drive", "access_token"]))
    }

    fn set_drive_access_token(&self, token: &str) -> Result<()> {
        self.set_value(
            &["drive", "access_token"],
            Value::String(token.to_string()),
        )
    }

    fn get_drive_api_key(&self) -> Result<Option<String>> {
        Ok(self.get_string(&["drive", "api_key"]))
    }

    fn set_drive_api_key(&self, key: &str) -> Result<()> {
        self.set_value(&["drive", "api_key"], Value::String(key.to_string()))
    }

    fn get_drive_page_size(&self) -> Result<u32> {
        Ok(self
            .get_u64(&["drive", "page_size"])
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE))
    }

    fn get_drive_request_timeout(&self) -> Result<Duration> {
        let secs = self
            .get_u64(&["drive", "request_timeout_secs"])
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Ok(Duration::from_secs(secs))
    }

    fn get_drive_max_concurrent_listings(&self) -> Result<usize> {
        Ok(self
            .get_u64(&["drive", "max_concurrent_listings"])
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_LISTINGS))
    }

    fn get_drive_placeholder_folder_name(&self) -> Result<String> {
        Ok(self
            .get_string(&["drive", "placeholder_folder_name"])
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_FOLDER_NAME.to_string()))
    }

    fn get_drive_deduplicate(&self) -> Result<bool> {
        match self.get_value(&["drive", "deduplicate"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => Ok(false),
        }
    }
}
