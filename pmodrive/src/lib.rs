//! # pmodrive - Source d'images Google Drive pour PMOSlides
//!
//! Cette crate transforme une arborescence de dossiers Drive, aussi
//! profonde soit-elle, en une liste plate d'images annotées chacune du nom
//! de son dossier parent direct.
//!
//! ## Architecture
//!
//! - `DriveClient` : client REST Drive v3 (nom d'un dossier, listing paginé)
//! - `FolderStore` : trait du stockage parcouru, implémenté par `DriveClient`
//! - `FolderAggregator` : parcours récursif parallèle, tolérant aux pannes
//! - `models` : `DriveEntry` (dossier ou image), `ImageRecord`, `AggregationResult`
//! - `config_ext` : paramètres Drive dans pmoconfig
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pmodrive::{DriveClient, FolderAggregator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DriveClient::builder().api_key("my-api-key").build()?;
//!     let aggregator = FolderAggregator::new(Arc::new(client));
//!
//!     let result = aggregator.aggregate("1AbCdEf").await;
//!     for image in &result.images {
//!         println!("{} ({})", image.url, image.folder_name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Gestion des erreurs
//!
//! `aggregate` ne renvoie jamais d'erreur : une racine absente donne un
//! résultat vide et un sous-dossier illisible est simplement ignoré (voir
//! `AggregationResult::failed_folders`). Les appels directs au client
//! renvoient un [`DriveError`].

pub mod aggregator;
pub mod client;
#[cfg(feature = "pmoconfig")]
pub mod config_ext;
pub mod error;
pub mod models;
pub mod store;

pub use aggregator::{AggregatorOptions, FolderAggregator};
pub use client::{ClientBuilder, Credentials, DriveClient};
#[cfg(feature = "pmoconfig")]
pub use config_ext::DriveConfigExt;
pub use error::{DriveError, Result};
pub use models::{
    AggregationResult, DriveEntry, DriveFile, FolderFailure, FolderNode, ImageFile, ImageRecord,
    ListingPage,
};
pub use store::FolderStore;
