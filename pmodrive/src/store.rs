//! Abstraction du stockage distant parcouru par l'agrégateur

use crate::error::Result;
use crate::models::ListingPage;
use async_trait::async_trait;

/// Stockage hiérarchique de fichiers (Drive ou équivalent)
///
/// L'agrégateur ne dépend que de ce trait, ce qui permet de le tester
/// contre un arbre en mémoire.
///
/// ```rust
/// use async_trait::async_trait;
/// use pmodrive::{DriveEntry, DriveFile, FolderAggregator, FolderStore, ListingPage, Result};
/// use std::sync::Arc;
///
/// struct OnePhoto;
///
/// #[async_trait]
/// impl FolderStore for OnePhoto {
///     async fn folder_name(&self, _folder_id: &str) -> Result<String> {
///         Ok("Vacances".to_string())
///     }
///
///     async fn list_page(&self, folder_id: &str, _page_token: Option<&str>) -> Result<ListingPage> {
///         let file = DriveFile {
///             id: "p1".into(),
///             name: "plage.jpg".into(),
///             mime_type: "image/jpeg".into(),
///         };
///         Ok(ListingPage {
///             entries: DriveEntry::classify(file, folder_id).into_iter().collect(),
///             next_page_token: None,
///         })
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let result = FolderAggregator::new(Arc::new(OnePhoto)).aggregate("root").await;
/// assert_eq!(result.images[0].folder_name, "Vacances");
/// # });
/// ```
#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Résout le nom affiché d'un dossier
    ///
    /// Doit retourner [`DriveError::NotFound`](crate::DriveError::NotFound)
    /// si le dossier n'existe pas.
    async fn folder_name(&self, folder_id: &str) -> Result<String>;

    /// Liste une page des enfants directs d'un dossier
    ///
    /// `page_token` vaut `None` pour la première page.
    async fn list_page(&self, folder_id: &str, page_token: Option<&str>) -> Result<ListingPage>;
}
