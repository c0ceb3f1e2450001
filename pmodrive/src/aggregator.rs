//! Agrégation récursive des images d'une arborescence de dossiers
//!
//! Une passe part d'un dossier racine, liste chaque dossier en suivant la
//! pagination jusqu'au bout, puis descend dans les sous-dossiers en
//! parallèle (une tâche tokio par sous-dossier). Chaque appel récursif
//! renvoie ses propres images, fusionnées par l'appelant dans l'ordre du
//! listing : aucun accumulateur mutable n'est partagé entre les tâches.
//!
//! Les erreurs sous la racine n'interrompent jamais la passe : le
//! sous-arbre fautif contribue zéro image et est signalé dans
//! [`AggregationResult::failed_folders`].

use crate::error::{DriveError, Result};
use crate::models::{AggregationResult, DriveEntry, FolderFailure, FolderNode, ImageRecord};
use crate::store::FolderStore;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Base des URLs d'affichage des images
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://lh3.googleusercontent.com/d/";

/// Nom utilisé quand celui du dossier racine ne peut pas être résolu
pub const DEFAULT_PLACEHOLDER_FOLDER_NAME: &str = "Album";

/// Nombre par défaut de listings simultanés
pub const DEFAULT_MAX_CONCURRENT_LISTINGS: usize = 8;

/// Paramètres d'une agrégation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorOptions {
    /// Préfixe auquel on concatène l'identifiant pour obtenir l'URL
    pub image_base_url: String,
    /// Nom de repli du dossier racine
    pub placeholder_folder_name: String,
    /// Borne sur les requêtes de listing en vol (0 = pas de borne)
    pub max_concurrent_listings: usize,
    /// Supprime les images vues plusieurs fois (même identifiant)
    pub deduplicate: bool,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            placeholder_folder_name: DEFAULT_PLACEHOLDER_FOLDER_NAME.to_string(),
            max_concurrent_listings: DEFAULT_MAX_CONCURRENT_LISTINGS,
            deduplicate: false,
        }
    }
}

/// Etat partagé (en lecture seule) par toutes les tâches d'une passe
struct Traversal<S: ?Sized> {
    store: Arc<S>,
    options: AggregatorOptions,
    limiter: Option<Semaphore>,
}

/// Contribution d'un dossier et de ses descendants
#[derive(Default)]
struct FolderVisit {
    images: Vec<ImageRecord>,
    failures: Vec<FolderFailure>,
}

impl FolderVisit {
    fn failed(folder_id: &str, reason: impl ToString) -> Self {
        Self {
            images: Vec::new(),
            failures: vec![FolderFailure {
                folder_id: folder_id.to_string(),
                reason: reason.to_string(),
            }],
        }
    }

    fn merge(&mut self, child: FolderVisit) {
        self.images.extend(child.images);
        self.failures.extend(child.failures);
    }
}

/// Agrégateur d'images sur un [`FolderStore`]
pub struct FolderAggregator<S: ?Sized> {
    inner: Arc<Traversal<S>>,
}

impl<S: ?Sized> Clone for FolderAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: FolderStore + ?Sized + 'static> FolderAggregator<S> {
    /// Crée un agrégateur avec les options par défaut
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, AggregatorOptions::default())
    }

    /// Crée un agrégateur avec des options spécifiques
    pub fn with_options(store: Arc<S>, options: AggregatorOptions) -> Self {
        let limiter = match options.max_concurrent_listings {
            0 => None,
            n => Some(Semaphore::new(n)),
        };
        Self {
            inner: Arc::new(Traversal {
                store,
                options,
                limiter,
            }),
        }
    }

    pub fn options(&self) -> &AggregatorOptions {
        &self.inner.options
    }

    /// Parcourt l'arborescence sous `root_folder_id` et renvoie toutes les images
    ///
    /// Ne renvoie jamais d'erreur : une racine vide, introuvable ou illisible
    /// donne un résultat vide. Abandonner le future annule toutes les tâches
    /// en cours et aucun résultat partiel n'est produit.
    pub async fn aggregate(&self, root_folder_id: &str) -> AggregationResult {
        let root_id = root_folder_id.trim();
        if root_id.is_empty() {
            debug!("No root folder configured, nothing to aggregate");
            return AggregationResult::default();
        }

        let root_name = match self.inner.store.folder_name(root_id).await {
            Ok(name) => name,
            Err(e) if e.is_not_found() => {
                info!(folder_id = %root_id, "Root folder not found, empty gallery");
                return AggregationResult::default();
            }
            Err(e) => {
                warn!(folder_id = %root_id, error = %e, "Cannot resolve root folder name");
                self.inner.options.placeholder_folder_name.clone()
            }
        };

        info!(folder_id = %root_id, folder_name = %root_name, "Starting aggregation");
        let root = FolderNode::root(root_id, root_name.clone());
        let visit = visit_folder(self.inner.clone(), root).await;

        let mut images = visit.images;
        if self.inner.options.deduplicate {
            let before = images.len();
            let mut seen = HashSet::new();
            images.retain(|image| seen.insert(image.id.clone()));
            if images.len() != before {
                info!(removed = before - images.len(), "Removed duplicate images");
            }
        }

        info!(
            images = images.len(),
            failed_folders = visit.failures.len(),
            "Aggregation finished"
        );

        AggregationResult {
            root_name,
            images,
            failed_folders: visit.failures,
        }
    }
}

impl<S: FolderStore + ?Sized + 'static> Traversal<S> {
    async fn permit(&self) -> Option<SemaphorePermit<'_>> {
        match &self.limiter {
            // Le sémaphore n'est jamais fermé
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        }
    }

    /// Liste tous les enfants d'un dossier en suivant la pagination
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = {
                let _permit = self.permit().await;
                self.store.list_page(folder_id, page_token.as_deref()).await?
            };
            pages += 1;
            entries.extend(page.entries);

            match page.next_page_token {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    return Err(DriveError::StalledPagination(folder_id.to_string()));
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        if pages > 1 {
            debug!(
                "Folder {} listed in {} pages ({} entries)",
                folder_id,
                pages,
                entries.len()
            );
        }
        Ok(entries)
    }
}

/// Visite un dossier puis, en parallèle, tous ses sous-dossiers
fn visit_folder<S>(traversal: Arc<Traversal<S>>, folder: FolderNode) -> BoxFuture<'static, FolderVisit>
where
    S: FolderStore + ?Sized + 'static,
{
    async move {
        let entries = match traversal.list_folder(&folder.id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(folder_id = %folder.id, folder_name = %folder.name, error = %e, "Skipping folder");
                return FolderVisit::failed(&folder.id, e);
            }
        };

        let mut visit = FolderVisit::default();
        let mut subfolders = Vec::new();
        for entry in entries {
            match entry {
                DriveEntry::ImageFile(file) => visit.images.push(ImageRecord::new(
                    file.id,
                    folder.name.as_str(),
                    &traversal.options.image_base_url,
                )),
                DriveEntry::Folder(child) => subfolders.push(child),
            }
        }

        debug!(
            folder_id = %folder.id,
            images = visit.images.len(),
            subfolders = subfolders.len(),
            "Folder visited"
        );

        if subfolders.is_empty() {
            return visit;
        }

        let child_ids: Vec<String> = subfolders.iter().map(|child| child.id.clone()).collect();
        let mut tasks = JoinSet::new();
        for (position, child) in subfolders.into_iter().enumerate() {
            let traversal = traversal.clone();
            tasks.spawn(async move { (position, visit_folder(traversal, child).await) });
        }

        let mut children: Vec<Option<FolderVisit>> = child_ids.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, child)) => children[position] = Some(child),
                Err(e) => warn!(folder_id = %folder.id, error = %e, "Subfolder task aborted"),
            }
        }

        // Fusion dans l'ordre du listing, indépendamment de l'ordre de fin
        for (child_id, child) in child_ids.iter().zip(children) {
            match child {
                Some(child) => visit.merge(child),
                None => visit.merge(FolderVisit::failed(child_id, "task aborted")),
            }
        }

        visit
    }
    .boxed()
}
