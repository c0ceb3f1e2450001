//! Structures de données pour représenter les objets Drive et le résultat d'une agrégation

use serde::{Deserialize, Serialize};

/// Type MIME des dossiers Drive
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Préfixe des types MIME considérés comme des images
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Fichier brut tel que renvoyé par l'endpoint `/files`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Identifiant opaque du fichier
    pub id: String,
    /// Nom affiché
    #[serde(default)]
    pub name: String,
    /// Type MIME (dossier, image/jpeg, ...)
    #[serde(default)]
    pub mime_type: String,
}

/// Un dossier rencontré pendant une agrégation
///
/// N'existe que le temps d'une passe : rien n'est persisté.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    /// Identifiant du dossier
    pub id: String,
    /// Nom affiché, utilisé pour annoter les images qu'il contient
    pub name: String,
    /// Identifiant du dossier parent (`None` pour la racine)
    pub parent: Option<String>,
}

impl FolderNode {
    /// Crée le noeud racine d'une passe
    pub fn root(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: None,
        }
    }
}

/// Une image feuille rencontrée pendant une agrégation
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// Entrée d'un listing, classée une seule fois à la réception
#[derive(Debug, Clone, PartialEq)]
pub enum DriveEntry {
    Folder(FolderNode),
    ImageFile(ImageFile),
}

impl DriveEntry {
    /// Classe un fichier brut d'après son type MIME
    ///
    /// Retourne `None` pour tout ce qui n'est ni un dossier ni une image
    /// (raccourcis, documents, vidéos...).
    pub fn classify(file: DriveFile, parent_id: &str) -> Option<Self> {
        if file.mime_type == FOLDER_MIME_TYPE {
            Some(DriveEntry::Folder(FolderNode {
                id: file.id,
                name: file.name,
                parent: Some(parent_id.to_string()),
            }))
        } else if file.mime_type.starts_with(IMAGE_MIME_PREFIX) {
            Some(DriveEntry::ImageFile(ImageFile {
                id: file.id,
                name: file.name,
                mime_type: file.mime_type,
            }))
        } else {
            None
        }
    }
}

/// Une page de listing d'un dossier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub entries: Vec<DriveEntry>,
    /// Jeton de la page suivante, absent sur la dernière page
    pub next_page_token: Option<String>,
}

/// Image annotée produite par l'agrégateur
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Identifiant opaque, unique dans une passe
    pub id: String,
    /// URL d'affichage dérivée de l'identifiant
    pub url: String,
    /// Nom du dossier qui contient directement l'image
    pub folder_name: String,
}

impl ImageRecord {
    /// Construit un enregistrement en dérivant l'URL de l'identifiant
    pub fn new(id: impl Into<String>, folder_name: impl Into<String>, image_base_url: &str) -> Self {
        let id = id.into();
        Self {
            url: format!("{}{}", image_base_url, id),
            id,
            folder_name: folder_name.into(),
        }
    }
}

/// Dossier dont le listing a échoué pendant une passe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FolderFailure {
    pub folder_id: String,
    pub reason: String,
}

/// Résultat d'une passe d'agrégation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    /// Nom du dossier racine (placeholder si non résolu, vide si pas de racine)
    #[serde(rename = "folderName")]
    pub root_name: String,
    /// Images dans l'ordre d'insertion de la traversée
    pub images: Vec<ImageRecord>,
    /// Sous-arbres ignorés suite à une erreur
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_folders: Vec<FolderFailure>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }
}
