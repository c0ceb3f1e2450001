use async_trait::async_trait;
use pmodrive::models::FOLDER_MIME_TYPE;
use pmodrive::{
    AggregatorOptions, DriveEntry, DriveError, DriveFile, FolderAggregator, FolderStore,
    ListingPage, Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Arborescence en mémoire, avec pannes et latence injectables
#[derive(Default)]
struct MemoryTree {
    names: HashMap<String, String>,
    children: HashMap<String, Vec<DriveFile>>,
    broken_listings: HashSet<String>,
    broken_names: HashSet<String>,
    page_size: usize,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    listings: AtomicUsize,
}

impl MemoryTree {
    fn new() -> Self {
        Self {
            page_size: 2,
            ..Default::default()
        }
    }

    fn folder(mut self, parent: Option<&str>, id: &str, name: &str) -> Self {
        self.names.insert(id.into(), name.into());
        self.children.entry(id.into()).or_default();
        if let Some(parent) = parent {
            self.children.entry(parent.into()).or_default().push(DriveFile {
                id: id.into(),
                name: name.into(),
                mime_type: FOLDER_MIME_TYPE.into(),
            });
        }
        self
    }

    fn file(mut self, parent: &str, id: &str, mime: &str) -> Self {
        self.children.entry(parent.into()).or_default().push(DriveFile {
            id: id.into(),
            name: format!("{}.bin", id),
            mime_type: mime.into(),
        });
        self
    }

    fn image(self, parent: &str, id: &str) -> Self {
        self.file(parent, id, "image/jpeg")
    }
}

#[async_trait]
impl FolderStore for MemoryTree {
    async fn folder_name(&self, folder_id: &str) -> Result<String> {
        if self.broken_names.contains(folder_id) {
            return Err(DriveError::Unauthorized(folder_id.into()));
        }
        self.names
            .get(folder_id)
            .cloned()
            .ok_or_else(|| DriveError::NotFound(folder_id.into()))
    }

    async fn list_page(&self, folder_id: &str, page_token: Option<&str>) -> Result<ListingPage> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.listings.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        // La panne survient après la première page pour vérifier que les
        // pages déjà reçues sont bien abandonnées
        if self.broken_listings.contains(folder_id) && start > 0 {
            return Err(DriveError::from_status_code(500, "backend error"));
        }

        let files = self
            .children
            .get(folder_id)
            .ok_or_else(|| DriveError::NotFound(folder_id.into()))?;
        let end = (start + self.page_size).min(files.len());
        let entries = files[start..end]
            .iter()
            .cloned()
            .filter_map(|f| DriveEntry::classify(f, folder_id))
            .collect();
        Ok(ListingPage {
            entries,
            next_page_token: (end < files.len()).then(|| end.to_string()),
        })
    }
}

/// 2024
/// ├── cover.jpg
/// ├── Sports Day
/// │   ├── run1, run2, run3
/// │   └── Relay
/// │       └── baton.jpg
/// └── Graduation
///     ├── cap.jpg
///     └── notes.pdf
fn school_year() -> MemoryTree {
    MemoryTree::new()
        .folder(None, "root", "2024")
        .image("root", "cover")
        .folder(Some("root"), "sports", "Sports Day")
        .image("sports", "run1")
        .image("sports", "run2")
        .image("sports", "run3")
        .folder(Some("sports"), "relay", "Relay")
        .image("relay", "baton")
        .folder(Some("root"), "grad", "Graduation")
        .image("grad", "cap")
        .file("grad", "notes", "application/pdf")
}

fn by_id(images: &[pmodrive::ImageRecord]) -> HashMap<String, String> {
    images
        .iter()
        .map(|i| (i.id.clone(), i.folder_name.clone()))
        .collect()
}

#[tokio::test]
async fn collects_every_image_at_any_depth() {
    let result = FolderAggregator::new(Arc::new(school_year()))
        .aggregate("root")
        .await;

    let ids: HashSet<_> = result.images.iter().map(|i| i.id.as_str()).collect();
    let expected: HashSet<_> = ["cover", "run1", "run2", "run3", "baton", "cap"]
        .into_iter()
        .collect();
    assert_eq!(ids, expected);
    assert_eq!(result.len(), 6);
    assert_eq!(result.root_name, "2024");
    assert!(result.failed_folders.is_empty());
}

#[tokio::test]
async fn annotates_with_direct_parent_name() {
    let result = FolderAggregator::new(Arc::new(school_year()))
        .aggregate("root")
        .await;
    let names = by_id(&result.images);

    assert_eq!(names["cover"], "2024");
    assert_eq!(names["run1"], "Sports Day");
    assert_eq!(names["baton"], "Relay");
    assert_eq!(names["cap"], "Graduation");
}

#[tokio::test]
async fn parent_images_come_before_their_subtrees() {
    let result = FolderAggregator::new(Arc::new(school_year()))
        .aggregate("root")
        .await;
    let position = |id: &str| result.images.iter().position(|i| i.id == id).unwrap();

    assert_eq!(position("cover"), 0);
    assert!(position("run3") < position("baton"));
}

#[tokio::test]
async fn urls_are_derived_from_ids() {
    let options = AggregatorOptions {
        image_base_url: "https://img.example.com/d/".into(),
        ..Default::default()
    };
    let result = FolderAggregator::with_options(Arc::new(school_year()), options)
        .aggregate("root")
        .await;
    assert!(result
        .images
        .iter()
        .all(|i| i.url == format!("https://img.example.com/d/{}", i.id)));
}

#[tokio::test]
async fn missing_root_yields_empty_result() {
    let result = FolderAggregator::new(Arc::new(school_year()))
        .aggregate("does-not-exist")
        .await;
    assert!(result.is_empty());
    assert!(result.root_name.is_empty());
}

#[tokio::test]
async fn empty_root_yields_empty_result() {
    let tree = MemoryTree::new().folder(None, "root", "Nothing here");
    let result = FolderAggregator::new(Arc::new(tree)).aggregate("root").await;
    assert!(result.is_empty());
    assert_eq!(result.root_name, "Nothing here");
}

#[tokio::test]
async fn unresolvable_root_name_uses_placeholder() {
    let mut tree = school_year();
    tree.broken_names.insert("root".into());
    let result = FolderAggregator::new(Arc::new(tree)).aggregate("root").await;

    assert_eq!(result.root_name, "Album");
    assert_eq!(by_id(&result.images)["cover"], "Album");
    assert_eq!(result.len(), 6);
}

#[tokio::test]
async fn failing_subtree_contributes_nothing() {
    let mut tree = school_year();
    // "sports" a 4 entrées : la deuxième page échoue
    tree.broken_listings.insert("sports".into());
    let result = FolderAggregator::new(Arc::new(tree)).aggregate("root").await;

    let ids: HashSet<_> = result.images.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, HashSet::from(["cover", "cap"]));
    assert_eq!(result.failed_folders.len(), 1);
    assert_eq!(result.failed_folders[0].folder_id, "sports");
}

#[tokio::test]
async fn respects_listing_concurrency_limit() {
    let mut tree = MemoryTree::new().folder(None, "root", "root");
    for i in 0..12 {
        let id = format!("f{}", i);
        tree = tree.folder(Some("root"), &id, &id).image(&id, &format!("img{}", i));
    }
    tree.page_size = 100;
    tree.delay = Some(Duration::from_millis(20));
    let tree = Arc::new(tree);

    let options = AggregatorOptions {
        max_concurrent_listings: 3,
        ..Default::default()
    };
    let result = FolderAggregator::with_options(tree.clone(), options)
        .aggregate("root")
        .await;

    assert_eq!(result.len(), 12);
    assert!(tree.max_in_flight.load(Ordering::SeqCst) <= 3);
    assert!(tree.max_in_flight.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
async fn cancelled_pass_stops_issuing_listings() {
    let mut tree = MemoryTree::new().folder(None, "root", "root");
    let mut parent = "root".to_string();
    for depth in 0..10 {
        let id = format!("d{}", depth);
        tree = tree.folder(Some(parent.as_str()), &id, &id).image(&id, &format!("img{}", depth));
        parent = id;
    }
    tree.delay = Some(Duration::from_millis(50));
    let tree = Arc::new(tree);

    let aggregator = FolderAggregator::new(tree.clone());
    let outcome =
        tokio::time::timeout(Duration::from_millis(120), aggregator.aggregate("root")).await;
    assert!(outcome.is_err());

    let issued = tree.listings.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(tree.listings.load(Ordering::SeqCst), issued);
    assert!(issued < 11);
}
