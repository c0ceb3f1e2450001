use async_trait::async_trait;
use pmodrive::{
    AggregationResult, AggregatorOptions, DriveEntry, DriveError, DriveFile, FolderAggregator,
    FolderStore, ImageRecord, ListingPage,
};
use pmoslideshow::session::{follow, load_images, load_session, play};
use pmoslideshow::{
    ConfigStore, DisplayConfig, ImageSource, LoopingViewport, Phase, PresentationController,
    PresentationEvent, ROTATION, SlideshowError, Transition, TransitionMode, ViewportEvent, ViewportSettings,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory display record, optionally unreachable
#[derive(Default)]
struct MemoryConfig {
    record: Mutex<Option<DisplayConfig>>,
    offline: bool,
}

#[async_trait]
impl ConfigStore for MemoryConfig {
    async fn load_display_config(&self) -> pmoslideshow::Result<Option<DisplayConfig>> {
        if self.offline {
            return Err(SlideshowError::config_unavailable("store offline"));
        }
        Ok(self.record.lock().unwrap().clone())
    }

    async fn save_display_config(
        &self,
        config: &DisplayConfig,
    ) -> pmoslideshow::Result<DisplayConfig> {
        let normalized = config.normalized();
        *self.record.lock().unwrap() = Some(normalized.clone());
        Ok(normalized)
    }
}

/// One-level folder store: `2024` holds a few images and `Graduation`
struct SchoolYear {
    children: HashMap<&'static str, Vec<DriveFile>>,
}

impl SchoolYear {
    fn new() -> Self {
        let folder = |id: &str, name: &str| DriveFile {
            id: id.into(),
            name: name.into(),
            mime_type: pmodrive::models::FOLDER_MIME_TYPE.into(),
        };
        let image = |id: &str| DriveFile {
            id: id.into(),
            name: format!("{}.jpg", id),
            mime_type: "image/jpeg".into(),
        };
        let mut children = HashMap::new();
        children.insert(
            "ROOT",
            vec![image("r1"), image("r2"), folder("GRAD", "Graduation")],
        );
        children.insert("GRAD", vec![image("g1")]);
        Self { children }
    }
}

#[async_trait]
impl FolderStore for SchoolYear {
    async fn folder_name(&self, folder_id: &str) -> pmodrive::Result<String> {
        match folder_id {
            "ROOT" => Ok("2024".into()),
            "GRAD" => Ok("Graduation".into()),
            other => Err(DriveError::NotFound(other.into())),
        }
    }

    async fn list_page(
        &self,
        folder_id: &str,
        _page_token: Option<&str>,
    ) -> pmodrive::Result<ListingPage> {
        let files = self
            .children
            .get(folder_id)
            .ok_or_else(|| DriveError::NotFound(folder_id.into()))?;
        Ok(ListingPage {
            entries: files
                .iter()
                .cloned()
                .filter_map(|f| DriveEntry::classify(f, folder_id))
                .collect(),
            next_page_token: None,
        })
    }
}

/// Source returning `n` images from a single folder
struct FlatSource(usize);

#[async_trait]
impl ImageSource for FlatSource {
    async fn fetch_images(&self, _folder_id: &str) -> pmoslideshow::Result<AggregationResult> {
        Ok(AggregationResult {
            root_name: "2024".into(),
            images: (0..self.0)
                .map(|i| ImageRecord::new(format!("img{}", i), "2024", "https://img.example.com/d/"))
                .collect(),
            failed_folders: Vec::new(),
        })
    }
}

struct BrokenSource;

#[async_trait]
impl ImageSource for BrokenSource {
    async fn fetch_images(&self, _folder_id: &str) -> pmoslideshow::Result<AggregationResult> {
        Err(DriveError::Unauthorized("no credentials".into()).into())
    }
}

fn controller() -> PresentationController<StdRng> {
    PresentationController::with_rng(StdRng::seed_from_u64(2024))
}

fn fast() -> ViewportSettings {
    ViewportSettings {
        autoplay_delay: Duration::from_millis(1),
        ..Default::default()
    }
}

#[tokio::test]
async fn loads_drive_tree_with_sub_title() {
    let store = MemoryConfig::default();
    store
        .save_display_config(&DisplayConfig {
            folder_id: "https://drive.example.com/folders/ROOT?usp=sharing".into(),
            main_title: "Class of 2024".into(),
            sub_title: Some("Best Memories".into()),
            transition_mode: TransitionMode::Fixed(Transition::Fade),
        })
        .await
        .unwrap();
    let source = FolderAggregator::with_options(
        Arc::new(SchoolYear::new()),
        AggregatorOptions::default(),
    );

    let mut controller = controller();
    load_session(&mut controller, &store, &source).await.unwrap();

    assert_eq!(controller.phase(), Phase::Ready);
    assert_eq!(controller.images().len(), 3);
    assert_eq!(controller.main_title(), "Class of 2024");
    assert_eq!(controller.caption(), Some("Best Memories"));

    let mut viewport = LoopingViewport::new(fast());
    let mut events = Vec::new();
    let shown = play(&mut controller, &mut viewport, &fast(), 6, |_, e| {
        events.extend_from_slice(e)
    })
    .await
    .unwrap();
    assert_eq!(shown, 6);
    assert!(events.is_empty());
    assert_eq!(controller.caption(), Some("Best Memories"));
    assert_eq!(controller.active_transition(), Some(Transition::Fade));
}

#[tokio::test]
async fn caption_follows_folder_without_sub_title() {
    let store = MemoryConfig::default();
    *store.record.lock().unwrap() = Some(DisplayConfig {
        folder_id: "ROOT".into(),
        ..Default::default()
    });
    let source = FolderAggregator::new(Arc::new(SchoolYear::new()));

    let mut controller = controller();
    load_session(&mut controller, &store, &source).await.unwrap();
    assert_eq!(controller.caption(), Some("2024"));
    assert_eq!(controller.main_title(), pmoslideshow::DEFAULT_MAIN_TITLE);

    let graduation = controller
        .images()
        .iter()
        .position(|i| i.folder_name == "Graduation")
        .unwrap();
    let events = controller.advanced(graduation).unwrap();
    assert_eq!(controller.caption(), Some("Graduation"));
    assert_eq!(
        events,
        vec![PresentationEvent::CaptionChanged("Graduation".into())]
    );
}

#[tokio::test]
async fn missing_record_uses_defaults() {
    let store = MemoryConfig::default();
    let mut controller = controller();
    load_session(&mut controller, &store, &FlatSource(0)).await.unwrap();

    assert_eq!(controller.phase(), Phase::Empty);
    assert_eq!(controller.main_title(), "Photo Gallery");
    assert_eq!(controller.caption(), None);
}

#[tokio::test]
async fn unreachable_config_stays_loading() {
    let store = MemoryConfig {
        offline: true,
        ..Default::default()
    };
    let mut controller = controller();
    let err = load_session(&mut controller, &store, &FlatSource(3))
        .await
        .unwrap_err();

    assert!(matches!(err, SlideshowError::ConfigUnavailable(_)));
    assert_eq!(controller.phase(), Phase::Loading);
    assert!(controller.images().is_empty());

    // retry once the store is back
    let store = MemoryConfig::default();
    load_session(&mut controller, &store, &FlatSource(3)).await.unwrap();
    assert_eq!(controller.phase(), Phase::Ready);
}

#[tokio::test]
async fn failing_source_leaves_session_empty() {
    let mut controller = controller();
    controller.begin_load().unwrap();
    let events = load_images(&mut controller, &DisplayConfig::default(), &BrokenSource)
        .await
        .unwrap();

    assert!(events.is_empty());
    assert_eq!(controller.phase(), Phase::Empty);
    assert!(matches!(
        controller.last_error(),
        Some(SlideshowError::ImagesUnavailable(_))
    ));
}

#[tokio::test]
async fn random_mode_reinitialises_viewport_every_ten_slides() {
    let store = MemoryConfig::default();
    *store.record.lock().unwrap() = Some(DisplayConfig {
        folder_id: "ROOT".into(),
        transition_mode: TransitionMode::Random,
        ..Default::default()
    });

    let mut controller = controller();
    load_session(&mut controller, &store, &FlatSource(25)).await.unwrap();
    assert_eq!(controller.active_transition(), Some(Transition::Fade));

    let mut viewport = LoopingViewport::new(fast());
    let mut changes = Vec::new();
    play(&mut controller, &mut viewport, &fast(), 24, |index, events| {
        for event in events {
            if let PresentationEvent::TransitionChanged(t) = event {
                changes.push((index, *t));
            }
        }
    })
    .await
    .unwrap();

    assert!(changes.iter().all(|(index, _)| *index == 10 || *index == 20));
    assert!(changes.iter().all(|(_, t)| ROTATION.contains(t)));
    assert_eq!(viewport.initializations(), 1 + changes.len());
    assert_eq!(viewport.transition(), controller.active_transition());
}

#[tokio::test]
async fn empty_session_plays_nothing() {
    let mut controller = controller();
    load_session(&mut controller, &MemoryConfig::default(), &FlatSource(0))
        .await
        .unwrap();
    let mut viewport = LoopingViewport::default();
    let shown = play(&mut controller, &mut viewport, &fast(), 5, |_, _| {})
        .await
        .unwrap();
    assert_eq!(shown, 0);
    assert_eq!(viewport.initializations(), 0);
}

#[tokio::test]
async fn follows_events_from_another_task() {
    let mut controller = controller();
    let store = MemoryConfig::default();
    *store.record.lock().unwrap() = Some(DisplayConfig {
        transition_mode: TransitionMode::Random,
        ..Default::default()
    });
    load_session(&mut controller, &store, &FlatSource(12)).await.unwrap();

    let (tx, rx) = tokio::sync::mpsc::channel(4);
    let producer = tokio::spawn(async move {
        for index in 1..=11 {
            tx.send(ViewportEvent::Advanced(index)).await.unwrap();
        }
        // a repeated report never draws again
        tx.send(ViewportEvent::Advanced(11)).await.unwrap();
    });

    let mut reports = Vec::new();
    let handled = follow(&mut controller, rx, |events| reports.push(events.to_vec()))
        .await
        .unwrap();
    producer.await.unwrap();

    assert_eq!(handled, 12);
    assert_eq!(controller.state().unwrap().index, 11);
    for (i, events) in reports.iter().enumerate() {
        let index = i + 1;
        if index != 10 {
            assert!(!events
                .iter()
                .any(|e| matches!(e, PresentationEvent::TransitionChanged(_))));
        }
    }
}
