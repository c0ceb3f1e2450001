//! Wiring of a display session: configuration, images, then playback.

use crate::controller::PresentationController;
use crate::display_config::DisplayConfig;
use crate::error::Result;
use crate::state::PresentationEvent;
use crate::store::ConfigStore;
use crate::viewport::{Viewport, ViewportEvent, ViewportSettings};
use async_trait::async_trait;
use pmodrive::{AggregationResult, FolderAggregator, FolderStore};
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Anything able to turn a folder id into a flat image list
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_images(&self, folder_id: &str) -> Result<AggregationResult>;
}

#[async_trait]
impl<S> ImageSource for FolderAggregator<S>
where
    S: FolderStore + ?Sized + 'static,
{
    async fn fetch_images(&self, folder_id: &str) -> Result<AggregationResult> {
        Ok(self.aggregate(folder_id).await)
    }
}

/// Runs one load cycle on `controller`.
///
/// A configuration failure is reported to the controller, which stays in
/// `Loading`, and returned so the caller can retry. A failing image source
/// leaves the session empty.
pub async fn load_session<R: Rng>(
    controller: &mut PresentationController<R>,
    store: &dyn ConfigStore,
    source: &dyn ImageSource,
) -> Result<Vec<PresentationEvent>> {
    controller.begin_load()?;

    let config = match store.load_display_config().await {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            controller.config_failed(e.clone())?;
            return Err(e);
        }
    };
    load_images(controller, &config, source).await
}

/// Second half of a load cycle, for callers that already hold the record
pub async fn load_images<R: Rng>(
    controller: &mut PresentationController<R>,
    config: &DisplayConfig,
    source: &dyn ImageSource,
) -> Result<Vec<PresentationEvent>> {
    if config.folder_id.is_empty() {
        warn!("No folder configured");
    }
    debug!(folder_id = %config.folder_id, "Loading images");

    match source.fetch_images(&config.folder_id).await {
        Ok(result) => controller.images_loaded(config, result),
        Err(e) => {
            controller.images_failed(config, e)?;
            Ok(Vec::new())
        }
    }
}

/// Plays up to `slides` slides, one every `settings.autoplay_delay`.
///
/// `on_slide` receives each index reported by the viewport with the
/// events it produced. Returns how many slides were shown; an empty
/// session shows none.
pub async fn play<R, V, F>(
    controller: &mut PresentationController<R>,
    viewport: &mut V,
    settings: &ViewportSettings,
    slides: usize,
    mut on_slide: F,
) -> Result<usize>
where
    R: Rng,
    V: Viewport,
    F: FnMut(usize, &[PresentationEvent]),
{
    let Some(input) = controller.viewport_input() else {
        info!("Nothing to play");
        return Ok(0);
    };
    viewport.configure(input.transition, input.images);

    let mut ticker = tokio::time::interval(settings.autoplay_delay);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    let mut shown = 0;
    while shown < slides {
        ticker.tick().await;
        let Some(index) = viewport.advance() else {
            break;
        };
        let events = controller.advanced(index)?;
        for event in &events {
            if let PresentationEvent::TransitionChanged(transition) = event {
                viewport.configure(*transition, controller.images());
            }
        }
        on_slide(index, &events);
        shown += 1;
    }
    Ok(shown)
}

/// Consumes events from a viewport living in another task until the
/// channel closes.
///
/// `on_events` receives the events each report produced, typically to
/// forward transition changes back to that viewport. Returns how many
/// reports were handled.
pub async fn follow<R, F>(
    controller: &mut PresentationController<R>,
    mut events: mpsc::Receiver<ViewportEvent>,
    mut on_events: F,
) -> Result<usize>
where
    R: Rng,
    F: FnMut(&[PresentationEvent]),
{
    let mut handled = 0;
    while let Some(event) = events.recv().await {
        match event {
            ViewportEvent::Advanced(index) => {
                let produced = controller.advanced(index)?;
                on_events(&produced);
            }
        }
        handled += 1;
    }
    debug!("Viewport channel closed after {} event(s)", handled);
    Ok(handled)
}
