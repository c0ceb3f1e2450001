//! Presentation controller
//!
//! The controller owns the lifecycle of one display session:
//!
//! ```text
//! Idle --begin_load--> Loading --images_loaded--> Ready
//!                         |                         ^ advanced(n)
//!                         |--images_loaded (none)--> Empty
//!                         |--images_failed-------> Empty
//!                         '--config_failed--> Loading (invoker may retry)
//! ```
//!
//! Every handler takes `&mut self`, so two `advanced` calls can never
//! interleave.

use crate::display_config::{DEFAULT_MAIN_TITLE, DisplayConfig};
use crate::error::{Result, SlideshowError};
use crate::state::{Deck, PlaybackState, PresentationEvent};
use crate::transition::Transition;
use crate::viewport::ViewportInput;
use pmodrive::{AggregationResult, ImageRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Lifecycle phase of a display session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Empty,
}

pub struct PresentationController<R = StdRng> {
    phase: Phase,
    deck: Option<Deck>,
    state: Option<PlaybackState>,
    last_error: Option<SlideshowError>,
    rng: R,
}

impl PresentationController<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for PresentationController<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PresentationController<R> {
    /// Controller drawing random transitions from `rng`
    pub fn with_rng(rng: R) -> Self {
        Self {
            phase: Phase::Idle,
            deck: None,
            state: None,
            last_error: None,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&PlaybackState> {
        self.state.as_ref()
    }

    pub fn active_transition(&self) -> Option<Transition> {
        self.state.as_ref().map(|s| s.transition)
    }

    /// Caption currently on screen; in the empty phase only a pinned
    /// sub-title is shown.
    pub fn caption(&self) -> Option<&str> {
        match &self.state {
            Some(state) => Some(state.caption.as_str()),
            None => self.deck.as_ref().and_then(|d| d.fixed_caption.as_deref()),
        }
    }

    pub fn main_title(&self) -> &str {
        self.deck
            .as_ref()
            .map(|d| d.main_title.as_str())
            .unwrap_or(DEFAULT_MAIN_TITLE)
    }

    pub fn images(&self) -> &[ImageRecord] {
        self.deck.as_ref().map(|d| d.images.as_slice()).unwrap_or(&[])
    }

    pub fn last_error(&self) -> Option<&SlideshowError> {
        self.last_error.as_ref()
    }

    /// Input for the viewport, available only once ready
    pub fn viewport_input(&self) -> Option<ViewportInput<'_>> {
        let state = self.state.as_ref()?;
        let deck = self.deck.as_ref()?;
        Some(ViewportInput {
            transition: state.transition,
            images: &deck.images,
        })
    }

    /// Starts loading. Accepted from `Idle`, and again from `Loading` so a
    /// failed configuration read can be retried.
    pub fn begin_load(&mut self) -> Result<()> {
        self.expect_phase(&[Phase::Idle, Phase::Loading], "begin_load")?;
        self.phase = Phase::Loading;
        self.last_error = None;
        debug!("Presentation loading");
        Ok(())
    }

    /// Records a configuration failure; the session stays in `Loading`.
    pub fn config_failed(&mut self, error: SlideshowError) -> Result<()> {
        self.expect_phase(&[Phase::Loading], "config_failed")?;
        warn!("Display configuration unavailable: {}", error);
        self.last_error = Some(error);
        Ok(())
    }

    /// Installs the aggregated images. Returns the events describing the
    /// initial state, empty when no image was found.
    pub fn images_loaded(
        &mut self,
        config: &DisplayConfig,
        result: AggregationResult,
    ) -> Result<Vec<PresentationEvent>> {
        self.expect_phase(&[Phase::Loading], "images_loaded")?;
        if !result.failed_folders.is_empty() {
            warn!(
                "{} folder(s) skipped while loading images",
                result.failed_folders.len()
            );
        }

        let deck = Deck::new(config, result.images);
        if deck.is_empty() {
            info!("No image to show, presentation is empty");
            self.phase = Phase::Empty;
            self.deck = Some(deck);
            self.state = None;
            return Ok(Vec::new());
        }

        let state = PlaybackState::initial(&deck);
        info!(
            "Presentation ready: {} images, transition {}",
            deck.images.len(),
            state.transition
        );
        let events = vec![
            PresentationEvent::TransitionChanged(state.transition),
            PresentationEvent::CaptionChanged(state.caption.clone()),
        ];
        self.phase = Phase::Ready;
        self.deck = Some(deck);
        self.state = Some(state);
        Ok(events)
    }

    /// The image source failed as a whole; the session shows nothing.
    pub fn images_failed(&mut self, config: &DisplayConfig, error: SlideshowError) -> Result<()> {
        self.expect_phase(&[Phase::Loading], "images_failed")?;
        warn!("Image source failed: {}", error);
        self.phase = Phase::Empty;
        self.deck = Some(Deck::new(config, Vec::new()));
        self.state = None;
        self.last_error = Some(error);
        Ok(())
    }

    /// The viewport now shows slide `index`.
    pub fn advanced(&mut self, index: usize) -> Result<Vec<PresentationEvent>> {
        self.expect_phase(&[Phase::Ready], "advanced")?;
        let (Some(deck), Some(state)) = (self.deck.as_ref(), self.state.as_ref()) else {
            return Err(self.invalid("advanced"));
        };

        let (next, events) = state.step(deck, index, &mut self.rng);
        for event in &events {
            if let PresentationEvent::TransitionChanged(t) = event {
                debug!("Transition changed to {} at slide {}", t, index);
            }
        }
        self.state = Some(next);
        Ok(events)
    }

    /// Drops the session; equivalent to reloading the page.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.deck = None;
        self.state = None;
        self.last_error = None;
    }

    fn expect_phase(&self, accepted: &[Phase], event: &'static str) -> Result<()> {
        if accepted.contains(&self.phase) {
            Ok(())
        } else {
            Err(self.invalid(event))
        }
    }

    fn invalid(&self, event: &'static str) -> SlideshowError {
        SlideshowError::InvalidTransition {
            phase: self.phase,
            event,
        }
    }
}
