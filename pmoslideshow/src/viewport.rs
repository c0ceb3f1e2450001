//! Viewport abstraction: the component that actually shows the slides

use crate::transition::Transition;
use pmodrive::ImageRecord;
use std::time::Duration;

pub const DEFAULT_AUTOPLAY_DELAY_MS: u64 = 5000;
pub const DEFAULT_SPEED_MS: u64 = 800;

/// Playback timing handed to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSettings {
    /// Time each slide stays on screen
    pub autoplay_delay: Duration,
    /// Duration of the transition animation
    pub speed: Duration,
    /// Wrap to the first slide after the last one
    pub looping: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            autoplay_delay: Duration::from_millis(DEFAULT_AUTOPLAY_DELAY_MS),
            speed: Duration::from_millis(DEFAULT_SPEED_MS),
            looping: true,
        }
    }
}

/// What the controller hands to the viewport once ready
#[derive(Debug, Clone, Copy)]
pub struct ViewportInput<'a> {
    pub transition: Transition,
    pub images: &'a [ImageRecord],
}

/// Notification sent by a viewport running outside the controller's task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    /// Slide `n` is now shown
    Advanced(usize),
}

pub trait Viewport {
    /// (Re)initialises the player; called once ready and on every
    /// transition change.
    fn configure(&mut self, transition: Transition, images: &[ImageRecord]);

    /// Moves to the next slide and returns its index, or `None` when
    /// playback is over.
    fn advance(&mut self) -> Option<usize>;
}

/// In-process viewport that walks the images in order.
///
/// Re-initialising keeps the current position so a transition change does
/// not replay the first slides.
#[derive(Debug, Clone)]
pub struct LoopingViewport {
    settings: ViewportSettings,
    transition: Option<Transition>,
    len: usize,
    index: usize,
    initializations: usize,
}

impl LoopingViewport {
    pub fn new(settings: ViewportSettings) -> Self {
        Self {
            settings,
            transition: None,
            len: 0,
            index: 0,
            initializations: 0,
        }
    }

    pub fn settings(&self) -> &ViewportSettings {
        &self.settings
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// How many times the player was rebuilt
    pub fn initializations(&self) -> usize {
        self.initializations
    }
}

impl Default for LoopingViewport {
    fn default() -> Self {
        Self::new(ViewportSettings::default())
    }
}

impl Viewport for LoopingViewport {
    fn configure(&mut self, transition: Transition, images: &[ImageRecord]) {
        if self.transition != Some(transition) || self.len != images.len() {
            self.initializations += 1;
            tracing::debug!(
                "Viewport initialised with {} ({} slides)",
                transition,
                images.len()
            );
        }
        self.transition = Some(transition);
        self.len = images.len();
        if self.len > 0 {
            self.index %= self.len;
        } else {
            self.index = 0;
        }
    }

    fn advance(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        if self.index + 1 >= self.len && !self.settings.looping {
            return None;
        }
        self.index = (self.index + 1) % self.len;
        Some(self.index)
    }
}
