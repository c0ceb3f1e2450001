//! Playback state and its pure step function

use crate::display_config::DisplayConfig;
use crate::transition::{Transition, TransitionMode, next_transition};
use pmodrive::ImageRecord;
use rand::Rng;

/// Notification produced while stepping through slides
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationEvent {
    /// The viewport must re-initialise with this effect
    TransitionChanged(Transition),
    /// The caption now reads this text
    CaptionChanged(String),
}

/// Everything fixed for the lifetime of a ready session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub images: Vec<ImageRecord>,
    pub mode: TransitionMode,
    pub main_title: String,
    pub fixed_caption: Option<String>,
}

impl Deck {
    pub fn new(config: &DisplayConfig, images: Vec<ImageRecord>) -> Self {
        Self {
            images,
            mode: config.transition_mode,
            main_title: config.main_title_or_default().to_string(),
            fixed_caption: config.fixed_caption().map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    /// Position in the deck, wrapped to its length
    pub index: usize,
    /// Last index reported by the viewport, before wrapping
    pub reported_index: Option<usize>,
    pub transition: Transition,
    pub caption: String,
}

impl PlaybackState {
    /// State shown as soon as a non-empty deck is ready
    pub fn initial(deck: &Deck) -> Self {
        let caption = match &deck.fixed_caption {
            Some(caption) => caption.clone(),
            None => deck
                .images
                .first()
                .map(|i| i.folder_name.clone())
                .unwrap_or_default(),
        };
        Self {
            index: 0,
            reported_index: None,
            transition: deck.mode.initial_transition(),
            caption,
        }
    }

    /// Computes the state after the viewport reports `index`.
    ///
    /// Does not mutate `self`; the returned events list what differs
    /// between `self` and the new state.
    pub fn step<R: Rng>(
        &self,
        deck: &Deck,
        index: usize,
        rng: &mut R,
    ) -> (PlaybackState, Vec<PresentationEvent>) {
        let mut next = self.clone();
        let mut events = Vec::new();
        if deck.is_empty() {
            return (next, events);
        }

        let position = index % deck.images.len();

        if let Some(transition) = next_transition(self.reported_index, index, deck.mode, rng) {
            if transition != next.transition {
                next.transition = transition;
                events.push(PresentationEvent::TransitionChanged(transition));
            }
        }

        if deck.fixed_caption.is_none() {
            let folder_name = &deck.images[position].folder_name;
            if !folder_name.is_empty() && *folder_name != next.caption {
                next.caption = folder_name.clone();
                events.push(PresentationEvent::CaptionChanged(folder_name.clone()));
            }
        }

        next.index = position;
        next.reported_index = Some(index);
        (next, events)
    }
}
