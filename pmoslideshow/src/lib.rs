//! # pmoslideshow - Presentation layer for PMOSlides
//!
//! Turns a flat image list produced by `pmodrive` into a running slideshow:
//! the display record chosen by the administrator, a controller that
//! tracks the session lifecycle, and a policy that picks the visual
//! transition between slides.
//!
//! ## Components
//!
//! - [`DisplayConfig`]: folder, titles and transition mode
//! - [`ConfigStore`]: where the display record lives (`pmoconfig` by default)
//! - [`PresentationController`]: `Idle -> Loading -> Ready | Empty`
//! - [`PlaybackState`]: index, active transition and caption, stepped purely
//! - [`Viewport`]: the component showing the slides
//! - [`session`]: glue running a load cycle and autoplay
//!
//! ## Example
//!
//! ```rust,no_run
//! use pmodrive::{DriveClient, FolderAggregator};
//! use pmoslideshow::{LoopingViewport, PresentationController, session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = pmoconfig::get_config();
//!     let source = FolderAggregator::new(Arc::new(DriveClient::from_config()?));
//!
//!     let mut controller = PresentationController::new();
//!     session::load_session(&mut controller, config.as_ref(), &source).await?;
//!
//!     let settings = Default::default();
//!     let mut viewport = LoopingViewport::new(settings);
//!     session::play(&mut controller, &mut viewport, &settings, 20, |index, _| {
//!         println!("slide {}", index);
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod display_config;
pub mod error;
pub mod session;
pub mod state;
pub mod store;
pub mod transition;
pub mod viewport;

pub use controller::{Phase, PresentationController};
pub use display_config::{DEFAULT_MAIN_TITLE, DisplayConfig, normalize_folder_id};
pub use error::{Result, SlideshowError};
pub use session::ImageSource;
pub use state::{Deck, PlaybackState, PresentationEvent};
#[cfg(feature = "pmoconfig")]
pub use store::DisplayConfigExt;
pub use store::{ConfigStore, DISPLAY_CONFIG_PATH};
pub use transition::{ROTATION, ROTATION_INTERVAL, Transition, TransitionMode, next_transition};
pub use viewport::{LoopingViewport, Viewport, ViewportEvent, ViewportInput, ViewportSettings};
