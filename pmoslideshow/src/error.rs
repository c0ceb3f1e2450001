//! Error types for the presentation layer

use crate::controller::Phase;

/// Result type alias for presentation operations
pub type Result<T> = std::result::Result<T, SlideshowError>;

/// Errors surfaced by the presentation controller and its collaborators
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SlideshowError {
    /// The configuration store is unreachable or holds a malformed record
    #[error("Configuration unavailable: {0}")]
    ConfigUnavailable(String),

    /// The image source could not produce a list
    #[error("Images unavailable: {0}")]
    ImagesUnavailable(String),

    /// An event arrived in a phase that does not accept it
    #[error("Event '{event}' is not valid in phase {phase:?}")]
    InvalidTransition { phase: Phase, event: &'static str },

    /// Unknown transition or transition mode identifier
    #[error("Unknown transition: {0}")]
    UnknownTransition(String),
}

impl SlideshowError {
    pub fn config_unavailable(msg: impl ToString) -> Self {
        Self::ConfigUnavailable(msg.to_string())
    }

    /// Whether the invoker may retry by starting a new load
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConfigUnavailable(_) | Self::ImagesUnavailable(_)
        )
    }
}

impl From<pmodrive::DriveError> for SlideshowError {
    fn from(err: pmodrive::DriveError) -> Self {
        SlideshowError::ImagesUnavailable(err.to_string())
    }
}
