//! Persistence of the display record
//!
//! [`ConfigStore`] is the seam between the controller and wherever the
//! administrator's settings live. The provided implementation keeps the
//! record in the `pmoconfig` YAML file under `settings.config`, next to
//! the viewport timings.

use crate::display_config::DisplayConfig;
use crate::error::{Result, SlideshowError};
use async_trait::async_trait;

/// Path of the display record inside the configuration tree
pub const DISPLAY_CONFIG_PATH: [&str; 2] = ["settings", "config"];

/// Where the display record lives.
///
/// ```rust
/// use pmoslideshow::{ConfigStore, DisplayConfig};
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = pmoconfig::Config::load_config(dir.path().to_str().unwrap()).unwrap();
///
/// # tokio_test::block_on(async {
/// let saved = config
///     .save_display_config(&DisplayConfig {
///         folder_id: "https://drive.example.com/folders/ABC123?usp=sharing".into(),
///         ..Default::default()
///     })
///     .await
///     .unwrap();
/// assert_eq!(saved.folder_id, "ABC123");
/// # });
/// ```
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads the record; `Ok(None)` when nothing was ever saved.
    async fn load_display_config(&self) -> Result<Option<DisplayConfig>>;

    /// Normalises the folder reference and persists the record.
    /// Returns what was stored.
    async fn save_display_config(&self, config: &DisplayConfig) -> Result<DisplayConfig>;
}

#[cfg(feature = "pmoconfig")]
pub use self::yaml::DisplayConfigExt;

#[cfg(feature = "pmoconfig")]
mod yaml {
    use super::*;
    use crate::viewport::{DEFAULT_AUTOPLAY_DELAY_MS, DEFAULT_SPEED_MS, ViewportSettings};
    use pmoconfig::Config;
    use serde_yaml::Value;
    use std::time::Duration;

    /// Display settings stored in `pmoconfig`
    pub trait DisplayConfigExt {
        fn get_display_config(&self) -> anyhow::Result<Option<DisplayConfig>>;

        fn set_display_config(&self, config: &DisplayConfig) -> anyhow::Result<DisplayConfig>;

        fn get_viewport_settings(&self) -> anyhow::Result<ViewportSettings>;
    }

    impl DisplayConfigExt for Config {
        fn get_display_config(&self) -> anyhow::Result<Option<DisplayConfig>> {
            self.get_section(&DISPLAY_CONFIG_PATH)
        }

        fn set_display_config(&self, config: &DisplayConfig) -> anyhow::Result<DisplayConfig> {
            let normalized = config.normalized();
            self.set_section(&DISPLAY_CONFIG_PATH, &normalized)?;
            tracing::info!("Display configuration saved (folder {})", normalized.folder_id);
            Ok(normalized)
        }

        fn get_viewport_settings(&self) -> anyhow::Result<ViewportSettings> {
            let delay = self
                .get_u64(&["viewport", "autoplay_delay_ms"])
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_AUTOPLAY_DELAY_MS);
            let speed = self
                .get_u64(&["viewport", "speed_ms"])
                .unwrap_or(DEFAULT_SPEED_MS);
            let looping = match self.get_value(&["viewport", "loop"]) {
                Ok(Value::Bool(b)) => b,
                _ => true,
            };
            Ok(ViewportSettings {
                autoplay_delay: Duration::from_millis(delay),
                speed: Duration::from_millis(speed),
                looping,
            })
        }
    }

    #[async_trait]
    impl ConfigStore for Config {
        async fn load_display_config(&self) -> Result<Option<DisplayConfig>> {
            self.get_display_config()
                .map_err(SlideshowError::config_unavailable)
        }

        async fn save_display_config(&self, config: &DisplayConfig) -> Result<DisplayConfig> {
            self.set_display_config(config)
                .map_err(SlideshowError::config_unavailable)
        }
    }

}
