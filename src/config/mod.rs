use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::popup::PopupConfig;

/// Application settings
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Delay between starting an anchor scroll and moving focus to the
    /// anchor, in milliseconds
    pub scroll_settle_ms: u64,

    /// Whether anchor CTAs use an animated scroll
    pub smooth_scroll: bool,

    /// Enable mouse capture in the demo host
    pub mouse_enabled: bool,

    /// Frame interval of the demo host event loop, in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scroll_settle_ms: 350,
            smooth_scroll: true,
            mouse_enabled: true,
            tick_rate_ms: 33,
        }
    }
}

impl Settings {
    /// Initialize settings from defaults, an optional JSON config file
    /// and environment variable overrides (in that order).
    pub async fn init(config_path: Option<PathBuf>) -> Result<Self> {
        debug!("Initializing settings");

        let mut settings = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                settings = Self::load_from_file(&path).await?;
                debug!(path = %path.display(), "Loaded settings file");
            }
        }

        settings.load_from_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Default config file location under the user config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("popkit").join("config.json"))
    }

    async fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply `POPKIT_*` environment variable overrides.
    fn load_from_env(&mut self) {
        if let Ok(value) = std::env::var("POPKIT_SCROLL_SETTLE") {
            match humantime::parse_duration(&value) {
                Ok(duration) => self.scroll_settle_ms = duration.as_millis() as u64,
                Err(e) => warn!(value = %value, "Invalid POPKIT_SCROLL_SETTLE: {}", e),
            }
        }

        if let Ok(value) = std::env::var("POPKIT_SMOOTH_SCROLL") {
            self.smooth_scroll = matches!(value.as_str(), "1" | "true" | "yes");
        }

        if let Ok(value) = std::env::var("POPKIT_MOUSE") {
            self.mouse_enabled = matches!(value.as_str(), "1" | "true" | "yes");
        }

        if let Ok(value) = std::env::var("POPKIT_TICK_RATE") {
            match humantime::parse_duration(&value) {
                Ok(duration) => self.tick_rate_ms = duration.as_millis() as u64,
                Err(e) => warn!(value = %value, "Invalid POPKIT_TICK_RATE: {}", e),
            }
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_ms == 0 {
            anyhow::bail!("tick_rate_ms must be greater than zero");
        }
        if self.scroll_settle_ms > 10_000 {
            warn!(
                scroll_settle_ms = self.scroll_settle_ms,
                "Unusually long scroll settle delay"
            );
        }
        Ok(())
    }

    /// The popup controller configuration these settings describe.
    pub fn popup_config(&self) -> PopupConfig {
        PopupConfig::default()
            .with_scroll_settle(Duration::from_millis(self.scroll_settle_ms))
            .with_smooth_scroll(self.smooth_scroll)
    }

    /// Frame interval of the demo host event loop.
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}
