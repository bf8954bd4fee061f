//! TOML settings with per-section defaults.
//!
//! ```toml
//! [projection]
//! clamp = 5.0
//! near = 0.5
//! far = 1.0
//!
//! [projection.basis]
//! v1 = [0.25, 0.21, ...]
//!
//! [highlight]
//! window_ms = 3000
//!
//! [poll]
//! interval_ms = 5000
//!
//! [listing]
//! per_page = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use eis_core::{
    EisPipeline, HIGHLIGHT_WINDOW_MS, ITEMS_PER_PAGE, POLL_INTERVAL_MS, ProjectionConfig,
};
use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

pub const CONFIG_ENV: &str = "EIS_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    pub window_ms: u64,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            window_ms: HIGHLIGHT_WINDOW_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub interval_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: POLL_INTERVAL_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSettings {
    pub per_page: usize,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            per_page: ITEMS_PER_PAGE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub projection: ProjectionConfig,
    pub highlight: HighlightSettings,
    pub poll: PollSettings,
    pub listing: ListingSettings,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.check()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| FeedError::Io(path.to_path_buf(), e))?;
        let settings = Self::from_toml_str(&content)?;
        tracing::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from the resolved config path, or fall back to defaults when no
    /// path is configured.
    pub fn resolve(override_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(override_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn check(&self) -> Result<()> {
        let p = &self.projection;
        if !(p.clamp.is_finite() && p.clamp > 0.0) {
            return Err(FeedError::InvalidData(format!(
                "projection.clamp must be positive, got {}",
                p.clamp
            )));
        }
        if !(p.near.is_finite() && p.far.is_finite() && 0.0 <= p.near && p.near <= p.far) {
            return Err(FeedError::InvalidData(format!(
                "projection thresholds must satisfy 0 <= near <= far, got near={} far={}",
                p.near, p.far
            )));
        }
        for (name, axis) in [("v1", &p.basis.v1), ("v2", &p.basis.v2), ("v3", &p.basis.v3)] {
            if axis.is_empty() {
                return Err(FeedError::InvalidData(format!(
                    "projection.basis.{name} is empty"
                )));
            }
        }
        if self.listing.per_page == 0 {
            return Err(FeedError::InvalidData(
                "listing.per_page must be at least 1".to_string(),
            ));
        }
        if self.poll.interval_ms == 0 {
            return Err(FeedError::InvalidData(
                "poll.interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn pipeline(&self) -> EisPipeline {
        EisPipeline::new(&self.projection)
    }

    pub fn highlight_window(&self) -> Duration {
        Duration::from_millis(self.highlight.window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }
}

/// Resolve the settings file.
/// Priority: explicit override > EIS_CONFIG env > none (defaults).
pub fn resolve_config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }
    env::var(CONFIG_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
