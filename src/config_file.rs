//! Configuration file management
//!
//! This module handles loading the optional application config file,
//! which seeds the button appearance, the poller tuning, and the
//! opacity rule table at startup. Nothing the running core mutates is
//! ever written back; a missing file just means defaults.

use crate::constants::{
    BUTTON_ALPHA_DEFAULT, BUTTON_SIZE_DEFAULT_DP, BUTTON_SIZE_MAX_DP, BUTTON_SIZE_MIN_DP,
    POLL_INTERVAL_DEFAULT_MS, POLL_INTERVAL_MAX_MS, POLL_INTERVAL_MIN_MS,
    USAGE_LOOKBACK_DEFAULT_MS, USAGE_LOOKBACK_MAX_MS, USAGE_LOOKBACK_MIN_MS,
};
use crate::overlay::{ButtonColor, OverlayConfig};
use crate::usage::{default_excluded_launchers, OpacityPolicy};
use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration stored in config.toml
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub button: ButtonSection,
    #[serde(default)]
    pub poller: PollerSection,
    #[serde(default)]
    pub behavior: BehaviorSection,
}

/// Button appearance defaults applied at startup.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ButtonSection {
    /// Button diameter in dp (30-80, default: 48)
    pub size_dp: u32,
    /// Button opacity 0.0-1.0 (default: 0.25)
    pub alpha: f32,
    /// Button color preset (default: gray)
    pub color: ButtonColor,
}

impl Default for ButtonSection {
    fn default() -> Self {
        Self {
            size_dp: BUTTON_SIZE_DEFAULT_DP,
            alpha: BUTTON_ALPHA_DEFAULT,
            color: ButtonColor::Gray,
        }
    }
}

/// Foreground-app poller tuning and opacity rule table.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PollerSection {
    /// Poll period in milliseconds (default: 2000)
    pub interval_ms: u64,
    /// Usage-stats trailing window in milliseconds (default: 60000)
    pub lookback_ms: u64,
    /// Packages that dim the button while frontmost
    pub dim: Vec<String>,
    /// Packages that brighten the button while frontmost
    pub brighten: Vec<String>,
    /// Launcher packages excluded from foreground detection
    pub excluded_launchers: Vec<String>,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            interval_ms: POLL_INTERVAL_DEFAULT_MS,
            lookback_ms: USAGE_LOOKBACK_DEFAULT_MS,
            dim: crate::constants::DEFAULT_DIM_PACKAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            brighten: crate::constants::DEFAULT_BRIGHTEN_PACKAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_launchers: default_excluded_launchers(),
        }
    }
}

/// Behavior toggles.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BehaviorSection {
    /// Surface a desktop notification when a lock tap is denied because
    /// the admin capability is missing (default: false, matching the
    /// original silent behavior)
    #[serde(default)]
    pub notify_on_denied_lock: bool,
}

impl ConfigFile {
    /// Get the standard config file path
    ///
    /// - macOS: `~/Library/Application Support/floatlock/config.toml`
    /// - Linux: `~/.config/floatlock/config.toml`
    /// - Windows: `%APPDATA%\floatlock\config.toml`
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("floatlock");

        config_dir.join("config.toml")
    }

    /// Load config from the standard location. A missing file yields
    /// the defaults; a malformed file is an error.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path())
    }

    /// Load config from a specific path
    ///
    /// This is primarily intended for testing and advanced scenarios.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ConfigFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config.validated())
    }

    /// Clamp out-of-range values back into bounds, warning about each.
    pub fn validated(mut self) -> Self {
        if !(BUTTON_SIZE_MIN_DP..=BUTTON_SIZE_MAX_DP).contains(&self.button.size_dp) {
            warn!(
                "config: button size {}dp out of range ({}-{}); clamping",
                self.button.size_dp, BUTTON_SIZE_MIN_DP, BUTTON_SIZE_MAX_DP
            );
            self.button.size_dp = self
                .button
                .size_dp
                .clamp(BUTTON_SIZE_MIN_DP, BUTTON_SIZE_MAX_DP);
        }

        if !(0.0..=1.0).contains(&self.button.alpha) {
            warn!(
                "config: button alpha {} out of range (0.0-1.0); clamping",
                self.button.alpha
            );
            self.button.alpha = self.button.alpha.clamp(0.0, 1.0);
        }

        if !(POLL_INTERVAL_MIN_MS..=POLL_INTERVAL_MAX_MS).contains(&self.poller.interval_ms) {
            warn!(
                "config: poll interval {}ms out of range ({}-{}); using default",
                self.poller.interval_ms, POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS
            );
            self.poller.interval_ms = POLL_INTERVAL_DEFAULT_MS;
        }

        if !(USAGE_LOOKBACK_MIN_MS..=USAGE_LOOKBACK_MAX_MS).contains(&self.poller.lookback_ms) {
            warn!(
                "config: usage lookback {}ms out of range ({}-{}); using default",
                self.poller.lookback_ms, USAGE_LOOKBACK_MIN_MS, USAGE_LOOKBACK_MAX_MS
            );
            self.poller.lookback_ms = USAGE_LOOKBACK_DEFAULT_MS;
        }

        self
    }

    /// Button appearance seeded from this config.
    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            size_dp: self.button.size_dp,
            alpha: self.button.alpha,
            color: self.button.color,
        }
    }

    /// Opacity rule table seeded from this config.
    pub fn opacity_policy(&self) -> OpacityPolicy {
        OpacityPolicy::from_lists(&self.poller.dim, &self.poller.brighten)
    }
}
