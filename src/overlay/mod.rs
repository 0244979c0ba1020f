//! Overlay window ownership
//!
//! The controller owns the single platform-level overlay window hosting
//! the circular button. It is the only code that talks to the
//! [`WindowBackend`], and the only owner of the window position; the drag
//! state machine mutates the position exclusively through `move_to`
//! during an active drag.
//!
//! Duplicate `show`, `update`/`dismiss` against a detached window, and
//! backend attach/detach failures are all recoverable: they are logged
//! and degrade to inaction, mirroring how the platform treats
//! add-duplicate-view and remove-detached-view errors.

pub mod backend;
pub mod touch;

use crate::constants::{
    BUTTON_ALPHA_DEFAULT, BUTTON_SIZE_DEFAULT_DP, WINDOW_START_X, WINDOW_START_Y,
};
use anyhow::Result;
use backend::{WindowBackend, WindowFrame};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Button color presets. The packed-ARGB form is the `BUTTON_COLOR`
/// wire value accepted by the settings facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    Gray,
    Teal,
    Orange,
    Black,
    White,
}

impl ButtonColor {
    /// Packed ARGB value for this preset.
    pub fn argb(self) -> u32 {
        match self {
            ButtonColor::Gray => 0xFF88_8888,
            ButtonColor::Teal => 0xFF00_8080,
            ButtonColor::Orange => 0xFFFF_A500,
            ButtonColor::Black => 0xFF00_0000,
            ButtonColor::White => 0xFFFF_FFFF,
        }
    }

    /// Map a packed ARGB value back to a preset. Unknown values yield
    /// `None`; callers ignore the field in that case.
    pub fn from_argb(packed: u32) -> Option<Self> {
        [
            ButtonColor::Gray,
            ButtonColor::Teal,
            ButtonColor::Orange,
            ButtonColor::Black,
            ButtonColor::White,
        ]
        .into_iter()
        .find(|c| c.argb() == packed)
    }
}

impl fmt::Display for ButtonColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ButtonColor::Gray => "gray",
            ButtonColor::Teal => "teal",
            ButtonColor::Orange => "orange",
            ButtonColor::Black => "black",
            ButtonColor::White => "white",
        };
        f.write_str(name)
    }
}

impl FromStr for ButtonColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(ButtonColor::Gray),
            "teal" => Ok(ButtonColor::Teal),
            "orange" => Ok(ButtonColor::Orange),
            "black" => Ok(ButtonColor::Black),
            "white" => Ok(ButtonColor::White),
            other => anyhow::bail!("unknown button color: {}", other),
        }
    }
}

/// Appearance of the overlay button. Mutated by the settings facade,
/// read by the controller on each show/update. Not persisted: lost on
/// process death.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    /// Button diameter in density-independent pixels (30-80).
    pub size_dp: u32,
    /// Button opacity, 0.0-1.0.
    pub alpha: f32,
    /// Button color preset.
    pub color: ButtonColor,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            size_dp: BUTTON_SIZE_DEFAULT_DP,
            alpha: BUTTON_ALPHA_DEFAULT,
            color: ButtonColor::Gray,
        }
    }
}

/// Screen-space top-left offset of the overlay window, gravity-anchored
/// to the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

impl WindowPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Default for WindowPosition {
    fn default() -> Self {
        Self {
            x: WINDOW_START_X,
            y: WINDOW_START_Y,
        }
    }
}

/// Owns the overlay window lifecycle. At most one window exists per
/// controller instance.
pub struct OverlayController<B: WindowBackend> {
    backend: B,
    config: OverlayConfig,
    position: WindowPosition,
    /// Screen density factor for dp-to-px conversion.
    density: f32,
    attached: bool,
}

impl<B: WindowBackend> OverlayController<B> {
    pub fn new(backend: B, density: f32) -> Self {
        Self {
            backend,
            config: OverlayConfig::default(),
            position: WindowPosition::default(),
            density,
            attached: false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn position(&self) -> WindowPosition {
        self.position
    }

    pub fn config(&self) -> OverlayConfig {
        self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn size_px(&self, size_dp: u32) -> u32 {
        (size_dp as f32 * self.density) as u32
    }

    /// Attach the overlay window. A duplicate call while a window is
    /// already attached is logged and ignored.
    pub fn show(&mut self, config: OverlayConfig) -> Result<()> {
        if self.attached {
            warn!("overlay window already attached; ignoring duplicate show");
            return Ok(());
        }

        let frame = WindowFrame {
            position: self.position,
            size_px: self.size_px(config.size_dp),
        };

        if let Err(e) = self.backend.attach(frame) {
            // Mirrors the platform throwing on a duplicate add: recoverable.
            warn!("failed to attach overlay window: {:#}", e);
            return Ok(());
        }
        self.attached = true;
        self.config = config;

        self.backend.set_alpha(config.alpha)?;
        self.backend.set_color(config.color.argb())?;
        debug!(
            "overlay shown: size={}dp alpha={:.2} color={} at ({}, {})",
            config.size_dp, config.alpha, config.color, self.position.x, self.position.y
        );
        Ok(())
    }

    /// Adjust size/opacity/color of the live window without recreating
    /// it. No-op (logged) when no window is attached.
    pub fn update(&mut self, config: OverlayConfig) -> Result<()> {
        if !self.attached {
            warn!("overlay update requested with no attached window; ignoring");
            return Ok(());
        }

        self.backend.set_size(self.size_px(config.size_dp))?;
        self.backend.set_alpha(config.alpha)?;
        self.backend.set_color(config.color.argb())?;
        self.config = config;
        debug!(
            "overlay updated: size={}dp alpha={:.2} color={}",
            config.size_dp, config.alpha, config.color
        );
        Ok(())
    }

    /// Reposition the live window. Called only by the drag state machine
    /// during an active drag.
    pub fn move_to(&mut self, position: WindowPosition) -> Result<()> {
        self.position = position;
        if self.attached {
            self.backend.move_to(position)?;
        }
        Ok(())
    }

    /// Apply a new opacity to the live window and remember it as the
    /// current config value.
    pub fn set_alpha(&mut self, alpha: f32) -> Result<()> {
        self.config.alpha = alpha;
        if self.attached {
            self.backend.set_alpha(alpha)?;
        }
        Ok(())
    }

    /// Update the tick-counter label shown inside the button.
    pub fn set_counter(&mut self, count: u64) -> Result<()> {
        if self.attached {
            self.backend.set_label(&count.to_string())?;
        }
        Ok(())
    }

    /// Remove the overlay window. Already-detached windows (including
    /// ones torn down externally by the platform) are logged and ignored.
    pub fn dismiss(&mut self) -> Result<()> {
        if !self.attached {
            debug!("overlay dismiss requested with no attached window");
            return Ok(());
        }

        if let Err(e) = self.backend.detach() {
            warn!("failed to remove overlay window (detached externally?): {:#}", e);
        }
        self.attached = false;
        debug!("overlay dismissed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::backend::HeadlessBackend;
    use super::*;

    fn controller() -> OverlayController<HeadlessBackend> {
        OverlayController::new(HeadlessBackend::new(), 1.0)
    }

    #[test]
    fn test_show_attaches_once() {
        let mut c = controller();
        c.show(OverlayConfig::default()).unwrap();
        assert!(c.is_attached());
        assert_eq!(c.backend().attach_count(), 1);

        // Duplicate show is swallowed, not fatal.
        c.show(OverlayConfig::default()).unwrap();
        assert_eq!(c.backend().attach_count(), 1);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut c = controller();
        c.show(OverlayConfig::default()).unwrap();

        let config = OverlayConfig {
            size_dp: 60,
            alpha: 0.5,
            color: ButtonColor::Teal,
        };
        c.update(config).unwrap();
        let once = (c.backend().size_px(), c.backend().alpha(), c.backend().color());
        c.update(config).unwrap();
        let twice = (c.backend().size_px(), c.backend().alpha(), c.backend().color());
        assert_eq!(once, twice, "second identical update must change nothing");
    }

    #[test]
    fn test_update_without_window_is_ignored() {
        let mut c = controller();
        c.update(OverlayConfig::default()).unwrap();
        assert!(!c.is_attached());
    }

    #[test]
    fn test_dismiss_twice_is_recoverable() {
        let mut c = controller();
        c.show(OverlayConfig::default()).unwrap();
        c.dismiss().unwrap();
        assert!(!c.is_attached());
        c.dismiss().unwrap();
        assert_eq!(c.backend().detach_count(), 1);
    }

    #[test]
    fn test_density_scales_window_size() {
        let mut c = OverlayController::new(HeadlessBackend::new(), 2.5);
        c.show(OverlayConfig::default()).unwrap();
        assert_eq!(c.backend().size_px(), 120); // 48dp * 2.5
    }

    #[test]
    fn test_color_round_trip() {
        for color in [
            ButtonColor::Gray,
            ButtonColor::Teal,
            ButtonColor::Orange,
            ButtonColor::Black,
            ButtonColor::White,
        ] {
            assert_eq!(ButtonColor::from_argb(color.argb()), Some(color));
        }
        assert_eq!(ButtonColor::from_argb(0x0012_3456), None);
    }
}
