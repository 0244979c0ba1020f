//! Platform window seam
//!
//! The overlay controller drives a [`WindowBackend`] instead of a real
//! window manager, so the core stays independent of any host windowing
//! system. All calls happen on the thread that owns the controller.

use super::WindowPosition;
use anyhow::Result;
use log::debug;

/// Initial geometry handed to the backend when the window is attached.
#[derive(Debug, Clone, Copy)]
pub struct WindowFrame {
    pub position: WindowPosition,
    pub size_px: u32,
}

/// Operations the platform window layer must provide.
///
/// `set_color` and `set_label` have no-op defaults: variants whose
/// window has no tint or counter text simply ignore those fields.
pub trait WindowBackend {
    fn attach(&mut self, frame: WindowFrame) -> Result<()>;
    fn detach(&mut self) -> Result<()>;
    fn move_to(&mut self, position: WindowPosition) -> Result<()>;
    fn set_size(&mut self, size_px: u32) -> Result<()>;
    fn set_alpha(&mut self, alpha: f32) -> Result<()>;

    fn set_color(&mut self, _argb: u32) -> Result<()> {
        Ok(())
    }

    fn set_label(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Windowless backend that records every applied value and logs the
/// operations. Used by the CLI harness and by tests.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    attached: bool,
    attach_count: u32,
    detach_count: u32,
    position: WindowPosition,
    size_px: u32,
    alpha: f32,
    color: Option<u32>,
    label: String,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attach_count(&self) -> u32 {
        self.attach_count
    }

    pub fn detach_count(&self) -> u32 {
        self.detach_count
    }

    pub fn position(&self) -> WindowPosition {
        self.position
    }

    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn color(&self) -> Option<u32> {
        self.color
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn ensure_attached(&self) -> Result<()> {
        if !self.attached {
            anyhow::bail!("window is not attached");
        }
        Ok(())
    }
}

impl WindowBackend for HeadlessBackend {
    fn attach(&mut self, frame: WindowFrame) -> Result<()> {
        if self.attached {
            anyhow::bail!("window is already attached");
        }
        self.attached = true;
        self.attach_count += 1;
        self.position = frame.position;
        self.size_px = frame.size_px;
        debug!(
            "headless: attach {}px at ({}, {})",
            frame.size_px, frame.position.x, frame.position.y
        );
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        self.ensure_attached()?;
        self.attached = false;
        self.detach_count += 1;
        debug!("headless: detach");
        Ok(())
    }

    fn move_to(&mut self, position: WindowPosition) -> Result<()> {
        self.ensure_attached()?;
        self.position = position;
        debug!("headless: move to ({}, {})", position.x, position.y);
        Ok(())
    }

    fn set_size(&mut self, size_px: u32) -> Result<()> {
        self.ensure_attached()?;
        self.size_px = size_px;
        debug!("headless: size {}px", size_px);
        Ok(())
    }

    fn set_alpha(&mut self, alpha: f32) -> Result<()> {
        self.ensure_attached()?;
        self.alpha = alpha;
        debug!("headless: alpha {:.2}", alpha);
        Ok(())
    }

    fn set_color(&mut self, argb: u32) -> Result<()> {
        self.ensure_attached()?;
        self.color = Some(argb);
        debug!("headless: color {:#010x}", argb);
        Ok(())
    }

    fn set_label(&mut self, text: &str) -> Result<()> {
        self.ensure_attached()?;
        self.label = text.to_string();
        Ok(())
    }
}
