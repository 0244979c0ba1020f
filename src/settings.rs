//! Settings facade
//!
//! The bridge between user-facing controls (permission toggles,
//! size/opacity/color sliders) and the core. Start requests carry the
//! same three parameters the settings screen has always sent to the
//! overlay (`BUTTON_SIZE`, `BUTTON_ALPHA`, `BUTTON_COLOR`); out-of-range
//! values are clamped with a warning and unknown packed colors are
//! ignored rather than rejected.

use crate::constants::{BUTTON_SIZE_MAX_DP, BUTTON_SIZE_MIN_DP};
use crate::overlay::{ButtonColor, OverlayConfig};
use crate::permissions::{Capability, PermissionGate};
use log::warn;

/// Parameters of an overlay start/update request. Unset fields keep
/// their current values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartRequest {
    /// BUTTON_SIZE: button diameter in dp
    pub size_dp: Option<u32>,
    /// BUTTON_ALPHA: opacity fraction 0.0-1.0
    pub alpha: Option<f32>,
    /// BUTTON_COLOR: packed ARGB color
    pub color_argb: Option<u32>,
}

impl StartRequest {
    /// Resolve against the current config, clamping and ignoring as
    /// needed.
    pub fn resolve(self, current: OverlayConfig) -> OverlayConfig {
        let size_dp = match self.size_dp {
            Some(size) => clamp_size_dp(size),
            None => current.size_dp,
        };
        let alpha = match self.alpha {
            Some(alpha) => clamp_alpha(alpha),
            None => current.alpha,
        };
        let color = match self.color_argb {
            Some(packed) => match ButtonColor::from_argb(packed) {
                Some(color) => color,
                None => {
                    warn!(
                        "unknown BUTTON_COLOR value {:#010x}; keeping {}",
                        packed, current.color
                    );
                    current.color
                }
            },
            None => current.color,
        };

        OverlayConfig {
            size_dp,
            alpha,
            color,
        }
    }
}

/// Clamp a slider size value into the supported dp range.
pub fn clamp_size_dp(size_dp: u32) -> u32 {
    if !(BUTTON_SIZE_MIN_DP..=BUTTON_SIZE_MAX_DP).contains(&size_dp) {
        warn!(
            "BUTTON_SIZE {}dp out of range ({}-{}); clamping",
            size_dp, BUTTON_SIZE_MIN_DP, BUTTON_SIZE_MAX_DP
        );
    }
    size_dp.clamp(BUTTON_SIZE_MIN_DP, BUTTON_SIZE_MAX_DP)
}

/// Clamp a slider opacity value into 0.0-1.0.
pub fn clamp_alpha(alpha: f32) -> f32 {
    if !(0.0..=1.0).contains(&alpha) {
        warn!("BUTTON_ALPHA {} out of range (0.0-1.0); clamping", alpha);
    }
    alpha.clamp(0.0, 1.0)
}

/// Check the capabilities the current variant needs, launching the
/// grant flow for each missing one. Returns true when everything is
/// already granted; the overlay only starts in that case, matching the
/// settings screen gating its start button on the toggles.
pub fn ensure_permissions(gate: &PermissionGate, required: &[Capability]) -> bool {
    let mut all_granted = true;
    for &capability in required {
        if !gate.check(capability) {
            warn!("{} not granted", capability);
            if let Err(e) = gate.request(capability) {
                warn!("failed to launch grant flow for {}: {:#}", capability, e);
            }
            all_granted = false;
        }
    }
    all_granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::StaticProbe;
    use std::sync::Arc;

    #[test]
    fn test_resolve_clamps_ranges() {
        let config = StartRequest {
            size_dp: Some(500),
            alpha: Some(-0.3),
            color_argb: None,
        }
        .resolve(OverlayConfig::default());
        assert_eq!(config.size_dp, 80);
        assert_eq!(config.alpha, 0.0);
        assert_eq!(config.color, ButtonColor::Gray);
    }

    #[test]
    fn test_resolve_keeps_unset_fields() {
        let current = OverlayConfig {
            size_dp: 60,
            alpha: 0.4,
            color: ButtonColor::Orange,
        };
        let config = StartRequest {
            alpha: Some(0.9),
            ..StartRequest::default()
        }
        .resolve(current);
        assert_eq!(config.size_dp, 60);
        assert_eq!(config.alpha, 0.9);
        assert_eq!(config.color, ButtonColor::Orange);
    }

    #[test]
    fn test_resolve_accepts_known_packed_color() {
        let config = StartRequest {
            color_argb: Some(ButtonColor::Teal.argb()),
            ..StartRequest::default()
        }
        .resolve(OverlayConfig::default());
        assert_eq!(config.color, ButtonColor::Teal);
    }

    #[test]
    fn test_resolve_ignores_unknown_packed_color() {
        let config = StartRequest {
            color_argb: Some(0x1234_5678),
            ..StartRequest::default()
        }
        .resolve(OverlayConfig::default());
        assert_eq!(config.color, ButtonColor::Gray, "unsupported field ignored");
    }

    #[test]
    fn test_ensure_permissions() {
        let gate = PermissionGate::new(Arc::new(
            StaticProbe::deny_all().with(Capability::DrawOverlay),
        ));
        assert!(ensure_permissions(&gate, &[Capability::DrawOverlay]));
        assert!(!ensure_permissions(
            &gate,
            &[Capability::DrawOverlay, Capability::UsageStats]
        ));
    }
}
