//! Permission gate
//!
//! Queries the platform-granted capabilities the overlay depends on and
//! caches the answers in shared state. The platform dialogs themselves
//! are opaque: `request` only launches the grant flow, it never waits
//! for an answer. A missing permission silently disables the dependent
//! action rather than failing it.

use crate::app_state::AppState;
use anyhow::Result;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Platform-granted capabilities the app depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Render windows above other applications.
    DrawOverlay,
    /// Read system app-usage statistics.
    UsageStats,
    /// Privileged administrative lock-now call.
    DeviceAdmin,
    /// The lock-capable accessibility handler is registered and active.
    AccessibilityService,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::DrawOverlay => "draw-overlay",
            Capability::UsageStats => "usage-stats",
            Capability::DeviceAdmin => "device-admin",
            Capability::AccessibilityService => "accessibility-service",
        };
        f.write_str(name)
    }
}

/// Opaque platform seam for permission checks and grant flows.
pub trait PermissionProbe: Send + Sync {
    /// Whether the capability is currently granted.
    fn check(&self, capability: Capability) -> bool;

    /// Launch the platform grant flow for the capability. Fire and
    /// forget: the user answers in an OS settings screen, and the next
    /// `check` observes the result.
    fn request(&self, capability: Capability) -> Result<()>;
}

/// Probe with a fixed grant set. Used by the CLI harness and tests.
#[derive(Debug, Default)]
pub struct StaticProbe {
    granted: HashSet<Capability>,
}

impl StaticProbe {
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn allow_all() -> Self {
        Self::default()
            .with(Capability::DrawOverlay)
            .with(Capability::UsageStats)
            .with(Capability::DeviceAdmin)
            .with(Capability::AccessibilityService)
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.granted.insert(capability);
        self
    }
}

impl PermissionProbe for StaticProbe {
    fn check(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }

    fn request(&self, capability: Capability) -> Result<()> {
        debug!("static probe: grant flow requested for {}", capability);
        Ok(())
    }
}

/// Boolean capability reporting with cached state and transition logs.
#[derive(Clone)]
pub struct PermissionGate {
    probe: Arc<dyn PermissionProbe>,
}

impl PermissionGate {
    pub fn new(probe: Arc<dyn PermissionProbe>) -> Self {
        Self { probe }
    }

    pub fn check(&self, capability: Capability) -> bool {
        self.probe.check(capability)
    }

    pub fn request(&self, capability: Capability) -> Result<()> {
        info!("requesting grant flow for {}", capability);
        self.probe.request(capability)
    }

    /// Re-check the two overlay-critical capabilities and update the
    /// cached state, logging grant/revoke transitions. Called by the
    /// permission monitor thread on a fixed interval.
    pub fn refresh(&self, state: &AppState) {
        let overlay = self.check(Capability::DrawOverlay);
        let usage = self.check(Capability::UsageStats);

        if state.has_overlay_permission() != overlay {
            if overlay {
                info!("draw-overlay permission granted");
            } else {
                warn!("draw-overlay permission was revoked while running");
            }
            state.set_overlay_permission(overlay);
        }

        if state.has_usage_permission() != usage {
            if usage {
                info!("usage-stats permission granted");
            } else {
                warn!("usage-stats permission was revoked; poller will idle until restored");
            }
            state.set_usage_permission(usage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_probe_grants() {
        let probe = StaticProbe::deny_all().with(Capability::DrawOverlay);
        assert!(probe.check(Capability::DrawOverlay));
        assert!(!probe.check(Capability::UsageStats));
    }

    #[test]
    fn test_refresh_updates_cached_state() {
        let state = AppState::default();
        let gate = PermissionGate::new(Arc::new(StaticProbe::allow_all()));
        assert!(!state.has_overlay_permission());

        gate.refresh(&state);
        assert!(state.has_overlay_permission());
        assert!(state.has_usage_permission());

        // A deny-all gate revokes the cached state again.
        let gate = PermissionGate::new(Arc::new(StaticProbe::deny_all()));
        gate.refresh(&state);
        assert!(!state.has_overlay_permission());
        assert!(!state.has_usage_permission());
    }
}
