//! Foreground-app detection and the opacity policy
//!
//! Every poll tick the platform is asked for app-usage records over a
//! trailing lookback window; the record with the newest last-used
//! timestamp wins, launchers excluded. The winning package is mapped
//! through a fixed opacity table and the resulting opacity is queued for
//! the UI thread. An empty or failed query (permission revoked mid-run)
//! means "foreground app unchanged, no opacity update this tick" - the
//! poller itself never stops for it.

use crate::app_state::AppState;
use crate::constants::{
    DEFAULT_BRIGHTEN_PACKAGES, DEFAULT_DIM_PACKAGES, EXCLUDED_LAUNCHERS, OPACITY_CEILING,
    OPACITY_FLOOR, OPACITY_STEP,
};
use anyhow::Result;
use log::{debug, warn};
use std::collections::HashMap;

/// One app-usage record as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub package: String,
    /// Timestamp the app was last used, epoch milliseconds.
    pub last_used_ms: i64,
}

impl UsageRecord {
    pub fn new(package: impl Into<String>, last_used_ms: i64) -> Self {
        Self {
            package: package.into(),
            last_used_ms,
        }
    }
}

/// Opaque platform seam for usage statistics. Queries may involve
/// I/O-like system calls, so they run off the UI thread.
pub trait UsageSource: Send + Sync {
    fn query(&self, begin_ms: i64, end_ms: i64) -> Result<Vec<UsageRecord>>;
}

/// Source pinned to a fixed frontmost package (or nothing). Used by the
/// CLI harness and tests; the record timestamp always equals the query
/// end so the pinned package wins every tick.
#[derive(Debug, Default)]
pub struct StaticUsageSource {
    package: Option<String>,
}

impl StaticUsageSource {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn pinned(package: impl Into<String>) -> Self {
        Self {
            package: Some(package.into()),
        }
    }
}

impl UsageSource for StaticUsageSource {
    fn query(&self, _begin_ms: i64, end_ms: i64) -> Result<Vec<UsageRecord>> {
        Ok(self
            .package
            .iter()
            .map(|p| UsageRecord::new(p.clone(), end_ms))
            .collect())
    }
}

/// Latest detected foreground app. Only the newest sample is retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundAppSample {
    pub package: String,
    /// When the foreground app last changed, epoch milliseconds.
    pub timestamp_ms: i64,
}

/// Keeps the retained foreground-app sample up to date from raw usage
/// records, excluding launcher packages.
#[derive(Debug)]
pub struct ForegroundTracker {
    current: Option<ForegroundAppSample>,
    excluded: Vec<String>,
}

impl ForegroundTracker {
    pub fn new(excluded: Vec<String>) -> Self {
        Self {
            current: None,
            excluded,
        }
    }

    pub fn current(&self) -> Option<&ForegroundAppSample> {
        self.current.as_ref()
    }

    /// Fold one tick's records in. The record with the maximum
    /// last-used timestamp wins; the change timestamp only advances when
    /// the winner differs from the retained sample.
    pub fn observe(&mut self, records: &[UsageRecord], now_ms: i64) -> Option<&ForegroundAppSample> {
        let winner = records
            .iter()
            .filter(|r| !self.excluded.iter().any(|e| e == &r.package))
            .max_by_key(|r| r.last_used_ms)
            .map(|r| r.package.as_str());

        if let Some(package) = winner {
            let changed = self
                .current
                .as_ref()
                .map(|c| c.package != package)
                .unwrap_or(true);
            if changed {
                debug!("foreground app changed to {}", package);
                self.current = Some(ForegroundAppSample {
                    package: package.to_string(),
                    timestamp_ms: now_ms,
                });
            }
        }
        self.current.as_ref()
    }
}

/// Per-tick opacity adjustment for a foreground package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpacityAction {
    /// Decrease opacity by one step, floored.
    Dim,
    /// Increase opacity by one step, capped.
    Brighten,
    /// Leave opacity alone.
    Hold,
}

/// Fixed package-to-adjustment table with step/floor/ceiling bounds.
#[derive(Debug, Clone)]
pub struct OpacityPolicy {
    rules: HashMap<String, OpacityAction>,
    step: f32,
    floor: f32,
    ceiling: f32,
}

impl OpacityPolicy {
    pub fn new(step: f32, floor: f32, ceiling: f32) -> Self {
        Self {
            rules: HashMap::new(),
            step,
            floor,
            ceiling,
        }
    }

    pub fn with_rule(mut self, package: impl Into<String>, action: OpacityAction) -> Self {
        self.rules.insert(package.into(), action);
        self
    }

    /// Build a policy from dim/brighten package lists.
    pub fn from_lists(dim: &[String], brighten: &[String]) -> Self {
        let mut policy = Self::new(OPACITY_STEP, OPACITY_FLOOR, OPACITY_CEILING);
        for package in dim {
            policy.rules.insert(package.clone(), OpacityAction::Dim);
        }
        for package in brighten {
            policy.rules.insert(package.clone(), OpacityAction::Brighten);
        }
        policy
    }

    /// Opacity after one tick with `package` frontmost.
    pub fn next_alpha(&self, package: &str, current: f32) -> f32 {
        match self.rules.get(package).copied().unwrap_or(OpacityAction::Hold) {
            OpacityAction::Dim => (current - self.step).max(self.floor),
            OpacityAction::Brighten => (current + self.step).min(self.ceiling),
            OpacityAction::Hold => current,
        }
    }
}

impl Default for OpacityPolicy {
    /// The original fixed table: one mail app dims the button, the
    /// X/Twitter family brightens it, everything else holds.
    fn default() -> Self {
        let dim: Vec<String> = DEFAULT_DIM_PACKAGES.iter().map(|s| s.to_string()).collect();
        let brighten: Vec<String> = DEFAULT_BRIGHTEN_PACKAGES
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::from_lists(&dim, &brighten)
    }
}

/// Default launcher exclusion list as owned strings.
pub fn default_excluded_launchers() -> Vec<String> {
    EXCLUDED_LAUNCHERS.iter().map(|s| s.to_string()).collect()
}

/// One poll tick. Runs on the poller thread; everything it does to
/// shared state goes through `AppState`, and the actual view mutation is
/// queued for the UI thread rather than performed here.
pub fn poll_tick(
    state: &AppState,
    source: &dyn UsageSource,
    tracker: &mut ForegroundTracker,
    policy: &OpacityPolicy,
    lookback_ms: i64,
    now_ms: i64,
) {
    state.bump_tick();

    if !state.has_usage_permission() {
        debug!("usage-stats permission not granted; skipping tick");
        return;
    }

    let records = match source.query(now_ms - lookback_ms, now_ms) {
        Ok(records) => records,
        Err(e) => {
            warn!("usage-stats query failed: {:#}", e);
            return;
        }
    };
    if records.is_empty() {
        // Permission may have been revoked mid-run; treat the
        // foreground app as unchanged and leave opacity alone.
        warn!("no usage records found; permission might be missing");
        return;
    }

    let Some(sample) = tracker.observe(&records, now_ms).cloned() else {
        return;
    };

    let current = state.baseline_alpha();
    let next = policy.next_alpha(&sample.package, current);
    state.set_current_app(sample);
    state.queue_alpha(next);
}
