// Foreground-app poller behavior: opacity progression, failure modes,
// the cross-thread handoff into the window, and cancellation on dismiss.

use anyhow::Result;
use floatlock::app_state::AppState;
use floatlock::lock::TapAction;
use floatlock::overlay::backend::HeadlessBackend;
use floatlock::overlay::OverlayConfig;
use floatlock::permissions::{PermissionGate, StaticProbe};
use floatlock::usage::{
    poll_tick, ForegroundTracker, OpacityAction, OpacityPolicy, StaticUsageSource, UsageRecord,
    UsageSource,
};
use floatlock::FloatLockCore;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn dim_policy() -> OpacityPolicy {
    OpacityPolicy::new(0.2, 0.1, 1.0).with_rule("mail.app", OpacityAction::Dim)
}

fn state_with_alpha(alpha: f32) -> AppState {
    let state = AppState::new(OverlayConfig {
        alpha,
        ..OverlayConfig::default()
    });
    state.set_usage_permission(true);
    state
}

#[test]
fn test_spec_scenario_three_ticks_to_floor() {
    // size=48, alpha=0.25; the "decrease" app stays frontmost for 3
    // ticks; resulting alpha = max(0.1, 0.25 - 0.6) = 0.1.
    let state = state_with_alpha(0.25);
    let source = StaticUsageSource::pinned("mail.app");
    let mut tracker = ForegroundTracker::new(vec![]);
    let policy = dim_policy();

    let mut alphas = Vec::new();
    for tick in 1..=3 {
        poll_tick(&state, &source, &mut tracker, &policy, 60_000, tick * 2000);
        alphas.push(state.baseline_alpha());
    }

    assert_eq!(*alphas.last().unwrap(), 0.1);
    for window in alphas.windows(2) {
        assert!(window[1] <= window[0], "opacity must be monotone non-increasing");
    }
}

#[test]
fn test_opacity_formula_over_n_ticks() {
    let policy = dim_policy();
    for n in 0..10 {
        let mut alpha: f32 = 0.9;
        for _ in 0..n {
            alpha = policy.next_alpha("mail.app", alpha);
        }
        let expected = (0.9 - 0.2 * n as f32).max(0.1);
        assert!(
            (alpha - expected).abs() < 1e-6,
            "after {} ticks: got {}, want {}",
            n,
            alpha,
            expected
        );
    }
}

struct FailingSource;

impl UsageSource for FailingSource {
    fn query(&self, _begin_ms: i64, _end_ms: i64) -> Result<Vec<UsageRecord>> {
        anyhow::bail!("usage service unavailable")
    }
}

#[test]
fn test_failed_query_leaves_everything_unchanged() {
    let state = state_with_alpha(0.5);
    let mut tracker = ForegroundTracker::new(vec![]);

    poll_tick(&state, &FailingSource, &mut tracker, &dim_policy(), 60_000, 2000);

    assert_eq!(state.baseline_alpha(), 0.5);
    assert!(state.take_pending_view_alpha().is_none());
    assert!(state.current_app().is_none());
}

#[test]
fn test_permission_revoked_mid_run_does_not_stop_ticking() {
    let state = state_with_alpha(0.5);
    let source = StaticUsageSource::pinned("mail.app");
    let mut tracker = ForegroundTracker::new(vec![]);
    let policy = dim_policy();

    poll_tick(&state, &source, &mut tracker, &policy, 60_000, 2000);
    assert!((state.baseline_alpha() - 0.3).abs() < 1e-6);

    // Revoked mid-run: the tick counts but nothing changes.
    state.set_usage_permission(false);
    poll_tick(&state, &source, &mut tracker, &policy, 60_000, 4000);
    assert!((state.baseline_alpha() - 0.3).abs() < 1e-6);
    assert_eq!(state.tick_count(), 2);

    // Restored: the progression resumes from where it stopped.
    state.set_usage_permission(true);
    state.take_pending_view_alpha();
    poll_tick(&state, &source, &mut tracker, &policy, 60_000, 6000);
    assert!((state.baseline_alpha() - 0.1).abs() < 1e-6);
}

struct ScriptedSource {
    records: Vec<UsageRecord>,
}

impl UsageSource for ScriptedSource {
    fn query(&self, _begin_ms: i64, _end_ms: i64) -> Result<Vec<UsageRecord>> {
        Ok(self.records.clone())
    }
}

#[test]
fn test_launcher_is_never_the_foreground_app() {
    let state = state_with_alpha(0.5);
    let source = ScriptedSource {
        records: vec![
            UsageRecord::new("launcher.app", 9000),
            UsageRecord::new("mail.app", 5000),
        ],
    };
    let mut tracker = ForegroundTracker::new(vec!["launcher.app".to_string()]);

    poll_tick(&state, &source, &mut tracker, &dim_policy(), 60_000, 10_000);
    assert_eq!(state.current_app().unwrap().package, "mail.app");
    assert!((state.baseline_alpha() - 0.3).abs() < 1e-6);
}

#[test]
fn test_poller_thread_dims_window_and_stops_on_dismiss() {
    let mut core = FloatLockCore::new(
        HeadlessBackend::new(),
        1.0,
        OverlayConfig {
            alpha: 0.9,
            ..OverlayConfig::default()
        },
        TapAction::Flash,
        PermissionGate::new(Arc::new(StaticProbe::allow_all())),
        Arc::new(StaticUsageSource::pinned("com.google.android.gm")),
        OpacityPolicy::default(),
    );
    core.set_poll_interval(Some(50));
    core.show_overlay().unwrap();

    // Let a few ticks land, then marshal them onto the "UI thread".
    thread::sleep(Duration::from_millis(400));
    core.pump().unwrap();

    let ticks_before = core.state.tick_count();
    assert!(ticks_before >= 2, "poller should have ticked");
    assert!(
        core.controller().backend().alpha() < 0.9,
        "dim app must lower the window opacity"
    );
    assert!(
        core.controller().backend().alpha() >= 0.1,
        "opacity never goes below the floor"
    );

    core.dismiss_overlay().unwrap();
    thread::sleep(Duration::from_millis(200));
    let ticks_after_dismiss = core.state.tick_count();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(
        core.state.tick_count(),
        ticks_after_dismiss,
        "poller must not outlive the window"
    );
}

#[test]
fn test_reshow_within_poll_interval_does_not_revive_old_poller() {
    let mut core = FloatLockCore::new(
        HeadlessBackend::new(),
        1.0,
        OverlayConfig::default(),
        TapAction::Flash,
        PermissionGate::new(Arc::new(StaticProbe::allow_all())),
        Arc::new(StaticUsageSource::pinned("some.app")),
        OpacityPolicy::default(),
    );
    core.set_poll_interval(Some(300));
    core.show_overlay().unwrap();
    core.dismiss_overlay().unwrap();
    // Re-show before the dismissed poller's next wakeup: the old thread
    // has not yet observed the cancellation.
    core.show_overlay().unwrap();

    thread::sleep(Duration::from_millis(1550));
    let ticks = core.state.tick_count();
    assert!(ticks >= 2, "fresh poller should be ticking, got {}", ticks);
    assert!(
        ticks <= 5,
        "only one poller may serve the window, got {} ticks",
        ticks
    );
    core.dismiss_overlay().unwrap();
}

#[test]
fn test_counter_label_tracks_ticks() {
    let mut core = FloatLockCore::new(
        HeadlessBackend::new(),
        1.0,
        OverlayConfig::default(),
        TapAction::Flash,
        PermissionGate::new(Arc::new(StaticProbe::allow_all())),
        Arc::new(StaticUsageSource::pinned("some.app")),
        OpacityPolicy::default(),
    );
    core.set_poll_interval(Some(50));
    core.show_overlay().unwrap();

    thread::sleep(Duration::from_millis(300));
    core.pump().unwrap();

    let label: u64 = core.controller().backend().label().parse().unwrap();
    assert_eq!(label, core.state.tick_count());
    assert!(label >= 1);
}
