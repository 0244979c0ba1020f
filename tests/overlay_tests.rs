// End-to-end behavior of the core against the headless window backend:
// drag vs tap classification, lock dispatch, the flash variant, and the
// permission-gated show path.

use anyhow::Result;
use floatlock::lock::{lock_channel, spawn_lock_relay, AdminApi, GlobalActions, TapAction};
use floatlock::overlay::backend::HeadlessBackend;
use floatlock::overlay::touch::PointerEvent;
use floatlock::overlay::{ButtonColor, OverlayConfig};
use floatlock::permissions::{Capability, PermissionGate, StaticProbe};
use floatlock::settings::StartRequest;
use floatlock::usage::{OpacityPolicy, StaticUsageSource};
use floatlock::FloatLockCore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct RecordingAdmin {
    active: bool,
    locks: Mutex<u32>,
}

impl AdminApi for RecordingAdmin {
    fn is_admin_active(&self) -> bool {
        self.active
    }

    fn lock_now(&self) -> Result<()> {
        *self.locks.lock() += 1;
        Ok(())
    }
}

fn core_with(tap_action: TapAction) -> FloatLockCore<HeadlessBackend> {
    FloatLockCore::new(
        HeadlessBackend::new(),
        1.0,
        OverlayConfig::default(),
        tap_action,
        PermissionGate::new(Arc::new(StaticProbe::allow_all())),
        Arc::new(StaticUsageSource::empty()),
        OpacityPolicy::default(),
    )
}

fn admin_core() -> (FloatLockCore<HeadlessBackend>, Arc<RecordingAdmin>) {
    let admin = Arc::new(RecordingAdmin {
        active: true,
        ..RecordingAdmin::default()
    });
    let core = core_with(TapAction::AdminLock {
        admin: admin.clone(),
        notify_on_denied: false,
    });
    (core, admin)
}

#[test]
fn test_show_without_permission_is_a_no_op() {
    let mut core = FloatLockCore::new(
        HeadlessBackend::new(),
        1.0,
        OverlayConfig::default(),
        TapAction::Flash,
        PermissionGate::new(Arc::new(StaticProbe::deny_all())),
        Arc::new(StaticUsageSource::empty()),
        OpacityPolicy::default(),
    );
    core.show_overlay().unwrap();
    assert!(!core.is_overlay_shown());
}

#[test]
fn test_tap_with_small_movement_locks() {
    let (mut core, admin) = admin_core();
    core.show_overlay().unwrap();

    core.handle_pointer(PointerEvent::Down { x: 10.0, y: 10.0 }).unwrap();
    core.handle_pointer(PointerEvent::Move { x: 13.0, y: 12.0 }).unwrap();
    core.handle_pointer(PointerEvent::Up).unwrap();

    assert_eq!(*admin.locks.lock(), 1, "net (3,2)px is a tap");
    // Below the threshold the window must not have moved.
    assert_eq!(core.controller().position().x, 100);
    assert_eq!(core.controller().position().y, 100);
}

#[test]
fn test_drag_moves_window_and_suppresses_lock() {
    let (mut core, admin) = admin_core();
    core.show_overlay().unwrap();

    core.handle_pointer(PointerEvent::Down { x: 10.0, y: 10.0 }).unwrap();
    core.handle_pointer(PointerEvent::Move { x: 16.0, y: 10.0 }).unwrap();
    core.handle_pointer(PointerEvent::Up).unwrap();

    assert_eq!(*admin.locks.lock(), 0, "net (6,0)px is a drag, not a tap");
    let pos = core.controller().backend().position();
    assert_eq!((pos.x, pos.y), (106, 100));
}

#[test]
fn test_denied_admin_tap_is_silent() {
    let admin = Arc::new(RecordingAdmin::default()); // capability not granted
    let mut core = core_with(TapAction::AdminLock {
        admin: admin.clone(),
        notify_on_denied: false,
    });
    core.show_overlay().unwrap();

    core.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 }).unwrap();
    core.handle_pointer(PointerEvent::Up).unwrap();
    assert_eq!(*admin.locks.lock(), 0);
    assert!(core.is_overlay_shown(), "denied tap changes nothing else");
}

#[derive(Default)]
struct CountingActions {
    locks: Mutex<u32>,
}

impl GlobalActions for CountingActions {
    fn lock_screen(&self) -> Result<()> {
        *self.locks.lock() += 1;
        Ok(())
    }
}

#[test]
fn test_broadcast_tap_reaches_relay() {
    let (sender, receiver) = lock_channel();
    let actions = Arc::new(CountingActions::default());
    spawn_lock_relay(receiver, actions.clone());

    let mut core = core_with(TapAction::BroadcastLock(sender));
    core.show_overlay().unwrap();
    core.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 }).unwrap();
    core.handle_pointer(PointerEvent::Up).unwrap();

    // The broadcast is asynchronous with no acknowledgment; give the
    // relay a moment to run.
    thread::sleep(Duration::from_millis(200));
    assert_eq!(*actions.locks.lock(), 1);
}

#[test]
fn test_flash_variant_raises_then_reverts_opacity() {
    let mut core = core_with(TapAction::Flash);
    core.show_overlay().unwrap();
    assert_eq!(core.controller().backend().alpha(), 0.25);

    core.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 }).unwrap();
    core.handle_pointer(PointerEvent::Up).unwrap();
    assert_eq!(core.controller().backend().alpha(), 1.0);

    // The flash holds for 2 seconds before reverting.
    thread::sleep(Duration::from_millis(2100));
    core.pump().unwrap();
    assert_eq!(core.controller().backend().alpha(), 0.25);
}

#[test]
fn test_update_overlay_applies_start_request() {
    let (mut core, _admin) = admin_core();
    core.show_overlay().unwrap();

    core.update_overlay(StartRequest {
        size_dp: Some(64),
        alpha: Some(0.5),
        color_argb: Some(ButtonColor::Orange.argb()),
    })
    .unwrap();

    let backend = core.controller().backend();
    assert_eq!(backend.size_px(), 64);
    assert_eq!(backend.alpha(), 0.5);
    assert_eq!(backend.color(), Some(ButtonColor::Orange.argb()));
    assert_eq!(backend.attach_count(), 1, "updated in place, not recreated");
}

#[test]
fn test_update_overlay_shows_when_nothing_attached() {
    let (mut core, _admin) = admin_core();
    core.update_overlay(StartRequest::default()).unwrap();
    assert!(core.is_overlay_shown());
}

#[test]
fn test_stale_session_state_does_not_leak_into_next_window() {
    let (mut core, _admin) = admin_core();
    core.show_overlay().unwrap();
    // Mid-session residue, as the poller and a tap would leave behind.
    core.state.queue_alpha(0.3);
    core.state.begin_flash(Duration::from_millis(0));
    core.dismiss_overlay().unwrap();

    core.update_overlay(StartRequest {
        alpha: Some(0.9),
        ..StartRequest::default()
    })
    .unwrap();
    core.pump().unwrap();

    assert_eq!(
        core.controller().backend().alpha(),
        0.9,
        "opacity queued by the dead session must not apply to the new window"
    );
    assert!(!core.state.is_flash_active());
}

#[test]
fn test_dismiss_then_show_again() {
    let (mut core, _admin) = admin_core();
    core.show_overlay().unwrap();
    core.dismiss_overlay().unwrap();
    assert!(!core.is_overlay_shown());

    // Dismissing again is recoverable, and a fresh show works.
    core.dismiss_overlay().unwrap();
    core.show_overlay().unwrap();
    assert!(core.is_overlay_shown());
    assert_eq!(core.controller().backend().attach_count(), 2);
}

#[test]
fn test_permission_capabilities_per_variant() {
    let gate = PermissionGate::new(Arc::new(
        StaticProbe::deny_all()
            .with(Capability::DrawOverlay)
            .with(Capability::UsageStats),
    ));
    assert!(gate.check(Capability::DrawOverlay));
    assert!(!gate.check(Capability::DeviceAdmin));
    assert!(!gate.check(Capability::AccessibilityService));
}
