// Library interface for FloatLock
// This allows tests and the CLI harness to access the crate's functionality

pub mod app_state;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod lock;
pub mod overlay;
pub mod permissions;
pub mod settings;
pub mod usage;

use anyhow::Result;
use app_state::AppState;
use constants::{
    FLASH_DURATION_MS, OPACITY_CEILING, PERMISSION_CHECK_INTERVAL_SECS, POLL_INTERVAL_DEFAULT_MS,
    USAGE_LOOKBACK_DEFAULT_MS,
};
use lock::TapAction;
use log::{info, warn};
use overlay::backend::WindowBackend;
use overlay::touch::{DragOutcome, DragState, PointerEvent};
use overlay::{OverlayController, OverlayConfig};
use permissions::PermissionGate;
use settings::StartRequest;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use usage::{ForegroundTracker, OpacityPolicy, UsageSource};

/// Core FloatLock functionality shared between the CLI harness and any
/// platform host
///
/// Owns the overlay controller, the drag state machine, the tap action
/// and the poller lifecycle. Touch events and window operations must
/// come in on the thread that owns this value (the UI thread); the
/// poller runs on its own thread and hands results back through
/// [`AppState`], which [`FloatLockCore::pump`] drains before touching
/// the window.
pub struct FloatLockCore<B: WindowBackend> {
    pub state: AppState,
    controller: OverlayController<B>,
    drag: DragState,
    tap_action: TapAction,
    gate: PermissionGate,
    usage_source: Arc<dyn UsageSource>,
    policy: Arc<OpacityPolicy>,
    excluded_launchers: Vec<String>,
    poll_interval: Duration,
    lookback: Duration,
}

impl<B: WindowBackend> FloatLockCore<B> {
    /// Create a new core instance around a window backend.
    pub fn new(
        backend: B,
        density: f32,
        config: OverlayConfig,
        tap_action: TapAction,
        gate: PermissionGate,
        usage_source: Arc<dyn UsageSource>,
        policy: OpacityPolicy,
    ) -> Self {
        let state = AppState::new(config);
        // Seed the cached permission state before anything consults it.
        gate.refresh(&state);

        Self {
            state,
            controller: OverlayController::new(backend, density),
            drag: DragState::new(),
            tap_action,
            gate,
            usage_source,
            policy: Arc::new(policy),
            excluded_launchers: usage::default_excluded_launchers(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_DEFAULT_MS),
            lookback: Duration::from_millis(USAGE_LOOKBACK_DEFAULT_MS),
        }
    }

    /// Set the foreground-app poll period in milliseconds.
    pub fn set_poll_interval(&mut self, interval_ms: Option<u64>) {
        if let Some(interval_ms) = interval_ms {
            self.poll_interval = Duration::from_millis(interval_ms);
            info!("poll interval set to {} ms", interval_ms);
        }
    }

    /// Set the usage-stats trailing window in milliseconds.
    pub fn set_usage_lookback(&mut self, lookback_ms: Option<u64>) {
        if let Some(lookback_ms) = lookback_ms {
            self.lookback = Duration::from_millis(lookback_ms);
            info!("usage lookback set to {} ms", lookback_ms);
        }
    }

    /// Replace the launcher exclusion list used by foreground detection.
    pub fn set_excluded_launchers(&mut self, excluded: Vec<String>) {
        self.excluded_launchers = excluded;
    }

    pub fn is_overlay_shown(&self) -> bool {
        self.controller.is_attached()
    }

    pub fn controller(&self) -> &OverlayController<B> {
        &self.controller
    }

    /// Show the overlay window and start the poller for its lifetime.
    /// Without the draw-overlay permission this is a logged no-op.
    pub fn show_overlay(&mut self) -> Result<()> {
        if !self.state.has_overlay_permission() {
            warn!("draw-overlay permission not granted; overlay not shown");
            return Ok(());
        }

        let was_attached = self.controller.is_attached();
        self.controller.show(self.state.config())?;

        if !was_attached && self.controller.is_attached() {
            let generation = self.state.begin_poller_session();
            self.start_poller_thread(generation);
        }
        Ok(())
    }

    /// Apply a settings start request: update the live window in place,
    /// or show a fresh one if none is attached.
    pub fn update_overlay(&mut self, request: StartRequest) -> Result<()> {
        let config = request.resolve(self.state.config());
        self.state.set_config(config);

        if self.controller.is_attached() {
            self.controller.update(config)
        } else {
            self.show_overlay()
        }
    }

    /// Remove the overlay window and cancel its poller. The poller must
    /// not outlive the window.
    pub fn dismiss_overlay(&mut self) -> Result<()> {
        self.state.cancel_poller();
        self.controller.dismiss()
    }

    /// Feed one raw pointer event from the platform into the drag state
    /// machine. Must be called on the UI thread.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        match self.drag.handle(event, self.controller.position()) {
            DragOutcome::None => Ok(()),
            DragOutcome::Moved(position) => self.controller.move_to(position),
            DragOutcome::Tap => self.perform_tap(),
        }
    }

    fn perform_tap(&mut self) -> Result<()> {
        match &self.tap_action {
            TapAction::AdminLock {
                admin,
                notify_on_denied,
            } => {
                lock::perform_admin_lock(admin.as_ref(), *notify_on_denied);
                Ok(())
            }
            TapAction::BroadcastLock(sender) => {
                sender.send();
                Ok(())
            }
            TapAction::Flash => {
                self.state
                    .begin_flash(Duration::from_millis(FLASH_DURATION_MS));
                self.controller.set_alpha(OPACITY_CEILING)
            }
        }
    }

    /// Drain poller results and expired flashes into the window. Must
    /// be called periodically on the UI thread; this is the only place
    /// cross-thread results touch view state.
    pub fn pump(&mut self) -> Result<()> {
        if let Some(alpha) = self.state.take_pending_view_alpha() {
            self.controller.set_alpha(alpha)?;
        }
        if let Some(saved_alpha) = self.state.take_expired_flash(Instant::now()) {
            self.controller.set_alpha(saved_alpha)?;
        }
        self.controller.set_counter(self.state.tick_count())?;
        Ok(())
    }

    /// Background thread polling the foreground app on a fixed period.
    /// Exits when its session is superseded, whether by a dismiss or by
    /// a newer window; re-showing within one poll interval must not
    /// leave two pollers running.
    fn start_poller_thread(&self, generation: u64) {
        let state = self.state.clone();
        let source = self.usage_source.clone();
        let policy = self.policy.clone();
        let interval = self.poll_interval;
        let lookback_ms = self.lookback.as_millis() as i64;
        let excluded = self.excluded_launchers.clone();

        thread::Builder::new()
            .name("foreground-poller".to_string())
            .spawn(move || {
                info!(
                    "foreground-app poller started ({} ms period, {} ms lookback)",
                    interval.as_millis(),
                    lookback_ms
                );
                let mut tracker = ForegroundTracker::new(excluded);
                loop {
                    thread::sleep(interval);
                    if state.is_poller_cancelled(generation) {
                        info!("foreground-app poller stopped");
                        break;
                    }
                    usage::poll_tick(
                        &state,
                        source.as_ref(),
                        &mut tracker,
                        &policy,
                        lookback_ms,
                        epoch_ms(),
                    );
                }
            })
            .expect("Failed to spawn poller thread");
    }

    /// Background thread re-checking platform permissions and updating
    /// the cached state. Permission loss never stops anything; the
    /// dependent actions just idle until it is restored.
    pub fn start_permission_monitor(&self) {
        let state = self.state.clone();
        let gate = self.gate.clone();

        thread::Builder::new()
            .name("permission-monitor".to_string())
            .spawn(move || {
                info!(
                    "permission monitor started - checking every {} seconds",
                    PERMISSION_CHECK_INTERVAL_SECS
                );
                loop {
                    thread::sleep(Duration::from_secs(PERMISSION_CHECK_INTERVAL_SECS));
                    gate.refresh(&state);
                }
            })
            .expect("Failed to spawn permission monitor thread");
    }
}

fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
