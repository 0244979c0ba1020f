use crate::overlay::OverlayConfig;
use crate::usage::ForegroundAppSample;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Application state shared across modules
///
/// All mutable fields the poller and UI paths both observe live here,
/// behind one mutex. The poller thread writes results into this state;
/// the UI thread drains them via the `pending_view_alpha` /
/// `expired flash` accessors before touching the window, so view
/// mutations stay serialized on the UI thread.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppStateInner>>,
}

pub struct AppStateInner {
    /// Current button appearance (settings facade writes, controller reads)
    pub config: OverlayConfig,
    /// Baseline opacity the poller adjusts from, tick over tick
    pub baseline_alpha: f32,
    /// Opacity queued by the poller, waiting for the UI thread to apply
    pub pending_view_alpha: Option<f32>,
    /// Active tap-feedback flash, if any
    pub flash: Option<FlashState>,
    /// Latest foreground-app sample; only the newest is retained
    pub current_app: Option<ForegroundAppSample>,
    /// Ticks elapsed since the overlay was shown (button counter label)
    pub tick_count: u64,
    /// Poller session id, bumped on cancel and on every fresh window.
    /// A poller thread exits once the id it captured at spawn no longer
    /// matches, so a stale thread can never serve a newer window.
    pub poller_generation: u64,
    /// Cached draw-overlay permission state (updated by monitor thread)
    pub has_overlay_permission: bool,
    /// Cached usage-stats permission state (updated by monitor thread)
    pub has_usage_permission: bool,
}

/// Temporary full-opacity flash triggered by a tap in the
/// appearance-feedback variant.
#[derive(Debug, Clone, Copy)]
pub struct FlashState {
    /// Opacity to restore when the flash expires
    pub saved_alpha: f32,
    pub until: Instant,
}

impl AppState {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppStateInner {
                config,
                baseline_alpha: config.alpha,
                pending_view_alpha: None,
                flash: None,
                current_app: None,
                tick_count: 0,
                poller_generation: 0,
                has_overlay_permission: false,
                has_usage_permission: false,
            })),
        }
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, AppStateInner> {
        self.inner.lock()
    }

    pub fn config(&self) -> OverlayConfig {
        self.inner.lock().config
    }

    pub fn set_config(&self, config: OverlayConfig) {
        let mut state = self.inner.lock();
        state.config = config;
        state.baseline_alpha = config.alpha;
    }

    pub fn baseline_alpha(&self) -> f32 {
        self.inner.lock().baseline_alpha
    }

    /// Record a poller-computed opacity as the new baseline and queue it
    /// for the UI thread to apply to the window.
    pub fn queue_alpha(&self, alpha: f32) {
        let mut state = self.inner.lock();
        state.baseline_alpha = alpha;
        state.pending_view_alpha = Some(alpha);
    }

    /// Drain the queued opacity, if any. Called on the UI thread.
    pub fn take_pending_view_alpha(&self) -> Option<f32> {
        self.inner.lock().pending_view_alpha.take()
    }

    /// Start the tap-feedback flash: remember the current baseline and
    /// hold full opacity until `duration` elapses. A tap during an
    /// active flash extends the deadline but keeps the original saved
    /// opacity.
    pub fn begin_flash(&self, duration: Duration) {
        let mut state = self.inner.lock();
        let saved_alpha = match state.flash {
            Some(flash) => flash.saved_alpha,
            None => state.baseline_alpha,
        };
        state.flash = Some(FlashState {
            saved_alpha,
            until: Instant::now() + duration,
        });
    }

    pub fn is_flash_active(&self) -> bool {
        self.inner.lock().flash.is_some()
    }

    /// If the flash deadline has passed, clear it and return the opacity
    /// to restore. Called on the UI thread.
    pub fn take_expired_flash(&self, now: Instant) -> Option<f32> {
        let mut state = self.inner.lock();
        match state.flash {
            Some(flash) if now >= flash.until => {
                state.flash = None;
                state.baseline_alpha = flash.saved_alpha;
                Some(flash.saved_alpha)
            }
            _ => None,
        }
    }

    pub fn current_app(&self) -> Option<ForegroundAppSample> {
        self.inner.lock().current_app.clone()
    }

    pub fn set_current_app(&self, sample: ForegroundAppSample) {
        self.inner.lock().current_app = Some(sample);
    }

    pub fn bump_tick(&self) -> u64 {
        let mut state = self.inner.lock();
        state.tick_count += 1;
        state.tick_count
    }

    pub fn tick_count(&self) -> u64 {
        self.inner.lock().tick_count
    }

    /// Invalidate the running poller and drop the cross-thread residue
    /// it queued. The window is gone; its pending opacity and flash die
    /// with it.
    pub fn cancel_poller(&self) {
        let mut state = self.inner.lock();
        state.poller_generation += 1;
        state.pending_view_alpha = None;
        state.flash = None;
    }

    /// Whether the poller session identified by `generation` has been
    /// superseded. Checked by the poller thread on every wakeup.
    pub fn is_poller_cancelled(&self, generation: u64) -> bool {
        self.inner.lock().poller_generation != generation
    }

    /// Open a poller session for a fresh overlay window and return its
    /// id. Any earlier session stays invalidated; the tick counter
    /// starts over.
    pub fn begin_poller_session(&self) -> u64 {
        let mut state = self.inner.lock();
        state.poller_generation += 1;
        state.tick_count = 0;
        state.poller_generation
    }

    pub fn has_overlay_permission(&self) -> bool {
        self.inner.lock().has_overlay_permission
    }

    pub fn set_overlay_permission(&self, granted: bool) {
        self.inner.lock().has_overlay_permission = granted;
    }

    pub fn has_usage_permission(&self) -> bool {
        self.inner.lock().has_usage_permission
    }

    pub fn set_usage_permission(&self, granted: bool) {
        self.inner.lock().has_usage_permission = granted;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}
