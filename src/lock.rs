//! Lock trigger
//!
//! Two mutually exclusive lock strategies, selected once per running
//! instance: a privileged administrative lock-now call, and an
//! accessibility-mediated path where the tap broadcasts a one-shot
//! "lock requested" signal that a separately spawned relay turns into a
//! system-level lock action. The broadcast carries no payload and gets
//! no acknowledgment or retry; the relay is its sole listener.

use crate::constants::NOTIFICATION_ERROR_TIMEOUT_MS;
use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

/// Privileged administrative lock API. Opaque platform seam.
pub trait AdminApi: Send + Sync {
    /// Whether the administrative capability was previously granted.
    fn is_admin_active(&self) -> bool;

    /// Lock the device immediately.
    fn lock_now(&self) -> Result<()>;
}

/// System-level global actions available to the accessibility handler.
pub trait GlobalActions: Send + Sync {
    /// Perform the global lock-screen action.
    fn lock_screen(&self) -> Result<()>;
}

/// The one-shot "lock requested" signal. No payload beyond its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRequest;

/// Sending half of the intra-process lock broadcast.
#[derive(Clone)]
pub struct LockSender {
    tx: mpsc::Sender<LockRequest>,
}

impl LockSender {
    /// Broadcast a lock request. A closed channel (relay gone) is
    /// logged and swallowed; there is no retry.
    pub fn send(&self) {
        match self.tx.send(LockRequest) {
            Ok(()) => debug!("lock request broadcast sent"),
            Err(_) => warn!("lock request dropped: no relay is listening"),
        }
    }
}

/// Receiving half of the intra-process lock broadcast.
pub struct LockReceiver {
    rx: mpsc::Receiver<LockRequest>,
}

/// Create the lock broadcast channel.
pub fn lock_channel() -> (LockSender, LockReceiver) {
    let (tx, rx) = mpsc::channel();
    (LockSender { tx }, LockReceiver { rx })
}

/// Spawn the relay thread standing in for the accessibility handler: it
/// receives lock requests and performs the global lock action. Exits
/// when every sender is dropped.
pub fn spawn_lock_relay(
    receiver: LockReceiver,
    actions: Arc<dyn GlobalActions>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("lock-relay".to_string())
        .spawn(move || {
            info!("lock relay started");
            while receiver.rx.recv().is_ok() {
                info!("lock request received; performing global lock action");
                if let Err(e) = actions.lock_screen() {
                    error!("global lock action failed: {:#}", e);
                }
            }
            debug!("lock relay shutting down: all senders dropped");
        })
        .expect("Failed to spawn lock relay thread")
}

/// Administrative lock attempt. A tap without the granted capability is
/// a no-op apart from the log line; when `notify_on_denied` is set the
/// denial is additionally surfaced as a desktop notification.
pub fn perform_admin_lock(admin: &dyn AdminApi, notify_on_denied: bool) {
    if admin.is_admin_active() {
        info!("administrative lock-now invoked");
        if let Err(e) = admin.lock_now() {
            error!("administrative lock failed: {:#}", e);
        }
    } else {
        warn!("lock tap ignored: administrative capability not granted");
        if notify_on_denied {
            let _ = notify_rust::Notification::new()
                .summary("FloatLock - Lock Unavailable")
                .body("The device-admin capability is not granted.\nEnable it in system settings to lock from the button.")
                .timeout(notify_rust::Timeout::Milliseconds(
                    NOTIFICATION_ERROR_TIMEOUT_MS,
                ))
                .show();
        }
    }
}

/// What a tap on the button does. Lock strategies are selected at
/// app-variant level; never both in one running instance.
pub enum TapAction {
    /// Privileged lock-now call, gated on the admin capability.
    AdminLock {
        admin: Arc<dyn AdminApi>,
        notify_on_denied: bool,
    },
    /// Broadcast a lock request to the accessibility relay.
    BroadcastLock(LockSender),
    /// Appearance-feedback variant: flash the button fully opaque.
    Flash,
}

/// Admin implementation that only logs, for headless harness runs.
#[derive(Debug, Default)]
pub struct LogOnlyAdmin;

impl AdminApi for LogOnlyAdmin {
    fn is_admin_active(&self) -> bool {
        true
    }

    fn lock_now(&self) -> Result<()> {
        info!("(harness) lock-now");
        Ok(())
    }
}

/// Global-actions implementation that only logs, for headless harness runs.
#[derive(Debug, Default)]
pub struct LogOnlyActions;

impl GlobalActions for LogOnlyActions {
    fn lock_screen(&self) -> Result<()> {
        info!("(harness) global lock-screen action");
        Ok(())
    }
}
