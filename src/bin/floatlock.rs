// FloatLock CLI - headless harness for the floating lock button core
// Drives the overlay against the logging window backend so the drag,
// poller, and lock paths can be exercised without a platform host.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use floatlock::config;
use floatlock::config_file::ConfigFile;
use floatlock::constants::PUMP_INTERVAL_MS;
use floatlock::lock::{lock_channel, spawn_lock_relay, LogOnlyActions, LogOnlyAdmin, TapAction};
use floatlock::overlay::backend::HeadlessBackend;
use floatlock::overlay::touch::PointerEvent;
use floatlock::overlay::ButtonColor;
use floatlock::permissions::{Capability, PermissionGate, StaticProbe};
use floatlock::settings::{ensure_permissions, StartRequest};
use floatlock::usage::StaticUsageSource;
use floatlock::FloatLockCore;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Which lock mechanism a tap on the button invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Privileged administrative lock-now call
    Admin,
    /// Broadcast to the accessibility lock relay
    Broadcast,
    /// Appearance feedback only: flash the button fully opaque
    Flash,
}

/// Draggable floating overlay button that locks the screen on tap
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Draggable floating overlay button that locks the screen on tap",
    long_about = "Draggable floating overlay button that locks the screen on tap.

The button floats above all other applications. Dragging it more than
5px moves it; releasing without crossing that threshold counts as a tap
and fires the selected lock variant. While the overlay is shown, a
poller watches which app is frontmost every 2 seconds and dims or
brightens the button according to the configured opacity table.

This binary runs the core against a headless, logging window backend;
wire a real WindowBackend implementation for an on-screen button.

CONFIGURATION:
  Defaults come from the optional config file:
    ~/.config/floatlock/config.toml (Linux)
  Environment overrides: FLOATLOCK_POLL_INTERVAL_MS, FLOATLOCK_LOOKBACK_MS
  Precedence: CLI flag > environment variable > config file > default"
)]
struct Args {
    /// Button size in dp (30-80)
    #[arg(long)]
    size: Option<u32>,

    /// Button opacity, 0.0-1.0
    #[arg(long)]
    alpha: Option<f32>,

    /// Button color preset
    #[arg(long)]
    color: Option<ButtonColor>,

    /// Lock mechanism invoked on tap
    #[arg(long, value_enum, default_value_t = Variant::Flash)]
    variant: Variant,

    /// Foreground-app poll period in milliseconds (500-60000)
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Usage-stats trailing window in milliseconds (1000-300000)
    #[arg(long)]
    lookback_ms: Option<u64>,

    /// Package reported as frontmost by the harness usage source
    #[arg(long)]
    foreground: Option<String>,

    /// Simulate a tap on the button after this many seconds
    #[arg(long)]
    tap_after_secs: Option<u64>,

    /// Dismiss the overlay and exit after this many seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Load configuration from a specific file instead of the default path
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting FloatLock");

    let cfg = match &args.config {
        Some(path) => ConfigFile::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConfigFile::load().context("Failed to load configuration")?,
    };

    // The harness has no OS permission dialogs; grant everything.
    let gate = PermissionGate::new(Arc::new(StaticProbe::allow_all()));

    let required = match args.variant {
        Variant::Admin => vec![
            Capability::DrawOverlay,
            Capability::UsageStats,
            Capability::DeviceAdmin,
        ],
        Variant::Broadcast => vec![
            Capability::DrawOverlay,
            Capability::UsageStats,
            Capability::AccessibilityService,
        ],
        Variant::Flash => vec![Capability::DrawOverlay, Capability::UsageStats],
    };
    if !ensure_permissions(&gate, &required) {
        warn!("required permissions missing; grant them and start again");
        return Ok(());
    }

    let tap_action = match args.variant {
        Variant::Admin => TapAction::AdminLock {
            admin: Arc::new(LogOnlyAdmin),
            notify_on_denied: cfg.behavior.notify_on_denied_lock,
        },
        Variant::Broadcast => {
            let (sender, receiver) = lock_channel();
            spawn_lock_relay(receiver, Arc::new(LogOnlyActions));
            TapAction::BroadcastLock(sender)
        }
        Variant::Flash => TapAction::Flash,
    };

    let usage_source = match &args.foreground {
        Some(package) => StaticUsageSource::pinned(package.clone()),
        None => StaticUsageSource::empty(),
    };

    let mut core = FloatLockCore::new(
        HeadlessBackend::new(),
        1.0,
        cfg.overlay_config(),
        tap_action,
        gate,
        Arc::new(usage_source),
        cfg.opacity_policy(),
    );
    core.set_excluded_launchers(cfg.poller.excluded_launchers.clone());

    // Precedence: CLI flag > environment variable > config file default.
    core.set_poll_interval(
        args.poll_interval_ms
            .or_else(config::parse_poll_interval_ms)
            .or(Some(cfg.poller.interval_ms)),
    );
    core.set_usage_lookback(
        args.lookback_ms
            .or_else(config::parse_usage_lookback_ms)
            .or(Some(cfg.poller.lookback_ms)),
    );

    core.update_overlay(StartRequest {
        size_dp: args.size,
        alpha: args.alpha,
        color_argb: args.color.map(ButtonColor::argb),
    })?;
    core.start_permission_monitor();

    if !core.is_overlay_shown() {
        warn!("overlay did not attach; exiting");
        return Ok(());
    }
    info!("FloatLock is running - press Ctrl+C to quit");

    let started = Instant::now();
    let mut tap_pending = args.tap_after_secs.map(Duration::from_secs);

    loop {
        thread::sleep(Duration::from_millis(PUMP_INTERVAL_MS));
        core.pump()?;

        if let Some(delay) = tap_pending {
            if started.elapsed() >= delay {
                info!("simulating a tap on the button");
                core.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 })?;
                core.handle_pointer(PointerEvent::Up)?;
                tap_pending = None;
            }
        }

        if let Some(secs) = args.duration_secs {
            if started.elapsed() >= Duration::from_secs(secs) {
                info!("run duration elapsed; dismissing overlay");
                core.dismiss_overlay()?;
                break;
            }
        }
    }

    info!("FloatLock shutdown complete");
    Ok(())
}
