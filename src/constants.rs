//! Centralized constants for FloatLock
//!
//! This module contains all configurable numerical values used throughout
//! the application. Each constant includes documentation on its purpose,
//! unit, and recommended value range.

// ============================================================================
// BUTTON GEOMETRY
// ============================================================================

/// Minimum button size allowed.
/// Unit: density-independent pixels (dp)
/// Range: Fixed minimum, do not change without updating settings validation
pub const BUTTON_SIZE_MIN_DP: u32 = 30;

/// Maximum button size allowed.
/// Unit: density-independent pixels (dp)
/// Range: Fixed maximum, do not change without updating settings validation
pub const BUTTON_SIZE_MAX_DP: u32 = 80;

/// Default button size when no config exists.
/// Unit: density-independent pixels (dp)
/// Recommended range: 40-60
pub const BUTTON_SIZE_DEFAULT_DP: u32 = 48;

/// Default button opacity when no config exists.
/// Unit: alpha fraction (0.0 = invisible, 1.0 = opaque)
/// Recommended range: 0.2-1.0
pub const BUTTON_ALPHA_DEFAULT: f32 = 0.25;

/// Initial overlay window X position, top-left gravity.
/// Unit: screen pixels from the top-left corner
pub const WINDOW_START_X: i32 = 100;

/// Initial overlay window Y position, top-left gravity.
/// Unit: screen pixels from the top-left corner
pub const WINDOW_START_Y: i32 = 100;

// ============================================================================
// TOUCH HANDLING
// ============================================================================

/// Pointer displacement past which a touch sequence counts as a drag
/// rather than a tap. Deltas at or below this value on both axes keep
/// the sequence a tap.
/// Unit: screen pixels
/// Range: Fixed, matches the original button feel
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// How long the tap feedback flash holds the button fully opaque
/// before reverting to the baseline opacity.
/// Unit: milliseconds
pub const FLASH_DURATION_MS: u64 = 2000;

// ============================================================================
// FOREGROUND-APP POLLER
// ============================================================================

/// Fixed poll period for foreground-app detection.
/// Unit: milliseconds
/// Recommended range: 1000-5000 (lower = more responsive, higher = less CPU)
pub const POLL_INTERVAL_DEFAULT_MS: u64 = 2000;

/// Minimum accepted poll period override.
/// Unit: milliseconds
pub const POLL_INTERVAL_MIN_MS: u64 = 500;

/// Maximum accepted poll period override.
/// Unit: milliseconds
pub const POLL_INTERVAL_MAX_MS: u64 = 60_000;

/// Default trailing window for usage-stats queries. The original app
/// variants used both 10s and 60s; this is tunable, not a contract.
/// Unit: milliseconds
pub const USAGE_LOOKBACK_DEFAULT_MS: u64 = 60_000;

/// Minimum accepted usage lookback override.
/// Unit: milliseconds
pub const USAGE_LOOKBACK_MIN_MS: u64 = 1_000;

/// Maximum accepted usage lookback override.
/// Unit: milliseconds
pub const USAGE_LOOKBACK_MAX_MS: u64 = 300_000;

/// Per-tick opacity adjustment applied while a mapped app stays frontmost.
/// Unit: alpha fraction per tick
pub const OPACITY_STEP: f32 = 0.2;

/// Lowest opacity the poller will dim the button down to.
/// Unit: alpha fraction
pub const OPACITY_FLOOR: f32 = 0.1;

/// Highest opacity the poller will raise the button up to.
/// Unit: alpha fraction
pub const OPACITY_CEILING: f32 = 1.0;

/// Launcher packages excluded from foreground-app detection; the launcher
/// is always "recently used" and would otherwise mask the real app.
pub const EXCLUDED_LAUNCHERS: &[&str] = &["com.google.android.apps.nexuslauncher"];

/// Packages that dim the button by OPACITY_STEP per tick while frontmost.
pub const DEFAULT_DIM_PACKAGES: &[&str] = &["com.google.android.gm"];

/// Packages that brighten the button by OPACITY_STEP per tick while frontmost.
pub const DEFAULT_BRIGHTEN_PACKAGES: &[&str] = &[
    "com.twitter.android",
    "com.twitter.android.lite",
    "com.x.android",
];

// ============================================================================
// POLLING & THREAD INTERVALS
// ============================================================================

/// Permission check interval for the monitor thread.
/// Unit: seconds
/// Recommended range: 5-60 (infrequent check, permission rarely changes)
pub const PERMISSION_CHECK_INTERVAL_SECS: u64 = 15;

/// UI pump interval used by the CLI harness run loop.
/// Unit: milliseconds
/// Recommended range: 50-500 (must stay well below FLASH_DURATION_MS)
pub const PUMP_INTERVAL_MS: u64 = 100;

// ============================================================================
// NOTIFICATION TIMEOUTS
// ============================================================================

/// Denied-lock notification display duration.
/// Unit: milliseconds
/// Recommended range: 4000-10000 (errors need more attention)
pub const NOTIFICATION_ERROR_TIMEOUT_MS: u32 = 5000;
