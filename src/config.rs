//! Configuration parsing for FloatLock
//!
//! This module handles parsing of environment variables that can
//! optionally override settings from the config file. The primary
//! configuration sources are the CLI flags and the config.toml file
//! (see config_file module).
//!
//! Environment variables (all optional):
//! - FLOATLOCK_POLL_INTERVAL_MS: Override the foreground-app poll period
//! - FLOATLOCK_LOOKBACK_MS: Override the usage-stats trailing window

use crate::constants::{
    POLL_INTERVAL_MAX_MS, POLL_INTERVAL_MIN_MS, USAGE_LOOKBACK_MAX_MS, USAGE_LOOKBACK_MIN_MS,
};
use log::{debug, info, warn};
use std::env;

/// Parse the FLOATLOCK_POLL_INTERVAL_MS environment variable
///
/// Returns Some(ms) if a valid period is configured (500-60000 ms)
/// Returns None if not set or invalid
pub fn parse_poll_interval_ms() -> Option<u64> {
    parse_bounded_ms(
        "FLOATLOCK_POLL_INTERVAL_MS",
        POLL_INTERVAL_MIN_MS,
        POLL_INTERVAL_MAX_MS,
    )
}

/// Parse the FLOATLOCK_LOOKBACK_MS environment variable
///
/// Returns Some(ms) if a valid trailing window is configured
/// (1000-300000 ms)
/// Returns None if not set or invalid
pub fn parse_usage_lookback_ms() -> Option<u64> {
    parse_bounded_ms(
        "FLOATLOCK_LOOKBACK_MS",
        USAGE_LOOKBACK_MIN_MS,
        USAGE_LOOKBACK_MAX_MS,
    )
}

fn parse_bounded_ms(var: &str, min: u64, max: u64) -> Option<u64> {
    match env::var(var) {
        Ok(val) => match val.parse::<u64>() {
            Ok(ms) if (min..=max).contains(&ms) => {
                info!("{} set via environment variable: {} ms", var, ms);
                Some(ms)
            }
            Ok(ms) => {
                warn!(
                    "Invalid {} value: {} (must be {}-{} ms). Using default.",
                    var, ms, min, max
                );
                None
            }
            Err(e) => {
                warn!("Failed to parse {}: {}. Using default.", var, e);
                None
            }
        },
        Err(_) => {
            debug!("{} not set.", var);
            None
        }
    }
}
