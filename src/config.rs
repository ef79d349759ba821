//! Configuration loading and management

use std::time::Duration;

use anyhow::{Context, Result};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Delays and bounds for the capture sequence
    pub timing: CaptureTiming,
}

/// Tuning delays for the capture sequence.
///
/// The settle delays are empirical: none of them guarantees the
/// foreground application's copy handler has run. Treat them as knobs,
/// not invariants.
#[derive(Debug, Clone, Copy)]
pub struct CaptureTiming {
    /// Upper bound on waiting for all hotkey keys to come up
    pub release_timeout: Duration,
    /// Pause after the release barrier and after the soft release
    pub settle: Duration,
    /// Pause after requesting focus restoration
    pub focus_settle: Duration,
    /// Pause between sending Ctrl+C and reading the clipboard
    pub copy_settle: Duration,
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self {
            release_timeout: Duration::from_secs(2),
            settle: Duration::from_millis(100),
            focus_settle: Duration::from_millis(150),
            copy_settle: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let defaults = CaptureTiming::default();
        let timing = CaptureTiming {
            release_timeout: env_ms("TEXTGRAB_RELEASE_TIMEOUT_MS", defaults.release_timeout)?,
            settle: env_ms("TEXTGRAB_SETTLE_MS", defaults.settle)?,
            focus_settle: env_ms("TEXTGRAB_FOCUS_SETTLE_MS", defaults.focus_settle)?,
            copy_settle: env_ms("TEXTGRAB_COPY_SETTLE_MS", defaults.copy_settle)?,
        };

        Ok(Self { timing })
    }
}

fn env_ms(name: &str, default: Duration) -> Result<Duration> {
    match std::env::var(name) {
        Ok(value) => {
            let ms: u64 = value
                .parse()
                .with_context(|| format!("invalid millisecond value in {name}"))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(default),
    }
}
