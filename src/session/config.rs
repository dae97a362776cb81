//! Live session preferences.

use super::settings::{
    SettingsStore, DELAY_KEY, GRID_COUNT_KEY, GRID_ENABLED_KEY, MIRROR_ENABLED_KEY,
};
use crate::capture::ConfigError;
use crate::present::{PresentOptions, MAX_GRID_LINES};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Longest delay accepted from user input.
pub const MAX_DELAY: Duration = Duration::from_secs(60);

/// User-adjustable settings read by the driver loop each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// How far behind live the view runs.
    pub target_delay: Duration,
    /// Flip the view horizontally.
    pub mirror_enabled: bool,
    /// Draw the positioning grid.
    pub grid_enabled: bool,
    /// Grid lines per axis, kept while the grid is hidden.
    pub grid_line_count: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_delay: Duration::from_secs(2),
            mirror_enabled: false,
            grid_enabled: false,
            grid_line_count: 2,
        }
    }
}

/// Parses a delay given in seconds.
pub fn parse_delay_seconds(text: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = text
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidDelay(format!("not a number: {text:?}")))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::InvalidDelay(format!("must be >= 0: {secs}")));
    }
    let delay = Duration::from_secs_f64(secs);
    if delay > MAX_DELAY {
        return Err(ConfigError::InvalidDelay(format!(
            "must be at most {}s",
            MAX_DELAY.as_secs()
        )));
    }
    Ok(delay)
}

/// Parses a grid line count typed by the user.
pub fn parse_grid_lines(text: &str) -> Result<u32, ConfigError> {
    let count: u32 = text
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidGridLines(format!("not a count: {text:?}")))?;
    if count > MAX_GRID_LINES {
        return Err(ConfigError::InvalidGridLines(format!(
            "must be at most {MAX_GRID_LINES}"
        )));
    }
    Ok(count)
}

/// Parses a stored grid line count. Negative counts mean no lines.
fn parse_grid_count(text: &str) -> Option<u32> {
    let count: i64 = text.trim().parse().ok()?;
    Some(count.clamp(0, MAX_GRID_LINES as i64) as u32)
}

fn parse_flag(text: &str) -> bool {
    text.trim() == "true"
}

impl SessionConfig {
    /// Loads stored preferences, keeping defaults for missing or
    /// malformed entries.
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Self {
        let mut config = Self::default();

        if let Some(value) = store.get(DELAY_KEY) {
            match parse_delay_seconds(&value) {
                Ok(delay) => config.target_delay = delay,
                Err(e) => tracing::debug!(error = %e, "Ignoring stored delay"),
            }
        }
        if let Some(count) = store.get(GRID_COUNT_KEY).as_deref().and_then(parse_grid_count) {
            config.grid_line_count = count;
        }
        if let Some(value) = store.get(GRID_ENABLED_KEY) {
            config.grid_enabled = parse_flag(&value);
        }
        if let Some(value) = store.get(MIRROR_ENABLED_KEY) {
            config.mirror_enabled = parse_flag(&value);
        }

        config
    }

    /// Writes all preferences to `store`.
    pub fn persist<S: SettingsStore + ?Sized>(&self, store: &mut S) {
        store.set(DELAY_KEY, &self.target_delay.as_secs_f64().to_string());
        store.set(GRID_COUNT_KEY, &self.grid_line_count.to_string());
        store.set(GRID_ENABLED_KEY, &self.grid_enabled.to_string());
        store.set(MIRROR_ENABLED_KEY, &self.mirror_enabled.to_string());
    }

    /// Presentation flags for this snapshot.
    pub fn present_options(&self) -> PresentOptions {
        PresentOptions {
            mirror: self.mirror_enabled,
            grid_lines: if self.grid_enabled {
                self.grid_line_count
            } else {
                0
            },
        }
    }
}

/// Handle to the config shared between the driver loop and controls.
///
/// The loop takes one snapshot per tick, so a change made between ticks
/// is seen whole and never mid-computation.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<SessionConfig>>,
}

impl SharedConfig {
    /// Shares `config` between the loop and the controls.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copies the current config.
    pub fn snapshot(&self) -> SessionConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies `f` to the config under the write lock.
    pub fn update<F: FnOnce(&mut SessionConfig)>(&self, f: F) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    /// Replaces the whole config.
    pub fn replace(&self, config: SessionConfig) {
        self.update(|c| *c = config);
    }
}
