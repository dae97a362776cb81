//! Capture and runtime configuration.
//!
//! User preferences (delay, mirror, grid) are not part of this file;
//! they live in the settings store and survive between sessions.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for camera capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index.
    pub device_id: u32,
    /// Requested frame width in pixels.
    pub width: u32,
    /// Requested frame height in pixels.
    pub height: u32,
    /// Target frames per second.
    pub fps: u32,
    /// Request an audio track alongside video.
    pub audio: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
            audio: false,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Capture rate outside 1-120 fps.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// Driver rate outside 1-240 ticks per second.
    #[error("invalid tick rate (must be 1-240 ticks per second)")]
    InvalidTickRate,
    /// Delay text that is not a number in range.
    #[error("invalid delay: {0}")]
    InvalidDelay(String),
    /// Grid line count that is not a number in range.
    #[error("invalid grid line count: {0}")]
    InvalidGridLines(String),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Camera settings.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Delay pipeline settings.
    #[serde(default)]
    pub delay: DelayConfig,
    /// Output area settings.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Exporter settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Delay pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Extra age beyond the target delay after which a unit is dropped.
    pub grace_ms: u64,
    /// Driver loop ticks per second.
    pub tick_rate: u32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            grace_ms: 2000,
            tick_rate: 60,
        }
    }
}

impl DelayConfig {
    /// Grace period as a duration.
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// Interval between driver ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 || self.tick_rate > 240 {
            return Err(ConfigError::InvalidTickRate);
        }
        Ok(())
    }
}

/// Output area configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width of the area the delayed view is fitted into.
    pub container_width: u32,
    /// Height of the area the delayed view is fitted into.
    pub container_height: u32,
    /// Device is held in landscape orientation.
    pub landscape: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            container_width: 1280,
            container_height: 720,
            landscape: false,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { metrics_port: 9090 }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        config.delay.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert!(DelayConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [delay]
            grace_ms = 1500
            tick_rate = 30

            [display]
            container_width = 800
            container_height = 600
            landscape = true
            "#,
        )
        .unwrap();

        assert_eq!(config.delay.grace(), Duration::from_millis(1500));
        assert_eq!(config.display.container_width, 800);
        assert!(config.display.landscape);
        assert_eq!(config.capture.width, 640);
        assert_eq!(config.output.metrics_port, 9090);
    }

    #[test]
    fn test_partial_sections_fill_missing_keys() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            width = 1280
            height = 720

            [delay]
            grace_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.width, 1280);
        assert_eq!(config.capture.fps, 30);
        assert!(!config.capture.audio);
        assert_eq!(config.delay.grace(), Duration::from_millis(500));
        assert_eq!(config.delay.tick_rate, 60);
    }

    #[test]
    fn test_invalid_tick_rate_rejected() {
        let result = FileConfig::from_toml("[delay]\ngrace_ms = 2000\ntick_rate = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidTickRate)));
    }

    #[test]
    fn test_tick_interval() {
        let delay = DelayConfig {
            grace_ms: 2000,
            tick_rate: 50,
        };
        assert_eq!(delay.tick_interval(), Duration::from_millis(20));
    }
}
