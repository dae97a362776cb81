//! Camera input and frame handling.
//!
//! This module provides the capture adapter: a device provider that
//! hands out live sources, the frames they produce, and the runtime
//! configuration file.

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod native;

pub use camera::{
    CaptureDevice, CaptureError, LiveSource, MediaConstraints, MockDevice, MockSource, Resolution,
};
pub use config::{CaptureConfig, ConfigError, DelayConfig, DisplayConfig, FileConfig, OutputConfig};
pub use frame::{Frame, PixelFormat};
#[cfg(feature = "camera")]
pub use native::{NokhwaDevice, NokhwaSource};
