//! Camera abstraction for live frame capture.
//!
//! Acquisition is split in two steps. Some hosts only allow playback to
//! be started synchronously from a user action, before the device has
//! been acquired, so `trigger_speculative_play` is always invoked first
//! and its failure is ignored by the caller.

use super::{CaptureConfig, Frame};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// No camera, or access was denied.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    /// The camera cannot deliver the requested tracks or format.
    #[error("no compatible capture format: {0}")]
    UnsupportedFormat(String),
    /// A frame could not be read.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    /// Playback start was refused.
    #[error("playback refused: {0}")]
    PlayRejected(String),
    /// Read from a source that was never started.
    #[error("camera not started")]
    NotStarted,
}

/// Native resolution reported by a live source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// A `width` x `height` resolution.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Tracks requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    /// Request a video track.
    pub video: bool,
    /// Request an audio track.
    pub audio: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// A running capture stream.
pub trait LiveSource {
    /// Returns the newest frame if one is available since the last call.
    fn current_frame(&mut self) -> Option<Frame>;

    /// Native resolution, or `None` until the device has reported it.
    fn native_resolution(&self) -> Option<Resolution>;

    /// Stops the stream and releases the device.
    fn stop(&mut self);
}

/// A device provider that hands out live sources.
pub trait CaptureDevice {
    /// Starts playback ahead of acquisition. Callers ignore the result.
    fn trigger_speculative_play(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    /// Acquires the device and starts streaming.
    fn acquire(&mut self, constraints: &MediaConstraints)
        -> Result<Box<dyn LiveSource>, CaptureError>;
}

/// Mock device that produces synthetic frames.
///
/// Failure modes and the resolution discovery delay can be configured so
/// the session state machine can be exercised without hardware.
#[derive(Debug, Clone)]
pub struct MockDevice {
    config: CaptureConfig,
    fail_acquire: Option<CaptureError>,
    reject_play: bool,
    resolution_after: u32,
    play_calls: Arc<AtomicU64>,
    acquire_calls: Arc<AtomicU64>,
    released: Arc<AtomicBool>,
}

impl MockDevice {
    /// Synthetic camera producing frames of the configured size.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            fail_acquire: None,
            reject_play: false,
            resolution_after: 0,
            play_calls: Arc::new(AtomicU64::new(0)),
            acquire_calls: Arc::new(AtomicU64::new(0)),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Makes every acquisition fail with `error`.
    pub fn failing(mut self, error: CaptureError) -> Self {
        self.fail_acquire = Some(error);
        self
    }

    /// Makes the speculative play call fail.
    pub fn rejecting_play(mut self) -> Self {
        self.reject_play = true;
        self
    }

    /// Reports no resolution for the first `resolution_checks` queries.
    pub fn with_resolution_delay(mut self, resolution_checks: u32) -> Self {
        self.resolution_after = resolution_checks;
        self
    }

    /// Number of speculative play calls seen.
    pub fn play_calls(&self) -> u64 {
        self.play_calls.load(Ordering::SeqCst)
    }

    /// Number of acquisitions attempted.
    pub fn acquire_calls(&self) -> u64 {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    /// True once the last acquired source has been stopped.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

impl CaptureDevice for MockDevice {
    fn trigger_speculative_play(&mut self) -> Result<(), CaptureError> {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_play {
            return Err(CaptureError::PlayRejected(
                "play() requires an active stream".into(),
            ));
        }
        Ok(())
    }

    fn acquire(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn LiveSource>, CaptureError> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_acquire {
            return Err(err.clone());
        }
        if !constraints.video {
            return Err(CaptureError::UnsupportedFormat(
                "mock device only provides video".into(),
            ));
        }
        self.config
            .validate()
            .map_err(|e| CaptureError::UnsupportedFormat(e.to_string()))?;

        self.released.store(false, Ordering::SeqCst);
        tracing::info!("MockDevice acquired with config: {:?}", self.config);
        Ok(Box::new(MockSource {
            width: self.config.width,
            height: self.config.height,
            resolution_checks: Cell::new(0),
            resolution_after: self.resolution_after,
            sequence: 0,
            released: Arc::clone(&self.released),
        }))
    }
}

/// Live source handed out by [`MockDevice`].
#[derive(Debug)]
pub struct MockSource {
    width: u32,
    height: u32,
    resolution_checks: Cell<u32>,
    resolution_after: u32,
    sequence: u64,
    released: Arc<AtomicBool>,
}

impl LiveSource for MockSource {
    fn current_frame(&mut self) -> Option<Frame> {
        if self.released.load(Ordering::SeqCst) {
            return None;
        }
        if self.resolution_checks.get() < self.resolution_after {
            return None;
        }

        // Diagonal ramp shifted by the sequence number, visibly asymmetric
        let (w, h) = (self.width as u64, self.height as u64);
        let pixels: Vec<u8> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .map(|(x, y)| ((x + y + self.sequence) % 256) as u8)
            .collect();

        self.sequence += 1;
        Some(Frame::gray(pixels, self.width, self.height, self.sequence))
    }

    fn native_resolution(&self) -> Option<Resolution> {
        let resolution_checks = self.resolution_checks.get();
        if resolution_checks < self.resolution_after {
            self.resolution_checks.set(resolution_checks + 1);
            return None;
        }
        Some(Resolution::new(self.width, self.height))
    }

    fn stop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
        tracing::info!("MockSource stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_device_lifecycle() {
        let mut device = MockDevice::new(CaptureConfig::with_dimensions(8, 4));
        let mut source = device.acquire(&MediaConstraints::default()).unwrap();

        assert_eq!(source.native_resolution(), Some(Resolution::new(8, 4)));

        let frame = source.current_frame().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let frame2 = source.current_frame().unwrap();
        assert_eq!(frame2.sequence(), 2);

        source.stop();
        assert!(device.is_released());
        assert!(source.current_frame().is_none());
    }

    #[test]
    fn test_resolution_discovered_late() {
        let mut device = MockDevice::new(CaptureConfig::with_dimensions(8, 4)).with_resolution_delay(2);
        let mut source = device.acquire(&MediaConstraints::default()).unwrap();

        assert!(source.current_frame().is_none());
        assert!(source.native_resolution().is_none());
        assert!(source.native_resolution().is_none());
        assert!(source.native_resolution().is_some());
        assert!(source.current_frame().is_some());
    }

    #[test]
    fn test_acquire_failure() {
        let mut device = MockDevice::default()
            .failing(CaptureError::DeviceUnavailable("permission denied".into()));
        assert!(matches!(
            device.acquire(&MediaConstraints::default()),
            Err(CaptureError::DeviceUnavailable(_))
        ));
        assert_eq!(device.acquire_calls(), 1);
    }

    #[test]
    fn test_rejected_play_is_reported() {
        let mut device = MockDevice::default().rejecting_play();
        assert!(device.trigger_speculative_play().is_err());
        assert_eq!(device.play_calls(), 1);
    }
}
