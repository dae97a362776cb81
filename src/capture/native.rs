//! Webcam capture through `nokhwa`.

use super::{
    CaptureConfig, CaptureDevice, CaptureError, Frame, LiveSource, MediaConstraints, PixelFormat,
    Resolution,
};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::{Camera, NokhwaError};

/// Native camera provider.
///
/// Playback and acquisition are the same step for native cameras, so the
/// speculative play call is a no-op.
#[derive(Debug, Clone)]
pub struct NokhwaDevice {
    config: CaptureConfig,
}

impl NokhwaDevice {
    /// Camera selected by `config.device_id`, opened on acquire.
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

fn classify(err: NokhwaError) -> CaptureError {
    match err {
        NokhwaError::OpenDeviceError(_, _) | NokhwaError::GetPropertyError { .. } => {
            CaptureError::DeviceUnavailable(err.to_string())
        }
        NokhwaError::SetPropertyError { .. } => CaptureError::UnsupportedFormat(err.to_string()),
        other => CaptureError::DeviceUnavailable(other.to_string()),
    }
}

impl CaptureDevice for NokhwaDevice {
    fn acquire(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn LiveSource>, CaptureError> {
        if !constraints.video {
            return Err(CaptureError::UnsupportedFormat("video track required".into()));
        }
        if constraints.audio {
            tracing::debug!("audio requested but native capture is video-only");
        }

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(self.config.device_id), requested)
            .map_err(classify)?;
        camera.open_stream().map_err(classify)?;

        let res = camera.resolution();
        tracing::info!(
            device = self.config.device_id,
            width = res.width(),
            height = res.height(),
            "Camera stream opened"
        );

        Ok(Box::new(NokhwaSource {
            camera,
            sequence: 0,
            stopped: false,
        }))
    }
}

/// Live stream from a native camera.
pub struct NokhwaSource {
    camera: Camera,
    sequence: u64,
    stopped: bool,
}

impl LiveSource for NokhwaSource {
    fn current_frame(&mut self) -> Option<Frame> {
        if self.stopped {
            return None;
        }
        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::debug!(error = %e, "No frame available");
                return None;
            }
        };
        let image = match buffer.decode_image::<RgbFormat>() {
            Ok(image) => image,
            Err(e) => {
                tracing::debug!(error = %e, "Frame decode failed");
                return None;
            }
        };

        self.sequence += 1;
        let (width, height) = (image.width(), image.height());
        Some(Frame::new(
            image.into_raw(),
            width,
            height,
            PixelFormat::Rgb8,
            self.sequence,
        ))
    }

    fn native_resolution(&self) -> Option<Resolution> {
        let res = self.camera.resolution();
        (res.width() > 0 && res.height() > 0).then(|| Resolution::new(res.width(), res.height()))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!(error = %e, "Failed to stop camera stream");
        }
        tracing::info!("Camera stream stopped");
    }
}
