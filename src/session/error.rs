//! Session-level errors.
//!
//! Everything here is terminal for the session attempt that raised it.
//! Per-frame sink refusals never surface as errors; they are retried on
//! the next tick.

use super::SessionState;
use crate::capture::CaptureError;
use crate::codec::CodecError;
use crate::present::PresentError;
use thiserror::Error;

/// Why a session could not start or keep running.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Neither the camera nor the codec path offers a usable format.
    #[error("no compatible media format: {0}")]
    UnsupportedFormat(String),
    /// Camera missing, busy or denied.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    /// The output refused to set up.
    #[error("output rejected during setup: {0}")]
    SinkRejected(String),
    /// A state change the lifecycle does not allow.
    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition {
        /// State the session was in.
        from: SessionState,
        /// State that was requested.
        to: SessionState,
    },
}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::UnsupportedFormat(msg) => SessionError::UnsupportedFormat(msg),
            other => SessionError::DeviceUnavailable(other.to_string()),
        }
    }
}

impl From<PresentError> for SessionError {
    fn from(err: PresentError) -> Self {
        SessionError::SinkRejected(err.to_string())
    }
}

impl From<CodecError> for SessionError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::UnsupportedFormat => SessionError::UnsupportedFormat(err.to_string()),
            CodecError::SinkRejected(msg) => SessionError::SinkRejected(msg),
        }
    }
}
