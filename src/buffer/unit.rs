//! Timestamped buffer items.

use std::time::Duration;

/// One buffered frame or chunk tagged with its capture time.
///
/// `captured_at` is an offset from the session clock epoch, so
/// timestamps from a previous session never leak into a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedUnit<P> {
    payload: P,
    captured_at: Duration,
}

impl<P> TimedUnit<P> {
    /// Stamps `payload` with its capture time.
    pub fn new(payload: P, captured_at: Duration) -> Self {
        Self {
            payload,
            captured_at,
        }
    }

    /// Capture timestamp.
    #[inline]
    pub fn captured_at(&self) -> Duration {
        self.captured_at
    }

    /// Age of the unit at `now`, zero if `now` precedes the capture.
    #[inline]
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.captured_at)
    }

    /// The wrapped payload.
    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Consumes the unit, returning its payload.
    pub fn into_payload(self) -> P {
        self.payload
    }
}
