//! Slicing of encoder output into timed chunks.

use super::{MediaChunk, DEFAULT_TIMESLICE};
use std::time::Duration;

/// Collects encoder output and cuts it into one chunk per timeslice.
#[derive(Debug)]
pub struct ChunkRecorder {
    timeslice: Duration,
    pending: Vec<u8>,
    slice_started: Option<Duration>,
    next_sequence: u64,
}

impl Default for ChunkRecorder {
    fn default() -> Self {
        Self::with_timeslice(DEFAULT_TIMESLICE)
    }
}

impl ChunkRecorder {
    /// A recorder emitting a chunk every [`DEFAULT_TIMESLICE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder emitting a chunk every `timeslice`.
    pub fn with_timeslice(timeslice: Duration) -> Self {
        Self {
            timeslice,
            pending: Vec::new(),
            slice_started: None,
            next_sequence: 1,
        }
    }

    /// Length of one slice.
    pub fn timeslice(&self) -> Duration {
        self.timeslice
    }

    /// Adds encoder output produced at `now`.
    ///
    /// Returns the finished chunk once the current slice has lasted a
    /// full timeslice. The data passed in that call opens the next slice.
    pub fn record(&mut self, data: &[u8], now: Duration) -> Option<MediaChunk> {
        let started = *self.slice_started.get_or_insert(now);
        let chunk = if now.saturating_sub(started) >= self.timeslice {
            self.slice_started = Some(now);
            self.take()
        } else {
            None
        };
        self.pending.extend_from_slice(data);
        chunk
    }

    /// Emits whatever is pending, as a recorder does when stopped.
    pub fn flush(&mut self) -> Option<MediaChunk> {
        self.slice_started = None;
        self.take()
    }

    fn take(&mut self) -> Option<MediaChunk> {
        if self.pending.is_empty() {
            return None;
        }
        let chunk = MediaChunk::new(std::mem::take(&mut self.pending), self.next_sequence);
        self.next_sequence += 1;
        Some(chunk)
    }
}
