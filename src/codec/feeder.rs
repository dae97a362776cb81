//! Delayed feeding of encoded chunks into a playback sink.
//!
//! Chunks share the frame path's delay buffer. A sink that is still busy
//! with the previous chunk is never handed another one: due chunks go
//! back to the head of the buffer and are retried on the next poll.

use super::{CodecError, MediaFormat};
use crate::buffer::{BufferStats, DelayBuffer, TimedUnit};
use std::time::Duration;

/// Recorder timeslice between emitted chunks.
pub const DEFAULT_TIMESLICE: Duration = Duration::from_millis(500);
/// Interval between feeder polls.
pub const FEED_INTERVAL: Duration = Duration::from_millis(450);

/// One encoded media chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk {
    data: Vec<u8>,
    sequence: u64,
}

impl MediaChunk {
    /// Wraps encoded bytes; `sequence` counts chunks from one.
    pub fn new(data: Vec<u8>, sequence: u64) -> Self {
        Self { data, sequence }
    }

    /// Encoded bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Position in the recording.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a chunk without data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Playback side of the codec variant.
pub trait ChunkSink {
    /// Prepares the sink for `format`. Failure is terminal.
    fn open(&mut self, format: &MediaFormat) -> Result<(), CodecError>;

    /// True while the previous chunk is still being consumed.
    fn is_busy(&self) -> bool;

    /// Hands a chunk to the sink.
    fn append(&mut self, chunk: &MediaChunk) -> Result<(), CodecError>;
}

/// Outcome of one feeder poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedReport {
    /// A chunk was handed to the sink.
    pub submitted: bool,
    /// A due chunk was held back because the sink was busy or refused it.
    pub deferred: bool,
    /// Chunks dropped for being older than the delay plus grace.
    pub discarded: usize,
    /// Chunks still queued after the poll.
    pub pending: usize,
}

/// Feeds delayed chunks into a sink, at most one per poll.
pub struct ChunkFeeder<K> {
    sink: K,
    format: MediaFormat,
    buffer: DelayBuffer<MediaChunk>,
    submitted: u64,
    deferrals: u64,
    last_poll: Option<Duration>,
}

impl<K: ChunkSink> ChunkFeeder<K> {
    /// Opens `sink` for `format`.
    pub fn open(mut sink: K, format: MediaFormat, grace: Duration) -> Result<Self, CodecError> {
        sink.open(&format)?;
        tracing::info!(mime = format.mime(), "Chunk sink opened");
        Ok(Self {
            sink,
            format,
            buffer: DelayBuffer::new(grace),
            submitted: 0,
            deferrals: 0,
            last_poll: None,
        })
    }

    /// Queues a chunk emitted by the recorder. Empty chunks are ignored.
    pub fn push(&mut self, chunk: MediaChunk, now: Duration) {
        if chunk.is_empty() {
            return;
        }
        self.buffer.enqueue(chunk, now);
    }

    /// Polls when at least [`FEED_INTERVAL`] has passed since the last
    /// poll, so a faster driver loop keeps the feeder's own cadence.
    pub fn poll_if_due(&mut self, now: Duration, target: Duration) -> Option<FeedReport> {
        if let Some(last) = self.last_poll {
            if now.saturating_sub(last) < FEED_INTERVAL {
                return None;
            }
        }
        Some(self.poll(now, target))
    }

    /// Submits the oldest due chunk if the sink is free.
    pub fn poll(&mut self, now: Duration, target: Duration) -> FeedReport {
        self.last_poll = Some(now);
        let release = self.buffer.release_ready(now, target);
        let mut report = FeedReport {
            discarded: release.discarded,
            ..Default::default()
        };

        let mut due = release.released.into_iter();
        if let Some(first) = due.next() {
            let rest: Vec<TimedUnit<MediaChunk>> = due.collect();
            // Restore the rest newest-first so the head order is unchanged.
            for unit in rest.into_iter().rev() {
                self.buffer.requeue_front(unit);
            }

            let outcome = if self.sink.is_busy() {
                Err(CodecError::SinkRejected("sink busy".into()))
            } else {
                self.sink.append(first.payload())
            };

            match outcome {
                Ok(()) => {
                    self.submitted += 1;
                    report.submitted = true;
                    tracing::trace!(sequence = first.payload().sequence(), "Chunk submitted");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Chunk deferred");
                    self.buffer.requeue_front(first);
                    self.deferrals += 1;
                    report.deferred = true;
                }
            }
        }

        report.pending = self.buffer.len();
        report
    }

    /// Format the sink was opened for.
    pub fn format(&self) -> &MediaFormat {
        &self.format
    }

    /// The wrapped sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// The wrapped sink, mutably.
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Counters of the chunk delay buffer.
    pub fn buffer_stats(&self) -> BufferStats {
        self.buffer.stats()
    }

    /// Chunks accepted by the sink.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    /// Polls that held a due chunk back.
    pub fn deferrals(&self) -> u64 {
        self.deferrals
    }

    /// Drops all queued chunks.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Sink that keeps appended chunks in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    accepted: Vec<MediaChunk>,
    busy: bool,
    fail_open: bool,
    opened: Option<MediaFormat>,
}

impl MemorySink {
    /// An idle sink that opens for any format.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `open` always fails.
    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Default::default()
        }
    }

    /// Marks the sink as still consuming the previous chunk.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Chunks appended so far, in order.
    pub fn accepted(&self) -> &[MediaChunk] {
        &self.accepted
    }

    /// Format passed to the last successful `open`.
    pub fn opened(&self) -> Option<&MediaFormat> {
        self.opened.as_ref()
    }
}

impl ChunkSink for MemorySink {
    fn open(&mut self, format: &MediaFormat) -> Result<(), CodecError> {
        if self.fail_open {
            return Err(CodecError::SinkRejected(format!(
                "cannot create buffer for {}",
                format.mime()
            )));
        }
        self.opened = Some(format.clone());
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn append(&mut self, chunk: &MediaChunk) -> Result<(), CodecError> {
        if self.opened.is_none() {
            return Err(CodecError::SinkRejected("sink not open".into()));
        }
        self.accepted.push(chunk.clone());
        Ok(())
    }
}
