//! Encoded-chunk variant of the delay pipeline.
//!
//! Instead of decoded frames, a recorder emits compressed chunks that are
//! held in the same delay buffer and fed into a playback sink. Setup
//! failures (no common format, sink refusing to open) are terminal; a
//! busy sink only defers the next chunk.

mod feeder;
mod format;
mod recorder;

pub use feeder::{
    ChunkFeeder, ChunkSink, FeedReport, MediaChunk, MemorySink, DEFAULT_TIMESLICE, FEED_INTERVAL,
};
pub use format::{negotiate_format, FormatSupport, MediaFormat, CANDIDATE_FORMATS};
pub use recorder::ChunkRecorder;

use thiserror::Error;

/// Errors raised by the codec variant.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Recorder and sink share no candidate format.
    #[error("no format supported by both recorder and sink")]
    UnsupportedFormat,
    /// The sink refused to open or to take a chunk.
    #[error("sink rejected chunk: {0}")]
    SinkRejected(String),
}
