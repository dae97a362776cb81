//! Setup of the encoded-chunk path for a session.

use super::SessionError;
use crate::codec::{negotiate_format, ChunkFeeder, ChunkSink, FormatSupport, CANDIDATE_FORMATS};
use std::time::Duration;

/// Picks the first candidate format both sides accept and opens `sink`
/// for it.
///
/// Either failure ends the session attempt: no common format maps to
/// [`SessionError::UnsupportedFormat`], a sink refusing to open maps to
/// [`SessionError::SinkRejected`].
pub fn open_chunk_feeder<K: ChunkSink>(
    recorder: &dyn FormatSupport,
    sink_formats: &dyn FormatSupport,
    sink: K,
    grace: Duration,
) -> Result<ChunkFeeder<K>, SessionError> {
    let format = negotiate_format(CANDIDATE_FORMATS, recorder, sink_formats)?;
    Ok(ChunkFeeder::open(sink, format, grace)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ChunkRecorder, MemorySink};

    const GRACE: Duration = Duration::from_millis(2000);

    fn webm(mime: &str) -> bool {
        mime.starts_with("video/webm")
    }

    #[test]
    fn test_no_common_format() {
        let mp4 = |m: &str| m.starts_with("video/mp4");
        let result = open_chunk_feeder(&mp4, &webm, MemorySink::new(), GRACE);
        assert!(matches!(result, Err(SessionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_sink_open_failure() {
        let result = open_chunk_feeder(&webm, &webm, MemorySink::failing_open(), GRACE);
        assert!(matches!(result, Err(SessionError::SinkRejected(_))));
    }

    #[test]
    fn test_recorded_chunks_play_after_delay() {
        let target = Duration::from_millis(1000);
        let mut recorder = ChunkRecorder::new();
        let mut feeder = open_chunk_feeder(&webm, &webm, MemorySink::new(), GRACE).unwrap();
        assert_eq!(feeder.format().container(), "webm");

        // Encoder output every 50ms for four seconds
        for t in (0..4000u64).step_by(50) {
            let now = Duration::from_millis(t);
            if let Some(chunk) = recorder.record(&[0u8; 16], now) {
                feeder.push(chunk, now);
            }
            feeder.poll_if_due(now, target);
        }

        // A chunk closes every 500ms and waits a full second; polls run
        // every 450ms
        let sequences: Vec<u64> = feeder.sink().accepted().iter().map(|c| c.sequence()).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
        assert_eq!(feeder.buffer_stats().discarded, 0);
        assert_eq!(feeder.buffer_stats().enqueued, 7);
    }
}
