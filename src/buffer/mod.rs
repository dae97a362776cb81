//! Frame delay buffering.
//!
//! The buffer is generic over its payload so the same hold-then-release
//! logic serves decoded camera frames and encoded media chunks.

mod delay;
mod unit;

pub use delay::{BufferStats, DelayBuffer, Release, DEFAULT_GRACE};
pub use unit::TimedUnit;
