//! Hold-then-release queue.
//!
//! Units enter at the tail in capture order and leave from the head once
//! they are old enough. Units that outlive the target by more than the
//! grace period are dropped in the same head scan, which keeps memory
//! bounded when the target delay is cut abruptly.

use super::TimedUnit;
use std::collections::VecDeque;
use std::time::Duration;

/// Default extra age allowed beyond the target before a unit is dropped.
pub const DEFAULT_GRACE: Duration = Duration::from_millis(2000);

/// Result of a single head scan.
#[derive(Debug)]
pub struct Release<P> {
    /// Units old enough to present, oldest first.
    pub released: Vec<TimedUnit<P>>,
    /// Units dropped because they exceeded `target + grace`.
    pub discarded: usize,
}

impl<P> Release<P> {
    /// True if nothing was released or discarded.
    pub fn is_empty(&self) -> bool {
        self.released.is_empty() && self.discarded == 0
    }

    /// Takes the newest released unit, dropping the rest.
    ///
    /// Returns the unit and the number of older units it superseded.
    pub fn into_latest(mut self) -> (Option<TimedUnit<P>>, usize) {
        let latest = self.released.pop();
        (latest, self.released.len())
    }
}

/// Running totals for a delay buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Units ever enqueued.
    pub enqueued: u64,
    /// Units ever released.
    pub released: u64,
    /// Units ever discarded.
    pub discarded: u64,
    /// Units put back at the head after a sink refused them.
    pub requeued: u64,
}

/// Time-ordered queue implementing delayed release.
///
/// Invariant: `captured_at` is non-decreasing from head to tail, so the
/// age of units is non-increasing and a scan can stop at the first unit
/// that is not yet due.
#[derive(Debug)]
pub struct DelayBuffer<P> {
    units: VecDeque<TimedUnit<P>>,
    grace: Duration,
    stats: BufferStats,
}

impl<P> DelayBuffer<P> {
    /// Creates a buffer with the given grace period.
    pub fn new(grace: Duration) -> Self {
        Self {
            units: VecDeque::new(),
            grace,
            stats: BufferStats::default(),
        }
    }

    /// Appends a unit at the tail.
    ///
    /// A timestamp older than the current tail is clamped to the tail's
    /// timestamp so ordering is preserved.
    pub fn enqueue(&mut self, payload: P, captured_at: Duration) {
        let captured_at = match self.units.back() {
            Some(tail) if tail.captured_at() > captured_at => {
                tracing::trace!(
                    given_ms = captured_at.as_millis() as u64,
                    tail_ms = tail.captured_at().as_millis() as u64,
                    "Clamped out-of-order timestamp"
                );
                tail.captured_at()
            }
            _ => captured_at,
        };

        self.units.push_back(TimedUnit::new(payload, captured_at));
        self.stats.enqueued += 1;
    }

    /// Removes every unit due at `now` from the head.
    ///
    /// Units older than `target + grace` are discarded, units at least
    /// `target` old are released, and the scan stops at the first unit
    /// younger than `target`.
    pub fn release_ready(&mut self, now: Duration, target: Duration) -> Release<P> {
        let discard_after = target.saturating_add(self.grace);
        let mut released = Vec::new();
        let mut discarded = 0;

        while let Some(head) = self.units.front() {
            let age = head.age(now);
            if age > discard_after {
                self.units.pop_front();
                discarded += 1;
            } else if age >= target {
                if let Some(unit) = self.units.pop_front() {
                    released.push(unit);
                }
            } else {
                break;
            }
        }

        self.stats.released += released.len() as u64;
        self.stats.discarded += discarded as u64;

        if discarded > 0 {
            tracing::trace!(
                discarded,
                target_ms = target.as_millis() as u64,
                "Dropped units past the grace window"
            );
        }

        Release {
            released,
            discarded,
        }
    }

    /// Puts a unit back at the head after a sink refused it.
    ///
    /// The unit must have come from this buffer's head; a unit newer than
    /// the current head has its timestamp clamped to keep ordering.
    pub fn requeue_front(&mut self, unit: TimedUnit<P>) {
        let unit = match self.units.front() {
            Some(head) if head.captured_at() < unit.captured_at() => {
                let at = head.captured_at();
                TimedUnit::new(unit.into_payload(), at)
            }
            _ => unit,
        };
        self.units.push_front(unit);
        self.stats.requeued += 1;
        // Counted again when it is released next time.
        self.stats.released = self.stats.released.saturating_sub(1);
    }

    /// Drops all queued units.
    pub fn clear(&mut self) {
        let dropped = self.units.len();
        self.units.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "Delay buffer cleared");
        }
    }

    /// Number of queued units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Age of the head unit at `now`.
    pub fn oldest_age(&self, now: Duration) -> Option<Duration> {
        self.units.front().map(|u| u.age(now))
    }

    /// Capture time of the newest queued unit.
    pub fn newest_timestamp(&self) -> Option<Duration> {
        self.units.back().map(TimedUnit::captured_at)
    }

    /// Extra age tolerated beyond the target delay.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Counters since creation.
    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    /// Iterates queued units from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &TimedUnit<P>> {
        self.units.iter()
    }
}

impl<P> Default for DelayBuffer<P> {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}
