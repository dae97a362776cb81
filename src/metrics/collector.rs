//! Metrics collection and registry.

use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of session state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether a session is currently running.
    pub running: bool,
    /// Units currently held in the delay buffer.
    pub buffer_depth: usize,
    /// Total units enqueued.
    pub enqueued: u64,
    /// Total units released.
    pub released: u64,
    /// Total units dropped past the grace window.
    pub discarded: u64,
    /// Total frames drawn.
    pub presented: u64,
    /// Total released frames skipped for a newer one.
    pub superseded: u64,
    /// Total frames deferred by the output.
    pub deferred: u64,
    /// Current target delay in seconds.
    pub target_delay_seconds: f64,
}

/// Prometheus metrics registry for the delay pipeline.
pub struct MetricsRegistry {
    registry: Registry,

    running: IntGauge,
    buffer_depth: IntGauge,
    target_delay: Gauge,

    enqueued_total: IntCounter,
    released_total: IntCounter,
    discarded_total: IntCounter,
    presented_total: IntCounter,
    superseded_total: IntCounter,
    deferred_total: IntCounter,
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsRegistry {
    /// Creates a new registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let running = IntGauge::new(
            "delayed_mirror_session_running",
            "Session status (1=running, 0=stopped)",
        )?;
        let buffer_depth = IntGauge::new(
            "delayed_mirror_buffer_depth",
            "Units currently held in the delay buffer",
        )?;
        let target_delay = Gauge::new(
            "delayed_mirror_target_delay_seconds",
            "Current target delay in seconds",
        )?;

        let enqueued_total = IntCounter::new(
            "delayed_mirror_units_enqueued_total",
            "Total units captured into the delay buffer",
        )?;
        let released_total = IntCounter::new(
            "delayed_mirror_units_released_total",
            "Total units released after reaching the target delay",
        )?;
        let discarded_total = IntCounter::new(
            "delayed_mirror_units_discarded_total",
            "Total units dropped past the grace window",
        )?;
        let presented_total = IntCounter::new(
            "delayed_mirror_frames_presented_total",
            "Total frames drawn onto the output surface",
        )?;
        let superseded_total = IntCounter::new(
            "delayed_mirror_frames_superseded_total",
            "Total released frames skipped in favour of a newer one",
        )?;
        let deferred_total = IntCounter::new(
            "delayed_mirror_frames_deferred_total",
            "Total frames the output refused and deferred",
        )?;

        registry.register(Box::new(running.clone()))?;
        registry.register(Box::new(buffer_depth.clone()))?;
        registry.register(Box::new(target_delay.clone()))?;
        registry.register(Box::new(enqueued_total.clone()))?;
        registry.register(Box::new(released_total.clone()))?;
        registry.register(Box::new(discarded_total.clone()))?;
        registry.register(Box::new(presented_total.clone()))?;
        registry.register(Box::new(superseded_total.clone()))?;
        registry.register(Box::new(deferred_total.clone()))?;

        Ok(Self {
            registry,
            running,
            buffer_depth,
            target_delay,
            enqueued_total,
            released_total,
            discarded_total,
            presented_total,
            superseded_total,
            deferred_total,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.running.set(if snapshot.running { 1 } else { 0 });
        self.buffer_depth.set(snapshot.buffer_depth as i64);
        self.target_delay.set(snapshot.target_delay_seconds);

        // Counters only move forward, so apply the difference
        advance(&self.enqueued_total, snapshot.enqueued);
        advance(&self.released_total, snapshot.released);
        advance(&self.discarded_total, snapshot.discarded);
        advance(&self.presented_total, snapshot.presented);
        advance(&self.superseded_total, snapshot.superseded);
        advance(&self.deferred_total, snapshot.deferred);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the pipeline components.
    pub fn from_components(
        running: bool,
        buffer_depth: usize,
        buffer: &crate::buffer::BufferStats,
        present: &crate::present::PresentStats,
        config: &crate::session::SessionConfig,
    ) -> Self {
        Self {
            running,
            buffer_depth,
            enqueued: buffer.enqueued,
            released: buffer.released,
            discarded: buffer.discarded,
            presented: present.presented,
            superseded: present.superseded,
            deferred: buffer.requeued,
            target_delay_seconds: config.target_delay.as_secs_f64(),
        }
    }

    /// Creates a snapshot from a live session.
    pub fn from_session<D, R, S>(session: &crate::session::Session<D, R, S>) -> Self
    where
        D: crate::capture::CaptureDevice,
        R: crate::present::Renderer,
        S: crate::session::SettingsStore,
    {
        Self::from_components(
            session.state() == crate::session::SessionState::Running,
            session.buffer().len(),
            &session.buffer().stats(),
            &session.presenter().stats(),
            &session.config().snapshot(),
        )
    }
}
