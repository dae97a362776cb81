//! Prometheus metrics exporter for the delay pipeline.
//!
//! # Metrics Exposed
//!
//! - `delayed_mirror_session_running` - Session status (1=running, 0=stopped)
//! - `delayed_mirror_buffer_depth` - Units currently held in the delay buffer
//! - `delayed_mirror_target_delay_seconds` - Current target delay
//! - `delayed_mirror_units_enqueued_total` - Units captured into the buffer
//! - `delayed_mirror_units_released_total` - Units released after the delay
//! - `delayed_mirror_units_discarded_total` - Units dropped past the grace window
//! - `delayed_mirror_frames_presented_total` - Frames drawn
//! - `delayed_mirror_frames_superseded_total` - Released frames skipped for a newer one
//! - `delayed_mirror_frames_deferred_total` - Frames the output refused
//!
//! Discards are expected whenever the delay is shortened and are exported
//! as a plain counter, not as an error rate.
//!
//! # Example
//!
//! ```no_run
//! use delayed_mirror::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     running: true,
//!     buffer_depth: 90,
//!     enqueued: 300,
//!     released: 210,
//!     target_delay_seconds: 3.0,
//!     ..Default::default()
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError, SharedMetrics};
