//! Delayed Mirror Library
//!
//! Captures a live camera feed and re-displays it after a configurable
//! delay, optionally mirrored and overlaid with a positioning grid. Useful
//! for watching your own delayed reflection while practicing a movement.
//!
//! # Architecture
//!
//! The system follows an explicit data flow, driven once per tick:
//!
//! ```text
//! capture → buffer (enqueue) → … → buffer (release) → present
//!                                        ↑
//!                         session config (delay, mirror, grid)
//! ```
//!
//! # Design Principles
//!
//! - **Single owner**: the session loop owns the buffer; only the config
//!   and the stop request cross threads
//! - **Not retroactive**: changing the delay never re-stamps queued frames
//! - **Bounded**: frames older than target + grace are dropped, not shown
//! - **All or nothing**: a session is either fully running or fully stopped
//!
//! # Example
//!
//! ```no_run
//! use delayed_mirror::{
//!     capture::{CaptureConfig, MockDevice},
//!     present::SoftwareSurface,
//!     session::{MemorySettings, Session, SessionOptions},
//! };
//! use std::time::Duration;
//!
//! let device = MockDevice::new(CaptureConfig::default());
//! let mut session = Session::new(
//!     device,
//!     SoftwareSurface::new(),
//!     MemorySettings::new(),
//!     SessionOptions::default(),
//! );
//!
//! session.config().update(|c| c.target_delay = Duration::from_millis(500));
//! session.start().unwrap();
//!
//! for _ in 0..60 {
//!     let report = session.tick().unwrap();
//!     if report.presented {
//!         println!("drew a delayed frame");
//!     }
//!     std::thread::sleep(Duration::from_millis(16));
//! }
//!
//! session.stop().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod capture;
pub mod codec;
pub mod geometry;
pub mod metrics;
pub mod present;
pub mod session;

// Re-export commonly used types at crate root
pub use buffer::{DelayBuffer, Release, TimedUnit};
pub use capture::{CaptureConfig, CaptureDevice, FileConfig, Frame, LiveSource, MockDevice};
pub use geometry::{compute_fit, Geometry, Size};
pub use present::{Presenter, Renderer, SoftwareSurface};
pub use session::{Session, SessionConfig, SessionError, SessionOptions, SessionState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
