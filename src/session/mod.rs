//! Session state and the driver loop.
//!
//! A session is one camera acquisition from start to stop. It owns the
//! delay buffer and presenter; preferences are shared with the controls
//! through [`SharedConfig`] and survive sessions through a
//! [`SettingsStore`].

mod chunks;
mod clock;
mod config;
mod control;
mod driver;
mod error;
mod settings;
mod state;

pub use chunks::open_chunk_feeder;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{parse_delay_seconds, parse_grid_lines, SessionConfig, SharedConfig, MAX_DELAY};
pub use control::{Command, ControlError};
pub use driver::{Session, SessionOptions, TickReport};
pub use error::SessionError;
pub use settings::{
    FileSettings, MemorySettings, SettingsStore, DELAY_KEY, GRID_COUNT_KEY, GRID_ENABLED_KEY,
    MIRROR_ENABLED_KEY,
};
pub use state::{SessionState, StopHandle};
