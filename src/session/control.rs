//! Text commands that adjust a running session.
//!
//! Each line typed on the controlling terminal maps to one command. The
//! commands only touch the shared config or the stop handle, never the
//! loop's own state.

use super::config::{parse_delay_seconds, parse_grid_lines, SharedConfig};
use super::StopHandle;
use crate::present::MAX_GRID_LINES;
use std::time::Duration;
use thiserror::Error;

/// Why an input line was not accepted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControlError {
    /// Blank input line.
    #[error("empty command")]
    Empty,
    /// First word is not a known command.
    #[error("unknown command: {0}")]
    Unknown(String),
    /// The command's argument is missing or out of range.
    #[error("invalid argument for {command}: {reason}")]
    InvalidArgument {
        /// Command the argument belongs to.
        command: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// A user control action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set the target delay.
    Delay(Duration),
    /// Turn mirroring on or off.
    Mirror(bool),
    /// Show or hide the grid, keeping its line count.
    Grid(bool),
    /// Set the grid line count per axis.
    GridLines(u32),
    /// End the session.
    Stop,
}

fn parse_switch(command: &'static str, arg: Option<&str>) -> Result<bool, ControlError> {
    match arg {
        Some("on") | Some("true") => Ok(true),
        Some("off") | Some("false") => Ok(false),
        other => Err(ControlError::InvalidArgument {
            command,
            reason: format!("expected on/off, got {:?}", other.unwrap_or("")),
        }),
    }
}

impl Command {
    /// Parses one input line, e.g. `delay 1.5`, `mirror on`, `grid 4`.
    pub fn parse(line: &str) -> Result<Self, ControlError> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(ControlError::Empty)?;
        let arg = parts.next();

        match name {
            "delay" => {
                let text = arg.ok_or_else(|| ControlError::InvalidArgument {
                    command: "delay",
                    reason: "missing seconds".into(),
                })?;
                parse_delay_seconds(text)
                    .map(Command::Delay)
                    .map_err(|e| ControlError::InvalidArgument {
                        command: "delay",
                        reason: e.to_string(),
                    })
            }
            "mirror" => parse_switch("mirror", arg).map(Command::Mirror),
            "grid" => match arg {
                Some(text) if text.parse::<i64>().is_ok() => parse_grid_lines(text)
                    .map(Command::GridLines)
                    .map_err(|e| ControlError::InvalidArgument {
                        command: "grid",
                        reason: e.to_string(),
                    }),
                _ => parse_switch("grid", arg).map(Command::Grid),
            },
            "stop" | "quit" | "q" => Ok(Command::Stop),
            other => Err(ControlError::Unknown(other.to_string())),
        }
    }

    /// Applies the command.
    pub fn apply(&self, config: &SharedConfig, stop: &StopHandle) {
        match *self {
            Command::Delay(delay) => config.update(|c| c.target_delay = delay),
            Command::Mirror(on) => config.update(|c| c.mirror_enabled = on),
            Command::Grid(on) => config.update(|c| c.grid_enabled = on),
            Command::GridLines(count) => config.update(|c| {
                c.grid_line_count = count.min(MAX_GRID_LINES);
                c.grid_enabled = count > 0;
            }),
            Command::Stop => stop.trigger(),
        }
        tracing::info!(command = ?self, "Applied control");
    }
}
