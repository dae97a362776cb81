//! Delayed Mirror CLI
//!
//! Runs a delayed-mirror session headless: frames are captured, delayed
//! and drawn onto an in-memory surface. Type `delay 1.5`, `mirror on`,
//! `grid 3` or `stop` on stdin to adjust the running session.

use clap::Parser;
use delayed_mirror::{
    capture::{CaptureDevice, ConfigError, DelayConfig, FileConfig, MockDevice},
    metrics::MetricsSnapshot,
    present::SoftwareSurface,
    session::{
        parse_delay_seconds, parse_grid_lines, Command, FileSettings, Session, SessionOptions,
        SharedConfig, StopHandle,
    },
};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "delayed-mirror", version, about = "Re-display a camera feed after a delay")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preference store, created on first stop.
    #[arg(long, default_value = "delayed-mirror-settings.toml")]
    settings: PathBuf,

    /// Target delay in seconds (overrides the stored value).
    #[arg(long, value_parser = parse_delay)]
    delay: Option<Duration>,

    /// Mirror the delayed view horizontally (`--mirror off` to disable).
    #[arg(long, value_name = "on|off", num_args = 0..=1, default_missing_value = "on", value_parser = parse_switch)]
    mirror: Option<bool>,

    /// Show a grid with this many lines per axis.
    #[arg(long, value_parser = parse_grid)]
    grid: Option<u32>,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,

    /// Driver loop rate (overrides the config file).
    #[arg(long)]
    fps: Option<u32>,

    /// Use the native camera instead of synthetic frames (needs the
    /// `camera` feature).
    #[arg(long)]
    camera: bool,
}

fn parse_delay(text: &str) -> Result<Duration, String> {
    parse_delay_seconds(text).map_err(|e| e.to_string())
}

fn parse_grid(text: &str) -> Result<u32, String> {
    parse_grid_lines(text).map_err(|e| e.to_string())
}

fn parse_switch(text: &str) -> Result<bool, String> {
    match text {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => Err(format!("expected on/off, got {other:?}")),
    }
}

/// Driver loop settings with `--fps` applied.
fn tick_config(args: &Args, file: &FileConfig) -> Result<DelayConfig, ConfigError> {
    let mut delay = file.delay.clone();
    if let Some(fps) = args.fps {
        delay.tick_rate = fps;
    }
    delay.validate()?;
    Ok(delay)
}

fn apply_overrides(args: &Args, config: &SharedConfig) {
    config.update(|c| {
        if let Some(delay) = args.delay {
            c.target_delay = delay;
        }
        if let Some(mirror) = args.mirror {
            c.mirror_enabled = mirror;
        }
        if let Some(lines) = args.grid {
            c.grid_line_count = lines;
            c.grid_enabled = lines > 0;
        }
    });
}

/// Reads control commands from stdin until EOF.
fn spawn_controls(config: SharedConfig, stop: StopHandle) {
    let spawned = std::thread::Builder::new()
        .name("controls".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(command) => command.apply(&config, &stop),
                    Err(e) => warn!("{}", e),
                }
            }
        });
    if let Err(e) = spawned {
        warn!("Controls unavailable: {}", e);
    }
}

fn run<D: CaptureDevice>(device: D, args: &Args, file: &FileConfig) -> Result<(), String> {
    let delay = tick_config(args, file).map_err(|e| e.to_string())?;
    let settings = FileSettings::open(&args.settings);
    let mut session = Session::new(
        device,
        SoftwareSurface::new(),
        settings,
        SessionOptions::from(file),
    );
    let config = session.config();
    apply_overrides(args, &config);

    let snapshot = config.snapshot();
    info!(
        delay_s = snapshot.target_delay.as_secs_f64(),
        mirror = snapshot.mirror_enabled,
        grid = snapshot.present_options().grid_lines,
        "Session config"
    );

    let stop = StopHandle::new();
    let ctrlc_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || ctrlc_stop.trigger()) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }
    spawn_controls(config, stop.clone());

    let publish = metrics_publisher(file);
    let tick_rate = u64::from(delay.tick_rate);

    let result = session.run_with(&stop, delay.tick_interval(), args.ticks, |session, _report| {
        if session.ticks() % tick_rate == 0 {
            let snapshot = MetricsSnapshot::from_session(session);
            info!(
                depth = snapshot.buffer_depth,
                presented = snapshot.presented,
                discarded = snapshot.discarded,
                "Pipeline status"
            );
            publish(&snapshot);
        }
    });
    // Final state, so the exporter reports the stopped session
    publish(&MetricsSnapshot::from_session(&session));
    let ticks = result.map_err(|e| e.to_string())?;

    let surface = session.presenter().renderer();
    info!(
        ticks,
        frames_drawn = surface.frames_drawn(),
        surface_w = surface.width(),
        surface_h = surface.height(),
        "Done"
    );
    Ok(())
}

#[cfg(feature = "metrics")]
fn metrics_publisher(file: &FileConfig) -> Box<dyn Fn(&MetricsSnapshot)> {
    use delayed_mirror::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

    if file.output.metrics_port == 0 {
        return Box::new(|_| {});
    }
    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            return Box::new(|_| {});
        }
    };
    let server = MetricsServer::new(
        MetricsServerConfig::with_port(file.output.metrics_port),
        registry,
    );
    match server.spawn() {
        Ok(state) => Box::new(move |snapshot| state.blocking_write().update(snapshot)),
        Err(e) => {
            warn!("Metrics server failed to start: {}", e);
            Box::new(|_| {})
        }
    }
}

#[cfg(not(feature = "metrics"))]
fn metrics_publisher(_file: &FileConfig) -> Box<dyn Fn(&MetricsSnapshot)> {
    Box::new(|_| {})
}

#[cfg(feature = "camera")]
fn run_camera(args: &Args, file: &FileConfig) -> Result<(), String> {
    let device = delayed_mirror::capture::NokhwaDevice::new(file.capture.clone());
    run(device, args, file)
}

#[cfg(not(feature = "camera"))]
fn run_camera(_args: &Args, _file: &FileConfig) -> Result<(), String> {
    Err("built without the `camera` feature".into())
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Delayed Mirror v{}", delayed_mirror::VERSION);

    let file = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let result = if args.camera {
        run_camera(&args, &file)
    } else {
        run(MockDevice::new(file.capture.clone()), &args, &file)
    };

    if let Err(e) = result {
        eprintln!("Session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("delayed-mirror").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_mirror_flag_forms() {
        assert_eq!(args(&[]).mirror, None);
        assert_eq!(args(&["--mirror"]).mirror, Some(true));
        assert_eq!(args(&["--mirror", "off"]).mirror, Some(false));
        assert_eq!(args(&["--mirror=on"]).mirror, Some(true));
    }

    #[test]
    fn test_mirror_off_overrides_stored_preference() {
        let config = SharedConfig::new(delayed_mirror::SessionConfig {
            mirror_enabled: true,
            ..Default::default()
        });
        apply_overrides(&args(&["--mirror", "off"]), &config);
        assert!(!config.snapshot().mirror_enabled);
    }

    #[test]
    fn test_grid_flag_bounded() {
        assert_eq!(args(&["--grid", "4"]).grid, Some(4));
        let parsed = Args::try_parse_from(["delayed-mirror", "--grid", "2000"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_fps_overrides_tick_rate() {
        let file = FileConfig::default();
        let delay = tick_config(&args(&["--fps", "50"]), &file).unwrap();
        assert_eq!(delay.tick_interval(), Duration::from_millis(20));
        assert_eq!(delay.grace_ms, file.delay.grace_ms);
        assert!(tick_config(&args(&["--fps", "0"]), &file).is_err());
    }
}
