//! The per-tick driver loop.
//!
//! One `Session` owns the capture source, the delay buffer and the
//! presenter. Everything happens synchronously inside `tick`, so the
//! buffer needs no locking; only the shared config and stop handle cross
//! threads.

use super::{Clock, MonotonicClock, SessionConfig, SessionError, SessionState, SettingsStore,
    SharedConfig, StopHandle};
use crate::buffer::{DelayBuffer, DEFAULT_GRACE};
use crate::capture::{CaptureDevice, FileConfig, Frame, LiveSource, MediaConstraints, Resolution};
use crate::geometry::{compute_fit, Geometry, Size};
use crate::present::{Presenter, Renderer};
use std::time::{Duration, Instant};

/// Fixed parameters of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Tracks requested when acquiring the device.
    pub constraints: MediaConstraints,
    /// Extra age allowed beyond the target before a frame is dropped.
    pub grace: Duration,
    /// Output area the delayed view is fitted into.
    pub container: Size,
    /// Whether the device is held in landscape orientation.
    pub landscape: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            constraints: MediaConstraints::default(),
            grace: DEFAULT_GRACE,
            container: Size::new(1280.0, 720.0),
            landscape: false,
        }
    }
}

impl From<&FileConfig> for SessionOptions {
    fn from(config: &FileConfig) -> Self {
        Self {
            constraints: MediaConstraints {
                video: true,
                audio: config.capture.audio,
            },
            grace: config.delay.grace(),
            container: Size::new(
                config.display.container_width as f64,
                config.display.container_height as f64,
            ),
            landscape: config.display.landscape,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// A new frame was sampled into the buffer.
    pub sampled: bool,
    /// Frames released by the buffer this tick.
    pub released: usize,
    /// Frames dropped past the grace window this tick.
    pub discarded: usize,
    /// Released frames skipped in favour of a newer one.
    pub superseded: usize,
    /// A frame reached the surface.
    pub presented: bool,
    /// The renderer refused the frame; it was queued again.
    pub deferred: bool,
}

/// A delayed-mirror capture session.
pub struct Session<D, R, S> {
    device: D,
    presenter: Presenter<R>,
    settings: S,
    clock: Box<dyn Clock>,
    config: SharedConfig,
    options: SessionOptions,
    state: SessionState,
    source: Option<Box<dyn LiveSource>>,
    buffer: DelayBuffer<Frame>,
    resolution: Option<Resolution>,
    geometry: Option<Geometry>,
    ticks: u64,
}

impl<D, R, S> Session<D, R, S>
where
    D: CaptureDevice,
    R: Renderer,
    S: SettingsStore,
{
    /// Creates an idle session, loading preferences from `settings`.
    pub fn new(device: D, renderer: R, settings: S, options: SessionOptions) -> Self {
        let config = SharedConfig::new(SessionConfig::load(&settings));
        Self {
            device,
            presenter: Presenter::new(renderer),
            settings,
            clock: Box::new(MonotonicClock::new()),
            config,
            buffer: DelayBuffer::new(options.grace),
            options,
            state: SessionState::Idle,
            source: None,
            resolution: None,
            geometry: None,
            ticks: 0,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Handle for adjusting the config from outside the loop.
    pub fn config(&self) -> SharedConfig {
        self.config.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The frame delay buffer.
    pub fn buffer(&self) -> &DelayBuffer<Frame> {
        &self.buffer
    }

    /// The presenter and its renderer.
    pub fn presenter(&self) -> &Presenter<R> {
        &self.presenter
    }

    /// The capture device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The preference store.
    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Current output placement, once the resolution is known.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Ticks run since the session was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn transition(&mut self, to: SessionState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(to) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(from = %self.state, to = %to, "Session transition");
        self.state = to;
        Ok(())
    }

    /// Acquires the camera and enters `Starting`.
    ///
    /// Playback is triggered before acquisition and its failure ignored.
    /// If acquisition fails the session is reset as if freshly loaded and
    /// the error is returned.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Starting)?;

        self.buffer.clear();
        self.clock.reset();
        self.presenter.invalidate();
        self.resolution = None;
        self.geometry = None;

        if let Err(e) = self.device.trigger_speculative_play() {
            tracing::warn!(error = %e, "Speculative play failed, continuing");
        }

        match self.device.acquire(&self.options.constraints) {
            Ok(source) => {
                self.source = Some(source);
                tracing::info!("Capture acquired, waiting for resolution");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to start camera");
                self.abort();
                Err(e.into())
            }
        }
    }

    /// Tears everything down without persisting, then reloads the stored
    /// preferences.
    fn abort(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop();
        }
        self.buffer.clear();
        self.presenter.invalidate();
        self.resolution = None;
        self.geometry = None;
        self.config.replace(SessionConfig::load(&self.settings));
        self.state = SessionState::Idle;
    }

    /// Updates the output area and device orientation.
    pub fn resize(&mut self, container: Size, landscape: bool) {
        self.options.container = container;
        self.options.landscape = landscape;
        self.refit();
    }

    fn refit(&mut self) {
        self.geometry = self.resolution.and_then(|res| {
            compute_fit(res.into(), self.options.container, self.options.landscape)
        });
        match &self.geometry {
            Some(g) => tracing::debug!(
                width = g.output_width,
                height = g.output_height,
                rotated = g.orientation_corrected,
                "Output geometry updated"
            ),
            None => tracing::debug!("Output geometry indeterminate"),
        }
    }

    /// Runs one iteration of the loop.
    ///
    /// Outside `Starting` and `Running` this does nothing, so no frame is
    /// sampled or presented after `stop`.
    pub fn tick(&mut self) -> Result<TickReport, SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Stopping => return Ok(TickReport::default()),
            SessionState::Starting => {
                if !self.finish_starting()? {
                    return Ok(TickReport::default());
                }
            }
            SessionState::Running => {}
        }

        self.ticks += 1;
        let config = self.config.snapshot();
        let now = self.clock.now();
        let mut report = TickReport::default();

        if let Some(frame) = self.source.as_mut().and_then(|s| s.current_frame()) {
            let res = Resolution::new(frame.width(), frame.height());
            if self.resolution != Some(res) {
                tracing::info!(width = res.width, height = res.height, "Source resolution changed");
                self.resolution = Some(res);
                self.refit();
            }
            self.buffer.enqueue(frame, now);
            report.sampled = true;
        }

        let release = self.buffer.release_ready(now, config.target_delay);
        report.released = release.released.len();
        report.discarded = release.discarded;

        let (latest, superseded) = release.into_latest();
        report.superseded = superseded;
        self.presenter.note_superseded(superseded);

        if let Some(unit) = latest {
            match &self.geometry {
                Some(geometry) => {
                    match self.presenter.present(&unit, geometry, &config.present_options()) {
                        Ok(()) => report.presented = true,
                        Err(e) => {
                            tracing::debug!(error = %e, "Renderer busy, frame deferred");
                            self.buffer.requeue_front(unit);
                            report.deferred = true;
                        }
                    }
                }
                None => tracing::trace!("No drawable geometry, frame skipped"),
            }
        }

        Ok(report)
    }

    /// Moves to `Running` once the source reports its resolution.
    ///
    /// A renderer that refuses the initial surface terminates the session.
    fn finish_starting(&mut self) -> Result<bool, SessionError> {
        let Some(res) = self.source.as_ref().and_then(|s| s.native_resolution()) else {
            return Ok(false);
        };

        self.resolution = Some(res);
        self.refit();
        if let Some(geometry) = self.geometry {
            if let Err(e) = self.presenter.prepare(&geometry) {
                tracing::error!(error = %e, "Output setup failed");
                self.abort();
                return Err(e.into());
            }
        }

        self.transition(SessionState::Running)?;
        tracing::info!(
            width = res.width,
            height = res.height,
            "Session running"
        );
        Ok(true)
    }

    /// Stops capture, persists preferences and returns to `Idle`.
    ///
    /// Stopping an idle session is a no-op.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        if !self.state.is_active() {
            return Ok(());
        }
        self.transition(SessionState::Stopping)?;

        if let Some(mut source) = self.source.take() {
            source.stop();
        }
        self.buffer.clear();
        self.presenter.invalidate();
        self.resolution = None;
        self.geometry = None;

        self.config.snapshot().persist(&mut self.settings);

        self.transition(SessionState::Idle)?;
        tracing::info!(ticks = self.ticks, "Session stopped");
        Ok(())
    }

    /// Starts if idle, then ticks every `interval` until `stop` is
    /// triggered or `max_ticks` have run, and finally stops.
    pub fn run(
        &mut self,
        stop: &StopHandle,
        interval: Duration,
        max_ticks: Option<u64>,
    ) -> Result<u64, SessionError> {
        self.run_with(stop, interval, max_ticks, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `observer` after every tick.
    pub fn run_with<F>(
        &mut self,
        stop: &StopHandle,
        interval: Duration,
        max_ticks: Option<u64>,
        mut observer: F,
    ) -> Result<u64, SessionError>
    where
        F: FnMut(&Self, &TickReport),
    {
        if self.state == SessionState::Idle {
            self.start()?;
        }

        let mut ticks = 0;
        while !stop.is_triggered() && max_ticks.map_or(true, |max| ticks < max) {
            let began = Instant::now();
            let report = self.tick()?;
            ticks += 1;
            observer(self, &report);

            if let Some(rest) = interval.checked_sub(began.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        self.stop()?;
        Ok(ticks)
    }
}
