//! Live plot state machine
//!
//! The plot opens lazily on the first Gbit/Mbit sample, or eagerly when a
//! client learns its peer. Every sample from the third one onwards redraws
//! the whole series with autoscaled axes. A backend that cannot be spawned,
//! or whose pipe breaks, puts the engine in [`PlotState::Unavailable`] until
//! the next reset. The formatter keeps working either way.

use crate::plot::buffer::PlotBuffer;
use crate::plot::command::{PlotFrame, PlotHeader, XRange};
use crate::plot::error::PlotError;
use crate::plot::sink::PlotSink;
use crate::report::constants::SLIDING_WINDOW_SECS;
use crate::report::settings::{DisplayUnit, Role, Settings};
use crate::units::ScaleLevel;
use tracing::{debug, info, warn};

/// Tolerance when comparing the accumulated plot time against the final tick
const TIME_EPSILON: f64 = 1e-9;

/// Index of the first sample that triggers a redraw
const FIRST_RENDER_INDEX: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotState {
    /// No backend; the next qualifying sample opens one
    Closed,
    /// Backend live and accumulating
    Open,
    /// Backend failed; samples skip plotting until reset
    Unavailable,
}

/// What happened to one sample handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Not a Gbit or Mbit sample
    Ignored,
    /// Backend unavailable, nothing plotted
    Skipped,
    /// Stored but not drawn yet
    Buffered,
    /// Stored and a frame was sent
    Rendered,
    /// Buffer full, sample dropped
    Rejected,
    /// Stored, but the backend failed while drawing it
    BackendLost,
}

/// Why the backend became unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFailure {
    /// The process could not be started or rejected a command
    Failed,
    /// The process went away mid-session and its pipe broke
    Disconnected,
}

/// Factor that maps a bit sample onto the configured axis, and the margin
/// added above and below the observed range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub factor: f64,
    pub spacing: f64,
}

/// Axis mapping for a `Gbit` or `Mbit` source; other scales are not plotted
pub fn axis_scale(source: ScaleLevel, unit: DisplayUnit) -> Option<AxisScale> {
    let (factor, spacing) = match (unit, source) {
        (DisplayUnit::Giga, ScaleLevel::Giga) => (1.0, 2.0),
        (DisplayUnit::Giga, ScaleLevel::Mega) => (1000.0, 2000.0),
        (DisplayUnit::Mega, ScaleLevel::Giga) => (1000.0, 2000.0),
        (DisplayUnit::Mega, ScaleLevel::Mega) => (1.0, 2.0),
        (DisplayUnit::Kilo, ScaleLevel::Giga) => (1_000_000.0, 1_000_000.0),
        (DisplayUnit::Kilo, ScaleLevel::Mega) => (1000.0, 1000.0),
        _ => return None,
    };
    Some(AxisScale { factor, spacing })
}

pub struct LivePlot<S: PlotSink> {
    sink: S,
    state: PlotState,
    buffer: PlotBuffer,
    completed: bool,
    overflow_reported: bool,
    failure: Option<BackendFailure>,
}

impl<S: PlotSink> LivePlot<S> {
    pub fn new(sink: S, capacity: usize) -> Self {
        Self {
            sink,
            state: PlotState::Closed,
            buffer: PlotBuffer::new(capacity),
            completed: false,
            overflow_reported: false,
            failure: None,
        }
    }

    pub fn state(&self) -> PlotState {
        self.state
    }

    pub fn buffer(&self) -> &PlotBuffer {
        &self.buffer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Set while the engine is [`PlotState::Unavailable`]
    pub fn failure(&self) -> Option<BackendFailure> {
        self.failure
    }

    /// Open the backend if closed. Returns whether it is open afterwards.
    pub fn open(&mut self, settings: &Settings) -> bool {
        match self.state {
            PlotState::Open => true,
            PlotState::Unavailable => false,
            PlotState::Closed => {
                let header = PlotHeader {
                    title: settings.plot_title(),
                    ylabel: settings.unit.axis_label(),
                };
                match self.sink.open(&header) {
                    Ok(()) => {
                        info!(title = %header.title, role = %settings.role, "Live plot opened");
                        self.state = PlotState::Open;
                        true
                    }
                    Err(e) => {
                        self.degrade(&e);
                        false
                    }
                }
            }
        }
    }

    /// Add one bit-rate sample and redraw when enough samples exist
    pub fn ingest(&mut self, settings: &Settings, value: f64, source: ScaleLevel) -> IngestOutcome {
        let Some(scale) = axis_scale(source, settings.unit) else {
            return IngestOutcome::Ignored;
        };
        if !self.open(settings) {
            return IngestOutcome::Skipped;
        }

        let normalized = value * scale.factor;
        let index = match self.buffer.push(normalized, settings.interval) {
            Ok(index) => index,
            Err(full) => {
                if !self.overflow_reported {
                    warn!(capacity = full.capacity, "Plot buffer full, dropping further samples");
                    self.overflow_reported = true;
                }
                return IngestOutcome::Rejected;
            }
        };

        let now = self.buffer.time_cursor();
        let at_end = (now - settings.final_tick()).abs() < TIME_EPSILON;
        debug!(index, time = now, value = normalized, "Plot sample stored");

        let mut outcome = IngestOutcome::Buffered;
        if index >= FIRST_RENDER_INDEX {
            let frame = self.frame(settings, scale.spacing, now, at_end);
            if let Err(e) = self.sink.render(&frame) {
                self.degrade(&e);
                return IngestOutcome::BackendLost;
            }
            outcome = IngestOutcome::Rendered;
        }

        if at_end && settings.role == Role::Client && !self.completed {
            if let Err(e) = self.sink.hold() {
                self.degrade(&e);
                return IngestOutcome::BackendLost;
            }
            self.completed = true;
            info!("Run complete, holding plot window open");
        }

        outcome
    }

    /// Resend the y-axis label of an open plot after a unit change
    pub fn relabel(&mut self, settings: &Settings) {
        if self.state != PlotState::Open {
            return;
        }
        let ylabel = settings.unit.axis_label();
        debug!(ylabel = %ylabel, "Relabeling plot axis");
        if let Err(e) = self.sink.relabel(&ylabel) {
            self.degrade(&e);
        }
    }

    fn frame(&self, settings: &Settings, spacing: f64, now: f64, at_end: bool) -> PlotFrame {
        let high = self.buffer.high();
        let low = self.buffer.low().unwrap_or(high);

        let x_range = if at_end {
            Some(XRange::Full)
        } else if now > SLIDING_WINDOW_SECS && settings.role != Role::Server {
            Some(XRange::Window(now - SLIDING_WINDOW_SECS, now))
        } else {
            None
        };

        PlotFrame {
            y_range: (low - spacing, high + spacing),
            x_range,
            role: settings.role,
            points: self.buffer.points().collect(),
        }
    }

    /// Hold and close an open backend, then clear the series
    pub fn reset(&mut self) {
        if self.state == PlotState::Open {
            if let Err(e) = self.sink.hold() {
                debug!(error = %e, "Hold on reset failed");
            }
            self.sink.close();
            info!("Live plot closed");
        }
        self.buffer.clear();
        self.state = PlotState::Closed;
        self.completed = false;
        self.overflow_reported = false;
        self.failure = None;
    }

    fn degrade(&mut self, error: &PlotError) {
        let failure = if error.is_broken_pipe() {
            warn!(error = %error, "Plot window went away, continuing without it");
            BackendFailure::Disconnected
        } else {
            warn!(error = %error, "Live plot unavailable, continuing without it");
            BackendFailure::Failed
        };
        self.sink.close();
        self.state = PlotState::Unavailable;
        self.failure = Some(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::error::Result;
    use crate::plot::sink::RecordingSink;
    use mockall::mock;
    use std::io;

    mock! {
        pub Sink {}

        impl PlotSink for Sink {
            fn open(&mut self, header: &PlotHeader) -> Result<()>;
            fn render(&mut self, frame: &PlotFrame) -> Result<()>;
            fn hold(&mut self) -> Result<()>;
            fn relabel(&mut self, ylabel: &str) -> Result<()>;
            fn close(&mut self);
        }
    }

    fn settings(role: Role, unit: DisplayUnit, duration: u32) -> Settings {
        Settings {
            role,
            unit,
            duration,
            ..Settings::default()
        }
    }

    fn recording(capacity: usize) -> (LivePlot<RecordingSink>, RecordingSink) {
        let sink = RecordingSink::new();
        let observer = sink.clone();
        (LivePlot::new(sink, capacity), observer)
    }

    #[test]
    fn test_axis_scale_table() {
        use DisplayUnit::*;
        let cases = [
            (Giga, ScaleLevel::Giga, 1.0, 2.0),
            (Giga, ScaleLevel::Mega, 1000.0, 2000.0),
            (Mega, ScaleLevel::Giga, 1000.0, 2000.0),
            (Mega, ScaleLevel::Mega, 1.0, 2.0),
            (Kilo, ScaleLevel::Giga, 1_000_000.0, 1_000_000.0),
            (Kilo, ScaleLevel::Mega, 1000.0, 1000.0),
        ];
        for (unit, source, factor, spacing) in cases {
            assert_eq!(axis_scale(source, unit), Some(AxisScale { factor, spacing }));
        }
        assert_eq!(axis_scale(ScaleLevel::Kilo, Giga), None);
        assert_eq!(axis_scale(ScaleLevel::Unit, Mega), None);
    }

    #[test]
    fn test_first_render_on_third_sample() {
        let s = settings(Role::Client, DisplayUnit::Giga, 100);
        let (mut plot, observer) = recording(64);

        assert_eq!(plot.ingest(&s, 9.0, ScaleLevel::Giga), IngestOutcome::Buffered);
        assert_eq!(plot.ingest(&s, 9.5, ScaleLevel::Giga), IngestOutcome::Buffered);
        assert_eq!(
            observer.lines(),
            vec!["set title \"Client\"", "set ylabel \"Gbits/Sec\""]
        );

        assert_eq!(plot.ingest(&s, 9.2, ScaleLevel::Giga), IngestOutcome::Rendered);
        let lines = observer.lines();
        assert_eq!(lines[2], "set yrange [7.000000:11.500000]");
        assert_eq!(
            lines[3],
            "plot '-' with linespoints lw 2 linecolor rgb \"#6aa194\" pt 7 notitle"
        );
        assert_eq!(&lines[4..], &["0 9", "1 9.5", "2 9.2", "e"]);
    }

    #[test]
    fn test_bounds_follow_samples() {
        let s = settings(Role::Server, DisplayUnit::Giga, 100);
        let (mut plot, observer) = recording(64);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            plot.ingest(&s, v, ScaleLevel::Giga);
        }
        let lines = observer.lines();
        assert_eq!(lines[0], "set title \"Server\"");
        assert_eq!(lines[1], "set ylabel \"Gbits/Sec\"");
        assert!(lines.contains(&"plot '-' with linespoints lw 2 linecolor rgb \"#946aa1\" pt 7 notitle".to_string()));
        assert_eq!(plot.buffer().low(), Some(1.0));
        assert_eq!(plot.buffer().high(), 5.0);
        assert_eq!(plot.buffer().len(), 5);
    }

    #[test]
    fn test_mbit_samples_under_giga_axis() {
        let s = settings(Role::Server, DisplayUnit::Giga, 100);
        let (mut plot, observer) = recording(64);
        for v in [400.0, 500.0, 600.0] {
            plot.ingest(&s, v, ScaleLevel::Mega);
        }
        assert_eq!(plot.buffer().high(), 600_000.0);
        assert!(observer
            .lines()
            .contains(&"set yrange [398000.000000:602000.000000]".to_string()));
    }

    #[test]
    fn test_non_rate_scales_are_ignored() {
        let s = settings(Role::Client, DisplayUnit::Giga, 100);
        let (mut plot, observer) = recording(64);
        assert_eq!(plot.ingest(&s, 5.0, ScaleLevel::Kilo), IngestOutcome::Ignored);
        assert_eq!(plot.state(), PlotState::Closed);
        assert!(observer.lines().is_empty());
    }

    #[test]
    fn test_final_tick_uses_full_range_and_holds() {
        let s = settings(Role::Client, DisplayUnit::Giga, 5);
        let (mut plot, observer) = recording(64);
        for v in [1.0, 2.0, 3.0, 4.0] {
            plot.ingest(&s, v, ScaleLevel::Giga);
        }
        let lines = observer.lines();
        assert!(lines.contains(&"set xrange [*:*]".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("pause mouse close"));

        // hold is only sent once per session
        plot.ingest(&s, 5.0, ScaleLevel::Giga);
        let holds = observer
            .lines()
            .iter()
            .filter(|l| l.as_str() == "pause mouse close")
            .count();
        assert_eq!(holds, 1);
    }

    #[test]
    fn test_server_never_holds_on_completion() {
        let s = settings(Role::Server, DisplayUnit::Giga, 5);
        let (mut plot, observer) = recording(64);
        for v in [1.0, 2.0, 3.0, 4.0] {
            plot.ingest(&s, v, ScaleLevel::Giga);
        }
        assert!(!observer.lines().contains(&"pause mouse close".to_string()));
    }

    #[test]
    fn test_sliding_window_for_long_client_runs() {
        let s = settings(Role::Client, DisplayUnit::Giga, 100);
        let (mut plot, observer) = recording(64);
        for _ in 0..31 {
            plot.ingest(&s, 9.0, ScaleLevel::Giga);
        }
        let lines = observer.lines();
        assert!(lines.contains(&"set xrange [1:31]".to_string()));
        assert!(!lines.iter().any(|l| l == "set xrange [0:30]"));
    }

    #[test]
    fn test_server_has_no_sliding_window() {
        let s = settings(Role::Server, DisplayUnit::Giga, 100);
        let (mut plot, observer) = recording(64);
        for _ in 0..40 {
            plot.ingest(&s, 9.0, ScaleLevel::Giga);
        }
        assert!(!observer.lines().iter().any(|l| l.starts_with("set xrange")));
    }

    #[test]
    fn test_reset_holds_closes_and_clears() {
        let s = settings(Role::Client, DisplayUnit::Mega, 100);
        let (mut plot, observer) = recording(64);
        for v in [100.0, 200.0, 300.0] {
            plot.ingest(&s, v, ScaleLevel::Mega);
        }
        plot.reset();

        assert_eq!(plot.state(), PlotState::Closed);
        assert_eq!(plot.buffer().low(), None);
        assert_eq!(plot.buffer().high(), 0.0);
        assert_eq!(plot.buffer().len(), 0);
        assert_eq!(plot.buffer().time_cursor(), 0.0);
        assert!(!observer.is_open());
        assert_eq!(
            observer.lines().last().map(String::as_str),
            Some("pause mouse close")
        );

        // next sample reopens with a fresh header
        observer.clear();
        plot.ingest(&s, 100.0, ScaleLevel::Mega);
        assert_eq!(plot.state(), PlotState::Open);
        assert_eq!(observer.lines()[0], "set title \"Client\"");
    }

    #[test]
    fn test_capacity_rejects_extra_samples() {
        let s = settings(Role::Server, DisplayUnit::Giga, 100);
        let (mut plot, _observer) = recording(3);
        for _ in 0..3 {
            plot.ingest(&s, 1.0, ScaleLevel::Giga);
        }
        assert_eq!(plot.ingest(&s, 1.0, ScaleLevel::Giga), IngestOutcome::Rejected);
        assert_eq!(plot.buffer().len(), 3);
        assert_eq!(plot.state(), PlotState::Open);
    }

    #[test]
    fn test_spawn_failure_degrades_once() {
        let mut sink = MockSink::new();
        sink.expect_open().times(1).returning(|_| {
            Err(PlotError::Spawn {
                program: "gnuplot".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            })
        });
        sink.expect_close().return_const(());
        sink.expect_render().never();

        let s = settings(Role::Server, DisplayUnit::Giga, 100);
        let mut plot = LivePlot::new(sink, 64);
        for _ in 0..5 {
            assert_eq!(plot.ingest(&s, 1.0, ScaleLevel::Giga), IngestOutcome::Skipped);
        }
        assert_eq!(plot.state(), PlotState::Unavailable);
        assert_eq!(plot.failure(), Some(BackendFailure::Failed));
        assert!(plot.buffer().is_empty());
    }

    #[test]
    fn test_broken_pipe_degrades_to_unavailable() {
        let mut sink = MockSink::new();
        sink.expect_open().times(1).returning(|_| Ok(()));
        sink.expect_render()
            .times(1)
            .returning(|_| Err(PlotError::Pipe(io::Error::from(io::ErrorKind::BrokenPipe))));
        sink.expect_close().times(1).return_const(());

        let s = settings(Role::Server, DisplayUnit::Giga, 100);
        let mut plot = LivePlot::new(sink, 64);
        plot.ingest(&s, 1.0, ScaleLevel::Giga);
        plot.ingest(&s, 2.0, ScaleLevel::Giga);
        assert_eq!(plot.ingest(&s, 3.0, ScaleLevel::Giga), IngestOutcome::BackendLost);
        assert_eq!(plot.state(), PlotState::Unavailable);
        assert_eq!(plot.failure(), Some(BackendFailure::Disconnected));
        assert_eq!(plot.ingest(&s, 4.0, ScaleLevel::Giga), IngestOutcome::Skipped);
    }

    #[test]
    fn test_reset_after_failure_allows_retry() {
        let mut sink = MockSink::new();
        let mut attempts = 0;
        sink.expect_open().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Err(PlotError::NotOpen)
            } else {
                Ok(())
            }
        });
        sink.expect_close().return_const(());

        let s = settings(Role::Server, DisplayUnit::Giga, 100);
        let mut plot = LivePlot::new(sink, 64);
        assert_eq!(plot.ingest(&s, 1.0, ScaleLevel::Giga), IngestOutcome::Skipped);
        assert_eq!(plot.failure(), Some(BackendFailure::Failed));
        plot.reset();
        assert_eq!(plot.failure(), None);
        assert_eq!(plot.ingest(&s, 1.0, ScaleLevel::Giga), IngestOutcome::Buffered);
        assert_eq!(plot.state(), PlotState::Open);
    }

    #[test]
    fn test_relabel_only_when_open() {
        let mut sink = MockSink::new();
        sink.expect_relabel().never();
        let s = settings(Role::Client, DisplayUnit::Mega, 100);
        let mut plot = LivePlot::new(sink, 64);
        plot.relabel(&s);
        assert_eq!(plot.state(), PlotState::Closed);
    }

    #[test]
    fn test_relabel_failure_degrades() {
        let mut sink = MockSink::new();
        sink.expect_open().times(1).returning(|_| Ok(()));
        sink.expect_relabel()
            .times(1)
            .returning(|_| Err(PlotError::Pipe(io::Error::from(io::ErrorKind::BrokenPipe))));
        sink.expect_close().times(1).return_const(());

        let s = settings(Role::Client, DisplayUnit::Giga, 100);
        let mut plot = LivePlot::new(sink, 64);
        assert!(plot.open(&s));
        plot.relabel(&s);
        assert_eq!(plot.state(), PlotState::Unavailable);
        assert_eq!(plot.failure(), Some(BackendFailure::Disconnected));
    }
}
