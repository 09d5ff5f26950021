//! One reporting session: formatting with its totals and plot side effects
//!
//! Every formatted sample passes through [`Session::format`], which updates
//! the running total for `GByte`/`MByte` samples and feeds `Gbit`/`Mbit`
//! samples to the live plot. The session is single-owner; wrap it in a
//! `Mutex` to report from several threads.

use crate::plot::{axis_scale, GnuplotSink, IngestOutcome, LivePlot, PlotSink};
use crate::report::config::SessionConfig;
use crate::report::settings::{DisplayUnit, Role, Settings};
use crate::report::totalizer::{RunSummary, RunningTotal};
use crate::units::{format_value, truncate_to_buffer, FormatResult, FormatSpec, Quantity};
use tracing::{debug, info};

pub struct Session<S: PlotSink = Box<dyn PlotSink>> {
    settings: Settings,
    totals: RunningTotal,
    plot: LivePlot<S>,
}

impl Session<Box<dyn PlotSink>> {
    /// Session plotting through `plot_program`. The process is only spawned
    /// once plotting is enabled and a rate sample arrives.
    pub fn new(settings: Settings, plot_program: &str) -> Self {
        let sink: Box<dyn PlotSink> = Box::new(GnuplotSink::new(plot_program));
        Self::with_sink(settings, sink)
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        let mut session = Self::new(config.settings(), &config.plot_program);
        if let Some(peer) = &config.peer {
            session.set_peer_address(peer.clone());
        }
        session
    }
}

impl<S: PlotSink> Session<S> {
    pub fn with_sink(settings: Settings, sink: S) -> Self {
        let plot = LivePlot::new(sink, settings.capacity);
        Self {
            settings,
            totals: RunningTotal::new(),
            plot,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn totals(&self) -> &RunningTotal {
        &self.totals
    }

    pub fn plot(&self) -> &LivePlot<S> {
        &self.plot
    }

    pub fn set_role(&mut self, role: Role) {
        self.settings.role = role;
    }

    pub fn set_duration(&mut self, seconds: u32) {
        self.settings.duration = seconds;
    }

    /// Change the display unit. An open plot gets the new axis label; points
    /// already drawn keep the scale they were stored with.
    pub fn set_unit(&mut self, unit: DisplayUnit) {
        if unit == self.settings.unit {
            return;
        }
        self.settings.unit = unit;
        self.plot.relabel(&self.settings);
    }

    pub fn set_interval(&mut self, seconds: f64) {
        self.settings.interval = seconds;
    }

    /// Record the peer and, on a plotting client, open the plot titled with it
    pub fn set_peer_address(&mut self, peer: impl Into<String>) {
        self.settings.peer = Some(peer.into());
        if self.settings.plotting && self.settings.role == Role::Client {
            self.plot.open(&self.settings);
        }
    }

    /// Turning plotting off closes a plot that is currently open
    pub fn set_plotting(&mut self, enabled: bool) {
        if !enabled && self.settings.plotting {
            self.plot.reset();
        }
        self.settings.plotting = enabled;
    }

    /// Format one sample and apply its totalizer and plot side effects
    pub fn format(&mut self, raw: f64, spec: FormatSpec) -> FormatResult {
        let result = format_value(raw, spec);
        debug!(raw, spec = %spec, rendered = %result.rendered, "Formatted sample");

        match result.quantity {
            Quantity::Bytes => {
                self.totals
                    .accumulate(result.display_value, result.label, self.settings.unit);
            }
            Quantity::Bits => self.record_rate(&result),
        }
        result
    }

    /// Format into `out`, which is cleared first and holds at most
    /// `max_len - 1` bytes afterwards.
    pub fn format_into(&mut self, out: &mut String, max_len: usize, raw: f64, spec: FormatSpec) {
        let result = self.format(raw, spec);
        out.clear();
        out.push_str(truncate_to_buffer(&result.rendered, max_len));
    }

    fn record_rate(&mut self, result: &FormatResult) {
        let Some(scale) = axis_scale(result.level, self.settings.unit) else {
            return;
        };
        self.totals.record_rate(result.display_value * scale.factor);

        if self.settings.plotting {
            let outcome = self
                .plot
                .ingest(&self.settings, result.display_value, result.level);
            if outcome == IngestOutcome::BackendLost {
                debug!("Plot backend lost; reporting continues without it");
            }
        }
    }

    /// Close the plot and clear its series. Totals are kept.
    pub fn reset_plot(&mut self) {
        self.plot.reset();
    }

    pub fn reset_totals(&mut self) {
        self.totals.reset();
    }

    pub fn summary(&self) -> RunSummary {
        self.totals.finalize_average(
            self.settings.duration,
            self.settings.average_start,
            self.settings.unit,
        )
    }

    /// Print the summary line to stderr and log it
    pub fn print_summary(&self) -> RunSummary {
        let summary = self.summary();
        eprintln!("{}", summary);
        info!(
            duration_secs = summary.duration,
            total = summary.total,
            mean_rate = summary.mean_rate,
            unit = %summary.unit,
            "Run summary"
        );
        summary
    }
}
