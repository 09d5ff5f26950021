use crate::report::settings::DisplayUnit;
use crate::units::{ScaleLevel, BYTE_TABLE};
use std::fmt;
use tracing::debug;

/// Session-wide transfer total and per-tick rate series.
///
/// Only `GByte` and `MByte` samples count toward the total, and only under a
/// Giga or Mega display unit. Smaller byte scales and all bit scales are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct RunningTotal {
    sum: f64,
    rates: Vec<f64>,
}

impl RunningTotal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a formatted byte sample to the total
    pub fn accumulate(&mut self, display_value: f64, label: &str, unit: DisplayUnit) {
        let added = match (BYTE_TABLE.level_of(label), unit) {
            (Some(ScaleLevel::Giga), DisplayUnit::Giga) => display_value,
            (Some(ScaleLevel::Giga), DisplayUnit::Mega) => display_value * 1000.0,
            (Some(ScaleLevel::Mega), DisplayUnit::Giga) => display_value / 1000.0,
            (Some(ScaleLevel::Mega), DisplayUnit::Mega) => display_value,
            _ => return,
        };
        self.sum += added;
        debug!(label, added, total = self.sum, "Accumulated transfer");
    }

    /// Store one tick's rate, already normalized to the display unit
    pub fn record_rate(&mut self, rate: f64) {
        self.rates.push(rate);
    }

    pub fn total(&self) -> f64 {
        self.sum
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.rates.clear();
    }

    /// Mean rate over ticks `start..duration`, divided by the full duration.
    ///
    /// Missing ticks count as zero.
    pub fn average(&self, duration: u32, start: usize) -> f64 {
        if duration == 0 {
            return 0.0;
        }
        let end = (duration as usize).min(self.rates.len());
        let sum: f64 = self.rates.get(start..end).map_or(0.0, |r| r.iter().sum());
        sum / f64::from(duration)
    }

    pub fn finalize_average(&self, duration: u32, start: usize, unit: DisplayUnit) -> RunSummary {
        RunSummary {
            duration,
            total: self.sum,
            mean_rate: self.average(duration, start),
            unit,
        }
    }
}

/// End-of-run totals in the configured display unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub duration: u32,
    pub total: f64,
    pub mean_rate: f64,
    pub unit: DisplayUnit,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = self.unit.symbol();
        write!(
            f,
            "Total:  0.00-{:3.2} sec  {:3.1} {}Bytes  {:4.1} {}bits/sec",
            f64::from(self.duration),
            self.total,
            u,
            self.mean_rate,
            u
        )
    }
}
