//! Command-line configuration for a reporting session
//!
//! Provides CLI argument parsing and validation for `ratescope`.

use crate::report::constants::*;
use crate::report::error::{ConfigError, Result};
use crate::report::settings::{DisplayUnit, Role, Settings};
use crate::units::FormatSpec;
use clap::Parser;
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[command(name = "ratescope")]
#[command(about = "Per-interval throughput reporting with a live plot")]
pub struct SessionConfig {
    /// Which end of the transfer is reporting (c = client, s = server)
    #[arg(long, default_value = "c")]
    pub role: Role,

    /// Peer address shown in the client plot title
    #[arg(long)]
    pub peer: Option<String>,

    /// Run length in seconds
    #[arg(long, default_value_t = DEFAULT_DURATION_SECS)]
    pub duration: u32,

    /// Seconds between reports
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: f64,

    /// Unit for the run total, average and plot axis (G, M or K)
    #[arg(long, default_value = "G")]
    pub unit: DisplayUnit,

    /// Report format: B/K/M/G for a fixed scale, A for adaptive (lower case for bits)
    #[arg(long, default_value = "a")]
    pub format: FormatSpec,

    /// Disable the live plot
    #[arg(long)]
    pub no_plot: bool,

    /// Plotting program fed through its stdin
    #[arg(long, default_value = DEFAULT_PLOT_PROGRAM)]
    pub plot_program: String,

    /// Maximum number of samples held by one plot
    #[arg(long, default_value_t = PLOT_CAPACITY_DEFAULT)]
    pub capacity: usize,

    /// First tick included in the run average
    #[arg(long, default_value_t = DEFAULT_AVERAGE_START)]
    pub average_start: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Log format (text or json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,
}

impl SessionConfig {
    /// Validates the configuration values
    pub fn validate(&self) -> Result<()> {
        debug!("Validating session configuration");

        if self.duration == 0 {
            return Err(ConfigError::InvalidDuration);
        }
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(ConfigError::InvalidInterval(self.interval));
        }
        if self.capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        if self.average_start > self.duration as usize {
            return Err(ConfigError::InvalidAverageStart {
                start: self.average_start,
                duration: self.duration,
            });
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(LOG_LEVELS.join(", ")));
        }

        debug!("Session configuration validated successfully");
        Ok(())
    }

    /// Returns true if JSON format logging is enabled
    pub fn is_json_format(&self) -> bool {
        self.log_format.to_lowercase() == "json"
    }

    pub fn settings(&self) -> Settings {
        Settings {
            role: self.role,
            duration: self.duration,
            unit: self.unit,
            interval: self.interval,
            peer: self.peer.clone(),
            plotting: !self.no_plot,
            capacity: self.capacity,
            average_start: self.average_start,
        }
    }
}
