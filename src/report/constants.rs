//! Constants used throughout the reporting session

/// Run length in seconds when none is configured
pub const DEFAULT_DURATION_SECS: u32 = 10;

/// Seconds between reporting ticks when none is configured
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;

/// First per-tick rate sample included in the run average
pub const DEFAULT_AVERAGE_START: usize = 1;

/// Maximum number of samples one plot session holds
pub const PLOT_CAPACITY_DEFAULT: usize = 3600;

/// Width of the trailing x-axis window on long client runs
pub const SLIDING_WINDOW_SECS: f64 = 30.0;

/// Program spawned for the live plot
pub const DEFAULT_PLOT_PROGRAM: &str = "gnuplot";

/// Line colour of the client plot
pub const CLIENT_COLOR: &str = "#6aa194";

/// Line colour of the server plot
pub const SERVER_COLOR: &str = "#946aa1";

/// Accepted values for `--log-level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
