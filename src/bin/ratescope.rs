use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use ratescope::report::{init_logging_with_config, Session, SessionConfig};
use ratescope::units::{scan_magnitude, Base};
use std::io::{self, BufRead};
use tracing::{debug, error, info, warn};

fn main() {
    // Parse CLI arguments
    let config = SessionConfig::parse();

    init_logging_with_config(&config.log_level, config.is_json_format());

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config) {
        error!(error = %e, "Reporting failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Replay per-interval byte counts from stdin, one magnitude per line
fn run(config: SessionConfig) -> Result<()> {
    let mut session = Session::from_config(&config);
    let byte_spec = config.format.as_bytes();
    let rate_spec = config.format.as_bits();
    let interval = config.interval;
    let max_ticks = (f64::from(config.duration) / interval).round() as usize;

    info!(
        role = %config.role,
        duration_secs = config.duration,
        interval_secs = interval,
        unit = %config.unit,
        plotting = !config.no_plot,
        "Reporting session started"
    );

    println!(
        "{}",
        format!("{:<18} {:>12} {:>16}", "Interval", "Transfer", "Bandwidth").bold()
    );

    let stdin = io::stdin();
    let mut tick = 0usize;
    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read samples from stdin")?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let sample = scan_magnitude(text, Base::Binary);
        if !sample.number_found {
            warn!(line = line_no + 1, text, "Skipping line without a byte count");
            continue;
        }

        let start = tick as f64 * interval;
        let transfer = session.format(sample.value, byte_spec);
        let rate = session.format(sample.value / interval, rate_spec);
        println!(
            "[{:5.1}-{:5.1} sec]  {:>12}  {:>16}",
            start,
            start + interval,
            transfer.rendered.cyan(),
            format!("{}/sec", rate.rendered).green()
        );
        debug!(tick, bytes = sample.value, "Interval reported");

        tick += 1;
        if tick >= max_ticks {
            break;
        }
    }

    if tick == 0 {
        warn!("No samples were read");
    }

    session.print_summary();
    session.reset_plot();
    Ok(())
}
