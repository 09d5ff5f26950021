//! Text protocol understood by the plotting process
//!
//! Each [`PlotCommand`] renders as exactly one line (without the newline).

use crate::report::constants::{CLIENT_COLOR, SERVER_COLOR};
use crate::report::settings::Role;
use std::fmt;

/// X-axis range of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XRange {
    /// Let the backend fit the whole series
    Full,
    /// Trailing window `[lo:hi]`
    Window(f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotCommand {
    Title(String),
    YLabel(String),
    YRange(f64, f64),
    XRange(XRange),
    /// Start of an inline data block drawn in the given colour
    Plot(&'static str),
    Point(f64, f64),
    EndData,
    /// Keep the window up until the user closes it
    Hold,
}

impl fmt::Display for PlotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotCommand::Title(title) => write!(f, "set title \"{}\"", escape(title)),
            PlotCommand::YLabel(label) => write!(f, "set ylabel \"{}\"", escape(label)),
            PlotCommand::YRange(lo, hi) => write!(f, "set yrange [{:.6}:{:.6}]", lo, hi),
            PlotCommand::XRange(XRange::Full) => write!(f, "set xrange [*:*]"),
            PlotCommand::XRange(XRange::Window(lo, hi)) => {
                write!(f, "set xrange [{}:{}]", general(*lo), general(*hi))
            }
            PlotCommand::Plot(color) => write!(
                f,
                "plot '-' with linespoints lw 2 linecolor rgb \"{}\" pt 7 notitle",
                color
            ),
            PlotCommand::Point(x, y) => write!(f, "{} {}", general(*x), general(*y)),
            PlotCommand::EndData => write!(f, "e"),
            PlotCommand::Hold => write!(f, "pause mouse close"),
        }
    }
}

/// Commands sent once when a plot opens
#[derive(Debug, Clone, PartialEq)]
pub struct PlotHeader {
    pub title: String,
    pub ylabel: String,
}

impl PlotHeader {
    pub fn commands(&self) -> Vec<PlotCommand> {
        vec![
            PlotCommand::Title(self.title.clone()),
            PlotCommand::YLabel(self.ylabel.clone()),
        ]
    }
}

/// One complete redraw of the series
#[derive(Debug, Clone, PartialEq)]
pub struct PlotFrame {
    pub y_range: (f64, f64),
    /// `None` leaves the backend's current x-range in place
    pub x_range: Option<XRange>,
    pub role: Role,
    pub points: Vec<(f64, f64)>,
}

impl PlotFrame {
    pub fn color(&self) -> &'static str {
        match self.role {
            Role::Client => CLIENT_COLOR,
            Role::Server => SERVER_COLOR,
        }
    }

    pub fn commands(&self) -> Vec<PlotCommand> {
        let mut commands = Vec::with_capacity(self.points.len() + 4);
        commands.push(PlotCommand::YRange(self.y_range.0, self.y_range.1));
        if let Some(x_range) = self.x_range {
            commands.push(PlotCommand::XRange(x_range));
        }
        commands.push(PlotCommand::Plot(self.color()));
        commands.extend(self.points.iter().map(|&(x, y)| PlotCommand::Point(x, y)));
        commands.push(PlotCommand::EndData);
        commands
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Shortest-form number with six significant digits, as C's `%g` prints it
pub fn general(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if !v.is_finite() {
        return v.to_string();
    }

    // Exponent after rounding to six significant digits
    let sci = format!("{:.5e}", v);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..6).contains(&exp) {
        let decimals = (5 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
