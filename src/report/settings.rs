//! Runtime settings shared by the formatter, totalizer and live plot

use crate::report::constants::*;
use crate::report::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Which end of the transfer this process reports for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "client" => Ok(Role::Client),
            "s" | "server" => Ok(Role::Server),
            _ => Err(ConfigError::InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Server => write!(f, "server"),
        }
    }
}

/// Unit the run total, average and plot axis are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    Giga,
    Mega,
    Kilo,
}

impl DisplayUnit {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'g' | 'G' => Some(DisplayUnit::Giga),
            'm' | 'M' => Some(DisplayUnit::Mega),
            'k' | 'K' => Some(DisplayUnit::Kilo),
            _ => None,
        }
    }

    /// Prefix letter used in the summary line and the axis label
    pub fn symbol(self) -> char {
        match self {
            DisplayUnit::Giga => 'G',
            DisplayUnit::Mega => 'M',
            DisplayUnit::Kilo => 'K',
        }
    }

    /// Y-axis label of the live plot
    pub fn axis_label(self) -> String {
        format!("{}bits/Sec", self.symbol())
    }
}

impl FromStr for DisplayUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                DisplayUnit::from_char(c).ok_or_else(|| ConfigError::InvalidUnit(s.to_string()))
            }
            _ => Err(ConfigError::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Session-wide settings, set once at startup by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub role: Role,
    pub duration: u32,
    pub unit: DisplayUnit,
    pub interval: f64,
    pub peer: Option<String>,
    pub plotting: bool,
    pub capacity: usize,
    pub average_start: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            role: Role::Client,
            duration: DEFAULT_DURATION_SECS,
            unit: DisplayUnit::Giga,
            interval: DEFAULT_INTERVAL_SECS,
            peer: None,
            plotting: true,
            capacity: PLOT_CAPACITY_DEFAULT,
            average_start: DEFAULT_AVERAGE_START,
        }
    }
}

impl Settings {
    /// Plot time at which a run is considered complete
    pub fn final_tick(&self) -> f64 {
        f64::from(self.duration) - 1.0
    }

    /// Title sent to the plot when it opens
    pub fn plot_title(&self) -> String {
        match (self.role, &self.peer) {
            (Role::Client, Some(peer)) => format!("Client - {}", peer),
            (Role::Client, None) => "Client".to_string(),
            (Role::Server, _) => "Server".to_string(),
        }
    }
}
