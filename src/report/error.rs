use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid role {0:?}: expected 'c' (client) or 's' (server)")]
    InvalidRole(String),

    #[error("invalid display unit {0:?}: expected one of G, M, K")]
    InvalidUnit(String),

    #[error("invalid format specifier {0:?}: expected one of B, K, M, G, A (upper case for bytes, lower case for bits)")]
    InvalidFormat(String),

    #[error("duration must be > 0")]
    InvalidDuration,

    #[error("interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("plot capacity must be > 0")]
    InvalidCapacity,

    #[error("average start index {start} must not exceed duration {duration}")]
    InvalidAverageStart { start: usize, duration: u32 },

    #[error("log_level must be one of: {0}")]
    InvalidLogLevel(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
