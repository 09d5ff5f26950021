//! Reporting session: configuration, running totals and the per-sample entry point

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod session;
pub mod settings;
pub mod totalizer;

pub use config::SessionConfig;
pub use constants::*;
pub use error::{ConfigError, Result};
pub use logging::{init_logging, init_logging_with_config};
pub use session::Session;
pub use settings::{DisplayUnit, Role, Settings};
pub use totalizer::{RunSummary, RunningTotal};
