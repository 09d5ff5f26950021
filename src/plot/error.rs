use std::io;
use thiserror::Error;

/// Failures talking to the plotting backend
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("failed to spawn plotting program `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("plot pipe error: {0}")]
    Pipe(#[from] io::Error),

    #[error("plotting backend is not open")]
    NotOpen,
}

impl PlotError {
    /// Whether the backend process has gone away
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, PlotError::Pipe(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
