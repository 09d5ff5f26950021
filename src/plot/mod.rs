//! Live plotting of per-interval throughput through an external process

pub mod buffer;
pub mod command;
pub mod engine;
pub mod error;
pub mod sink;

pub use buffer::{BufferFull, PlotBuffer};
pub use command::{PlotCommand, PlotFrame, PlotHeader, XRange};
pub use engine::{axis_scale, AxisScale, BackendFailure, IngestOutcome, LivePlot, PlotState};
pub use error::{PlotError, Result as PlotResult};
pub use sink::{GnuplotSink, NullSink, PlotSink, RecordingSink};
