use crate::plot::command::{PlotCommand, PlotFrame, PlotHeader};
use crate::plot::error::{PlotError, Result};
use std::cell::{Cell, RefCell};
use std::io::{BufWriter, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::rc::Rc;
use tracing::{debug, warn};

/// Destination for plot commands
pub trait PlotSink {
    /// Start the backend and send the header
    fn open(&mut self, header: &PlotHeader) -> Result<()>;

    /// Send one frame and flush
    fn render(&mut self, frame: &PlotFrame) -> Result<()>;

    /// Ask the backend to keep its window up until the user closes it
    fn hold(&mut self) -> Result<()>;

    /// Replace the y-axis label of an open plot
    fn relabel(&mut self, ylabel: &str) -> Result<()>;

    /// Release the backend. Never fails.
    fn close(&mut self);
}

impl<S: PlotSink + ?Sized> PlotSink for Box<S> {
    fn open(&mut self, header: &PlotHeader) -> Result<()> {
        (**self).open(header)
    }

    fn render(&mut self, frame: &PlotFrame) -> Result<()> {
        (**self).render(frame)
    }

    fn hold(&mut self) -> Result<()> {
        (**self).hold()
    }

    fn relabel(&mut self, ylabel: &str) -> Result<()> {
        (**self).relabel(ylabel)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Write each command as one line, then flush
fn write_commands<W: Write>(out: &mut W, commands: &[PlotCommand]) -> Result<()> {
    for command in commands {
        writeln!(out, "{}", command)?;
    }
    out.flush()?;
    Ok(())
}

/// Long-lived plotting process fed through its stdin
#[derive(Debug)]
pub struct GnuplotSink {
    program: String,
    child: Option<Child>,
    stdin: Option<BufWriter<ChildStdin>>,
}

impl GnuplotSink {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: None,
            stdin: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.stdin.is_some()
    }

    fn send(&mut self, commands: &[PlotCommand]) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or(PlotError::NotOpen)?;
        write_commands(stdin, commands)
    }
}

impl PlotSink for GnuplotSink {
    fn open(&mut self, header: &PlotHeader) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }

        debug!(program = %self.program, "Spawning plot process");
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlotError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| PlotError::Spawn {
            program: self.program.clone(),
            source: std::io::Error::other("stdin was not captured"),
        })?;
        self.stdin = Some(BufWriter::new(stdin));
        self.child = Some(child);

        self.send(&header.commands())
    }

    fn render(&mut self, frame: &PlotFrame) -> Result<()> {
        self.send(&frame.commands())
    }

    fn hold(&mut self) -> Result<()> {
        self.send(&[PlotCommand::Hold])
    }

    fn relabel(&mut self, ylabel: &str) -> Result<()> {
        self.send(&[PlotCommand::YLabel(ylabel.to_string())])
    }

    /// Closes the pipe and waits for the process, which stays up until its
    /// window is closed when a hold was sent.
    fn close(&mut self) {
        if let Some(mut stdin) = self.stdin.take() {
            if let Err(e) = stdin.flush() {
                debug!(error = %e, "Flush on close failed");
            }
        }
        if let Some(mut child) = self.child.take() {
            match child.wait() {
                Ok(status) => debug!(%status, "Plot process exited"),
                Err(e) => warn!(error = %e, "Failed to wait for plot process"),
            }
        }
    }
}

impl Drop for GnuplotSink {
    fn drop(&mut self) {
        // Dropping stdin sends EOF; the child is left to exit on its own.
        self.stdin.take();
    }
}

/// Sink that accepts everything and draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PlotSink for NullSink {
    fn open(&mut self, _header: &PlotHeader) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, _frame: &PlotFrame) -> Result<()> {
        Ok(())
    }

    fn hold(&mut self) -> Result<()> {
        Ok(())
    }

    fn relabel(&mut self, _ylabel: &str) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) {}
}

/// Sink that keeps every protocol line it is sent.
///
/// Clones share the same log, so a clone kept by the caller can inspect what
/// a session wrote.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    lines: Rc<RefCell<Vec<String>>>,
    open: Rc<Cell<bool>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }

    fn record(&self, commands: &[PlotCommand]) -> Result<()> {
        let mut buf = Vec::new();
        write_commands(&mut buf, commands)?;
        let text = String::from_utf8_lossy(&buf);
        self.lines
            .borrow_mut()
            .extend(text.lines().map(str::to_string));
        Ok(())
    }
}

impl PlotSink for RecordingSink {
    fn open(&mut self, header: &PlotHeader) -> Result<()> {
        self.open.set(true);
        self.record(&header.commands())
    }

    fn render(&mut self, frame: &PlotFrame) -> Result<()> {
        if !self.is_open() {
            return Err(PlotError::NotOpen);
        }
        self.record(&frame.commands())
    }

    fn hold(&mut self) -> Result<()> {
        if !self.is_open() {
            return Err(PlotError::NotOpen);
        }
        self.record(&[PlotCommand::Hold])
    }

    fn relabel(&mut self, ylabel: &str) -> Result<()> {
        if !self.is_open() {
            return Err(PlotError::NotOpen);
        }
        self.record(&[PlotCommand::YLabel(ylabel.to_string())])
    }

    fn close(&mut self) {
        self.open.set(false);
    }
}
