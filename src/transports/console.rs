//! Console transport implementation

use crate::core::{render, Event, Formatter, Level, RawSink, Result, TextFormatter, Transport};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// Writes events to stdout or stderr
///
/// Each event is written with the stream locked, so concurrent events do
/// not interleave.
pub struct ConsoleTransport {
    target: ConsoleTarget,
    min_level: Level,
    formatter: Arc<dyn Formatter>,
    use_colors: bool,
}

impl ConsoleTransport {
    pub fn new(min_level: Level) -> Self {
        Self {
            target: ConsoleTarget::Stdout,
            min_level,
            formatter: Arc::new(TextFormatter::new()),
            use_colors: false,
        }
    }

    pub fn stderr(min_level: Level) -> Self {
        Self::new(min_level).with_target(ConsoleTarget::Stderr)
    }

    #[must_use]
    pub fn with_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Colour each line by level
    ///
    /// Has no effect unless the `console` feature is enabled.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    #[cfg(feature = "console")]
    fn colorize(&self, event: &Event, bytes: Vec<u8>) -> Vec<u8> {
        if !self.use_colors {
            return bytes;
        }
        let line = String::from_utf8_lossy(&bytes);
        let body = line.strip_suffix('\n').unwrap_or(&line);
        format!("{}\n", body.color(event.level.color_code())).into_bytes()
    }

    #[cfg(not(feature = "console"))]
    fn colorize(&self, _event: &Event, bytes: Vec<u8>) -> Vec<u8> {
        bytes
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl Transport for ConsoleTransport {
    fn write_log(&self, event: &Event) -> Result<()> {
        let bytes = self.colorize(event, render(self.formatter.as_ref(), event));
        self.write_raw(&bytes)
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn name(&self) -> &str {
        match self.target {
            ConsoleTarget::Stdout => "console",
            ConsoleTarget::Stderr => "console(stderr)",
        }
    }

    fn raw_sink(&self) -> Option<&dyn RawSink> {
        Some(self)
    }
}

impl RawSink for ConsoleTransport {
    fn write_raw(&self, bytes: &[u8]) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()?;
            }
            ConsoleTarget::Stderr => {
                let mut out = std::io::stderr().lock();
                out.write_all(bytes)?;
                out.flush()?;
            }
        }
        Ok(())
    }
}
