//! Transport over any `std::io::Write`

use crate::core::{
    render, Event, Formatter, Level, LoggerError, RawSink, Result, TextFormatter, Transport,
};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Writes formatted events to a wrapped writer
///
/// Writes are serialized by an internal mutex, so one event's bytes are
/// never interleaved with another's.
pub struct WriterTransport<W: Write + Send> {
    writer: Mutex<W>,
    min_level: Level,
    formatter: Arc<dyn Formatter>,
    name: String,
}

impl<W: Write + Send> WriterTransport<W> {
    /// Text-formatted transport over `writer`
    pub fn new(writer: W, min_level: Level) -> Self {
        Self {
            writer: Mutex::new(writer),
            min_level,
            formatter: Arc::new(TextFormatter::new()),
            name: "writer".to_string(),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn formatter(&self) -> &Arc<dyn Formatter> {
        &self.formatter
    }

    /// Recover the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Transport for WriterTransport<W> {
    fn write_log(&self, event: &Event) -> Result<()> {
        let bytes = render(self.formatter.as_ref(), event);
        self.write_raw(&bytes)
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn raw_sink(&self) -> Option<&dyn RawSink> {
        Some(self)
    }
}

impl<W: Write + Send> RawSink for WriterTransport<W> {
    fn write_raw(&self, bytes: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        writer
            .write_all(bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| LoggerError::io_operation("writing log event", self.name.clone(), e))
    }
}

/// Cloneable in-memory writer; every clone appends to the same buffer
///
/// ```
/// use rust_log_dispatch::transports::SharedBuffer;
/// use std::io::Write;
///
/// let buffer = SharedBuffer::new();
/// let mut handle = buffer.clone();
/// handle.write_all(b"hello\n").unwrap();
/// assert_eq!(buffer.lines(), vec!["hello".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.inner.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fields, JsonFormatter};

    struct BrokenFormatter;

    impl Formatter for BrokenFormatter {
        fn format(&self, _event: &Event) -> Result<Vec<u8>> {
            Err(LoggerError::formatter("broken", "cannot encode"))
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_text_lines() {
        let buffer = SharedBuffer::new();
        let transport = WriterTransport::new(buffer.clone(), Level::INFO);

        transport.write_log(&Event::new(Level::INFO, "first")).unwrap();
        transport.write_log(&Event::new(Level::ERROR, "second")).unwrap();

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] first"));
        assert!(lines[1].ends_with("[ERROR] second"));
    }

    #[test]
    fn test_json_formatter() {
        let buffer = SharedBuffer::new();
        let transport = WriterTransport::new(buffer.clone(), Level::DEBUG)
            .with_formatter(Arc::new(JsonFormatter::new()));

        let event = Event::new(Level::INFO, "m").with_fields(Fields::new().with_field("user", "cesar"));
        transport.write_log(&event).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer.bytes()).unwrap();
        assert_eq!(parsed["user"], "cesar");
    }

    #[test]
    fn test_formatter_failure_writes_fallback_line() {
        let buffer = SharedBuffer::new();
        let transport = WriterTransport::new(buffer.clone(), Level::DEBUG)
            .with_formatter(Arc::new(BrokenFormatter));

        let event = Event::new(Level::WARN, "still here").with_fields(Fields::new().with_field("k", 1));
        assert!(transport.write_log(&event).is_ok());

        let contents = buffer.contents();
        assert!(contents.ends_with(" [WARN] still here\n"));
        assert!(!contents.contains("k=1"));
    }

    #[test]
    fn test_writer_error_is_reported() {
        let transport = WriterTransport::new(BrokenWriter, Level::DEBUG).with_name("broken");
        let result = transport.write_log(&Event::new(Level::ERROR, "lost"));
        assert!(matches!(result, Err(LoggerError::IoOperation { .. })));
    }

    #[test]
    fn test_raw_sink_bypasses_formatter() {
        let buffer = SharedBuffer::new();
        let transport = WriterTransport::new(buffer.clone(), Level::DEBUG);

        let sink = transport.raw_sink().expect("writer exposes a raw sink");
        sink.write_raw(b"pre-encoded\n").unwrap();

        assert_eq!(buffer.contents(), "pre-encoded\n");
    }
}
