//! File transport implementation

use crate::core::{
    render, Closeable, Event, Formatter, Level, LoggerError, RawSink, Result, TextFormatter,
    Transport,
};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Appends formatted events to a file
///
/// # Examples
///
/// ```no_run
/// use rust_log_dispatch::prelude::*;
/// use std::sync::Arc;
///
/// let transport = FileTransport::open("/var/log/app.log", Level::INFO)
///     .unwrap()
///     .with_formatter(Arc::new(JsonFormatter::new()));
/// ```
pub struct FileTransport {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
    min_level: Level,
    formatter: Arc<dyn Formatter>,
}

impl FileTransport {
    /// Open `path` for appending, creating it and its parent directory
    pub fn open(path: impl Into<PathBuf>, min_level: Level) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_transport(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(Some(BufWriter::new(file))),
            min_level,
            formatter: Arc::new(TextFormatter::new()),
        })
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.writer.lock().is_none()
    }
}

impl Transport for FileTransport {
    fn write_log(&self, event: &Event) -> Result<()> {
        let bytes = render(self.formatter.as_ref(), event);
        self.write_raw(&bytes)
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn name(&self) -> &str {
        "file"
    }

    fn raw_sink(&self) -> Option<&dyn RawSink> {
        Some(self)
    }

    fn closeable(&self) -> Option<&dyn Closeable> {
        Some(self)
    }
}

impl RawSink for FileTransport {
    fn write_raw(&self, bytes: &[u8]) -> Result<()> {
        let mut guard = self.writer.lock();
        let writer = guard
            .as_mut()
            .ok_or_else(|| LoggerError::closed(self.path.display().to_string()))?;

        writer
            .write_all(bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::file_transport(
                    self.path.display().to_string(),
                    format!("Failed to write log event: {}", e),
                )
            })
    }
}

impl Closeable for FileTransport {
    /// Flush and release the file; later writes fail with `TransportClosed`
    fn close(&self) -> Result<()> {
        if let Some(mut writer) = self.writer.lock().take() {
            writer.flush().map_err(|e| {
                LoggerError::file_transport(
                    self.path.display().to_string(),
                    format!("Failed to flush on close: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

impl Drop for FileTransport {
    fn drop(&mut self) {
        // Best effort flush - errors have nowhere to go during drop
        if let Some(mut writer) = self.writer.get_mut().take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_transport_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let transport = FileTransport::open(&path, Level::INFO).unwrap();
        transport.write_log(&Event::new(Level::INFO, "one")).unwrap();
        transport.write_log(&Event::new(Level::ERROR, "two")).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[INFO] one\n"));
        assert!(contents.contains("[ERROR] two\n"));
    }

    #[test]
    fn test_reopen_keeps_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("append.log");

        {
            let transport = FileTransport::open(&path, Level::DEBUG).unwrap();
            transport.write_log(&Event::new(Level::INFO, "before")).unwrap();
        }
        let transport = FileTransport::open(&path, Level::DEBUG).unwrap();
        transport.write_log(&Event::new(Level::INFO, "after")).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");

        let transport = FileTransport::open(&path, Level::INFO).unwrap();
        assert_eq!(transport.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = tempdir().unwrap();
        let transport = FileTransport::open(dir.path().join("closed.log"), Level::INFO).unwrap();

        transport.close().unwrap();
        assert!(transport.is_closed());
        assert!(transport.close().is_ok());

        let result = transport.write_log(&Event::new(Level::ERROR, "too late"));
        assert!(matches!(result, Err(LoggerError::TransportClosed { .. })));
    }
}
