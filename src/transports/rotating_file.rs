//! Rotating file transport
//!
//! Rotates the active log file by size, by time or on a daily schedule.
//! Rotated files are renamed `<name>.1`, `<name>.2`, ... (newest first),
//! optionally gzip-compressed to `<name>.N.gz`, and pruned by count and by
//! age.

use crate::core::{
    render, Closeable, Event, Formatter, Level, LoggerError, RawSink, Result, TextFormatter,
    Transport,
};
use chrono::{DateTime, Local, Timelike};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Rotation strategy defining when to rotate log files
///
/// # Examples
///
/// ```
/// use rust_log_dispatch::transports::RotationStrategy;
/// use std::time::Duration;
///
/// // Rotate when file exceeds 100 MB
/// let size_strategy = RotationStrategy::Size { max_bytes: 100 * 1024 * 1024 };
///
/// // Rotate daily at midnight
/// let daily_strategy = RotationStrategy::Daily { hour: 0 };
///
/// // Rotate on size OR time, whichever comes first
/// let hybrid_strategy = RotationStrategy::Hybrid {
///     max_bytes: 50 * 1024 * 1024,
///     interval: Duration::from_secs(24 * 3600),
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RotationStrategy {
    /// Rotate when file exceeds size in bytes
    Size { max_bytes: u64 },

    /// Rotate at time interval
    Time { interval: Duration },

    /// Rotate daily at specified hour (0-23)
    Daily { hour: u8 },

    /// Rotate hourly
    Hourly,

    /// Rotate on size OR time, whichever comes first
    Hybrid { max_bytes: u64, interval: Duration },

    /// No rotation (useful when external rotation is used)
    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Size {
            max_bytes: 100 * 1024 * 1024,
        }
    }
}

impl RotationStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationStrategy::Size { max_bytes }
    }

    /// Size limit in whole megabytes
    #[must_use]
    pub fn megabytes(max_mb: u64) -> Self {
        RotationStrategy::Size {
            max_bytes: max_mb.saturating_mul(1024 * 1024),
        }
    }

    #[must_use]
    pub fn time(interval: Duration) -> Self {
        RotationStrategy::Time { interval }
    }

    /// Daily rotation at `hour`, clamped to 23
    #[must_use]
    pub fn daily(hour: u8) -> Self {
        RotationStrategy::Daily { hour: hour.min(23) }
    }

    #[must_use]
    pub fn hybrid(max_bytes: u64, interval: Duration) -> Self {
        RotationStrategy::Hybrid { max_bytes, interval }
    }
}

/// Configuration for the rotating file transport
///
/// ```
/// use rust_log_dispatch::transports::{RotationPolicy, RotationStrategy};
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::megabytes(50))
///     .with_max_backups(7)
///     .with_max_age(Duration::from_secs(7 * 24 * 3600))
///     .with_compression(true);
/// assert_eq!(policy.max_file_size(), Some(50 * 1024 * 1024));
/// ```
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pub strategy: RotationStrategy,
    /// Maximum number of rotated files to keep (at least one is kept)
    pub max_backup_files: usize,
    /// Rotated files older than this are deleted
    pub max_age: Option<Duration>,
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            max_backup_files: 5,
            max_age: None,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Shorthand for `with_strategy(RotationStrategy::Size { max_bytes })`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, max_bytes: u64) -> Self {
        self.strategy = RotationStrategy::Size { max_bytes };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, age: Duration) -> Self {
        self.max_age = Some(age);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Size limit, if the strategy has one
    #[must_use]
    pub fn max_file_size(&self) -> Option<u64> {
        match &self.strategy {
            RotationStrategy::Size { max_bytes } => Some(*max_bytes),
            RotationStrategy::Hybrid { max_bytes, .. } => Some(*max_bytes),
            _ => None,
        }
    }

    fn backups_to_keep(&self) -> usize {
        self.max_backup_files.max(1)
    }
}

struct RotationState {
    writer: Option<BufWriter<File>>,
    current_size: u64,
    last_rotation: SystemTime,
    /// Consecutive failures to delete the oldest backup
    deletion_failure_count: usize,
    closed: bool,
}

/// File transport with automatic rotation
///
/// ```no_run
/// use rust_log_dispatch::prelude::*;
/// use rust_log_dispatch::transports::{RotatingFileTransport, RotationPolicy};
///
/// let policy = RotationPolicy::new().with_max_size(10 * 1024 * 1024).with_max_backups(3);
/// let transport = RotatingFileTransport::with_policy("/var/log/app.log", Level::INFO, policy).unwrap();
/// ```
pub struct RotatingFileTransport {
    base_path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<RotationState>,
    min_level: Level,
    formatter: Arc<dyn Formatter>,
}

const MAX_DELETION_FAILURES: usize = 5;

impl RotatingFileTransport {
    pub fn new(path: impl AsRef<Path>, min_level: Level) -> Result<Self> {
        Self::with_policy(path, min_level, RotationPolicy::default())
    }

    /// Open `path` for appending with a custom rotation policy
    ///
    /// # Errors
    ///
    /// Returns error if the file or its directory cannot be created
    pub fn with_policy(path: impl AsRef<Path>, min_level: Level, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, last_rotation) = Self::open_file(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            state: Mutex::new(RotationState {
                writer: Some(BufWriter::new(file)),
                current_size,
                last_rotation,
                deletion_failure_count: 0,
                closed: false,
            }),
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
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the active file
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    pub fn last_rotation(&self) -> SystemTime {
        self.state.lock().last_rotation
    }

    /// Rotate now, regardless of the strategy
    pub fn force_rotate(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(LoggerError::closed(self.base_path.display().to_string()));
        }
        self.rotate(&mut state)
    }

    fn open_file(path: &Path) -> Result<(File, u64, SystemTime)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_transport(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_transport(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        // An existing file counts as rotated when it was last modified
        let last_rotation = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        Ok((file, metadata.len(), last_rotation))
    }

    fn should_rotate(&self, state: &RotationState) -> bool {
        let elapsed = || {
            SystemTime::now()
                .duration_since(state.last_rotation)
                .unwrap_or(Duration::ZERO)
        };

        match &self.policy.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size { max_bytes } => state.current_size >= *max_bytes,
            RotationStrategy::Time { interval } => elapsed() >= *interval,
            RotationStrategy::Daily { hour } => {
                let now: DateTime<Local> = SystemTime::now().into();
                let last: DateTime<Local> = state.last_rotation.into();
                now.date_naive() != last.date_naive() && now.hour() >= u32::from(*hour)
            }
            RotationStrategy::Hourly => elapsed() >= Duration::from_secs(3600),
            RotationStrategy::Hybrid { max_bytes, interval } => {
                state.current_size >= *max_bytes || elapsed() >= *interval
            }
        }
    }

    fn rotate(&self, state: &mut RotationState) -> Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let keep = self.policy.backups_to_keep();
        self.remove_oldest_backup(state, keep)?;

        for i in (1..keep).rev() {
            let old_path = self.backup_path(i);
            let new_path = self.backup_path(i + 1);
            let old_compressed = gz_path(&old_path);

            if old_compressed.exists() {
                rename_replacing(&old_compressed, &gz_path(&new_path))?;
            } else if old_path.exists() {
                rename_replacing(&old_path, &new_path)?;
            }
        }

        let first_backup = self.backup_path(1);
        if self.base_path.exists() {
            fs::rename(&self.base_path, &first_backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                compress_file(&first_backup)?;
            }
        }

        let (file, _, _) = Self::open_file(&self.base_path)?;
        state.writer = Some(BufWriter::new(file));
        state.current_size = 0;
        state.last_rotation = SystemTime::now();

        self.prune_expired(keep);
        Ok(())
    }

    fn remove_oldest_backup(&self, state: &mut RotationState, keep: usize) -> Result<()> {
        let oldest = self.backup_path(keep);
        let mut deletion_failed = false;

        for candidate in [gz_path(&oldest), oldest] {
            if !candidate.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(&candidate) {
                deletion_failed = true;
                eprintln!(
                    "[LOGGER WARNING] Failed to remove oldest backup {}: {} (failure #{}/{})",
                    candidate.display(),
                    e,
                    state.deletion_failure_count + 1,
                    MAX_DELETION_FAILURES
                );
            }
        }

        if !deletion_failed {
            state.deletion_failure_count = 0;
            return Ok(());
        }

        state.deletion_failure_count += 1;
        if state.deletion_failure_count >= MAX_DELETION_FAILURES {
            return Err(LoggerError::file_rotation(
                self.base_path.display().to_string(),
                format!(
                    "Rotation aborted: failed to delete old backup files {} consecutive times",
                    state.deletion_failure_count
                ),
            ));
        }
        Ok(())
    }

    /// Delete backups whose last modification is older than `max_age`
    fn prune_expired(&self, keep: usize) {
        let Some(max_age) = self.policy.max_age else {
            return;
        };
        let now = SystemTime::now();

        for i in 1..=keep {
            let plain = self.backup_path(i);
            for candidate in [gz_path(&plain), plain] {
                let expired = fs::metadata(&candidate)
                    .and_then(|m| m.modified())
                    .map(|modified| now.duration_since(modified).unwrap_or(Duration::ZERO) > max_age)
                    .unwrap_or(false);
                if expired {
                    if let Err(e) = fs::remove_file(&candidate) {
                        eprintln!(
                            "[LOGGER WARNING] Failed to remove expired backup {}: {}",
                            candidate.display(),
                            e
                        );
                    }
                }
            }
        }
    }

    /// Backup file path for `index`: `<name>.<index>`
    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self
            .base_path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("app.log"));
        name.push(format!(".{}", index));
        self.base_path.with_file_name(name)
    }

    /// Rotate if due; on failure keep logging to the current file
    fn rotate_if_due(&self, state: &mut RotationState) -> Result<()> {
        if !self.should_rotate(state) {
            return Ok(());
        }

        if let Err(e) = self.rotate(state) {
            eprintln!(
                "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                e
            );

            if state.writer.is_none() {
                match Self::open_file(&self.base_path) {
                    Ok((file, size, _)) => {
                        state.writer = Some(BufWriter::new(file));
                        state.current_size = size;
                    }
                    Err(reopen_err) => {
                        eprintln!(
                            "[LOGGER ERROR] Failed to reopen log file after rotation failure: {}",
                            reopen_err
                        );
                        return Err(e);
                    }
                }
            }

            // Let the file grow past its limit rather than retry on every write
            state.current_size = 0;
            state.last_rotation = SystemTime::now();
        }
        Ok(())
    }
}

/// `<path>.gz`
fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

fn rename_replacing(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Some platforms refuse to rename onto an existing file
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).map_err(|e| {
        LoggerError::file_rotation(
            from.display().to_string(),
            format!("Failed to rotate backup files: {}", e),
        )
    })
}

/// Gzip `path` into `<path>.gz` using streaming I/O
///
/// The original is removed only after the compressed file is complete.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let final_path = gz_path(path);
    let mut temp_name = final_path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let compress_err = |message: String, e: std::io::Error| {
        let _ = fs::remove_file(&temp_path);
        LoggerError::io_operation("compress log file", message, e)
    };

    let input = File::open(path)
        .map_err(|e| compress_err(format!("Failed to open {}", path.display()), e))?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_path)
        .map_err(|e| compress_err(format!("Failed to create {}", temp_path.display()), e))?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| compress_err(format!("Failed to read {}", path.display()), e))?;
        if bytes_read == 0 {
            break;
        }
        encoder
            .write_all(&buffer[..bytes_read])
            .map_err(|e| compress_err("Failed to compress data chunk".to_string(), e))?;
    }

    encoder
        .finish()
        .and_then(|mut inner| inner.flush())
        .map_err(|e| compress_err("Failed to finish compression".to_string(), e))?;

    fs::rename(&temp_path, &final_path).map_err(|e| {
        compress_err(format!("Failed to rename to {}", final_path.display()), e)
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

impl Transport for RotatingFileTransport {
    fn write_log(&self, event: &Event) -> Result<()> {
        let bytes = render(self.formatter.as_ref(), event);
        self.write_raw(&bytes)
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn name(&self) -> &str {
        "rotating_file"
    }

    fn raw_sink(&self) -> Option<&dyn RawSink> {
        Some(self)
    }

    fn closeable(&self) -> Option<&dyn Closeable> {
        Some(self)
    }
}

impl RawSink for RotatingFileTransport {
    fn write_raw(&self, bytes: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(LoggerError::closed(self.base_path.display().to_string()));
        }

        self.rotate_if_due(&mut state)?;

        let writer = state
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer
            .write_all(bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::file_transport(
                    self.base_path.display().to_string(),
                    format!("Failed to write log event: {}", e),
                )
            })?;
        state.current_size += bytes.len() as u64;
        Ok(())
    }
}

impl Closeable for RotatingFileTransport {
    fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.closed = true;
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_transport(
                    self.base_path.display().to_string(),
                    format!("Failed to flush on close: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

impl Drop for RotatingFileTransport {
    fn drop(&mut self) {
        if let Some(mut writer) = self.state.get_mut().writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::thread;
    use tempfile::tempdir;

    fn write_n(transport: &RotatingFileTransport, n: usize) {
        for i in 0..n {
            let event = Event::new(Level::INFO, format!("Test message number {}", i));
            transport.write_log(&event).unwrap();
        }
    }

    #[test]
    fn test_rotation_strategy_constructors() {
        assert_eq!(RotationStrategy::size(1024), RotationStrategy::Size { max_bytes: 1024 });
        assert_eq!(
            RotationStrategy::megabytes(2),
            RotationStrategy::Size { max_bytes: 2 * 1024 * 1024 }
        );
        assert_eq!(RotationStrategy::daily(2), RotationStrategy::Daily { hour: 2 });
        assert_eq!(RotationStrategy::daily(42), RotationStrategy::Daily { hour: 23 });
        assert_eq!(
            RotationStrategy::hybrid(1024, Duration::from_secs(3600)),
            RotationStrategy::Hybrid {
                max_bytes: 1024,
                interval: Duration::from_secs(3600)
            }
        );
    }

    #[test]
    fn test_rotation_policy_builder() {
        let policy = RotationPolicy::new()
            .with_max_size(1024)
            .with_max_backups(3)
            .with_compression(true);

        assert_eq!(policy.max_file_size(), Some(1024));
        assert_eq!(policy.max_backup_files, 3);
        assert!(policy.compress);
        assert!(policy.max_age.is_none());

        let daily = RotationPolicy::new().with_strategy(RotationStrategy::Daily { hour: 0 });
        assert_eq!(daily.max_file_size(), None);
    }

    #[test]
    fn test_rotating_transport_creation() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let transport = RotatingFileTransport::new(&log_path, Level::INFO).unwrap();
        assert_eq!(transport.path(), log_path);
        assert_eq!(transport.current_size(), 0);
        assert!(transport.closeable().is_some());

        let elapsed = SystemTime::now()
            .duration_since(transport.last_rotation())
            .unwrap_or(Duration::ZERO);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_log_rotation_size_based() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("rotation.log");
        let policy = RotationPolicy::new().with_max_size(100).with_max_backups(3);

        let transport = RotatingFileTransport::with_policy(&log_path, Level::INFO, policy).unwrap();
        write_n(&transport, 20);

        assert!(log_path.with_file_name("rotation.log.1").exists());
        assert!(log_path.exists());
    }

    #[test]
    fn test_log_rotation_time_based() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("time_rotation.log");
        let policy = RotationPolicy::new()
            .with_strategy(RotationStrategy::Time {
                interval: Duration::from_millis(50),
            })
            .with_max_backups(3);

        let transport = RotatingFileTransport::with_policy(&log_path, Level::INFO, policy).unwrap();
        write_n(&transport, 1);
        thread::sleep(Duration::from_millis(80));
        write_n(&transport, 1);

        assert!(log_path.with_file_name("time_rotation.log.1").exists());
    }

    #[test]
    fn test_no_rotation_with_never_strategy() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("never_rotation.log");
        let policy = RotationPolicy::new().with_strategy(RotationStrategy::Never);

        let transport = RotatingFileTransport::with_policy(&log_path, Level::INFO, policy).unwrap();
        write_n(&transport, 100);

        assert!(!log_path.with_file_name("never_rotation.log.1").exists());
        assert_eq!(
            fs::read_to_string(&log_path).unwrap().lines().count(),
            100
        );
    }

    #[test]
    fn test_backup_count_is_bounded() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("multi.log");
        let policy = RotationPolicy::new().with_max_size(50).with_max_backups(2);

        let transport = RotatingFileTransport::with_policy(&log_path, Level::INFO, policy).unwrap();
        write_n(&transport, 100);

        let log_files = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("multi.log"))
            .count();
        assert!(log_files <= 3, "found {} files", log_files);
    }

    #[test]
    fn test_compressed_backups() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("gz.log");
        let policy = RotationPolicy::new()
            .with_strategy(RotationStrategy::Never)
            .with_compression(true);

        let transport = RotatingFileTransport::with_policy(&log_path, Level::INFO, policy).unwrap();
        write_n(&transport, 3);
        transport.force_rotate().unwrap();

        let gz = log_path.with_file_name("gz.log.1.gz");
        assert!(gz.exists());
        assert!(!log_path.with_file_name("gz.log.1").exists());

        let mut decoded = String::new();
        flate2::read::GzDecoder::new(File::open(&gz).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded.lines().count(), 3);
        assert!(decoded.contains("Test message number 2"));
    }

    #[test]
    fn test_expired_backups_are_pruned() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("aged.log");
        let policy = RotationPolicy::new()
            .with_strategy(RotationStrategy::Never)
            .with_max_backups(5)
            .with_max_age(Duration::from_millis(50));

        let transport = RotatingFileTransport::with_policy(&log_path, Level::INFO, policy).unwrap();
        write_n(&transport, 1);
        transport.force_rotate().unwrap();
        assert!(log_path.with_file_name("aged.log.1").exists());

        thread::sleep(Duration::from_millis(120));
        write_n(&transport, 1);
        transport.force_rotate().unwrap();

        // The fresh backup survives; the one that aged out is gone
        assert!(log_path.with_file_name("aged.log.1").exists());
        assert!(!log_path.with_file_name("aged.log.2").exists());
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = tempdir().unwrap();
        let transport = RotatingFileTransport::new(dir.path().join("closed.log"), Level::INFO).unwrap();

        transport.close().unwrap();
        let result = transport.write_log(&Event::new(Level::INFO, "late"));
        assert!(matches!(result, Err(LoggerError::TransportClosed { .. })));
        assert!(transport.force_rotate().is_err());
    }
}
