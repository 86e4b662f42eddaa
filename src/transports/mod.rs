//! Transport implementations

pub mod console;
#[cfg(feature = "file")]
pub mod file;
#[cfg(feature = "file")]
pub mod rotating_file;
#[cfg(all(feature = "syslog", unix))]
pub mod syslog;
pub mod writer;

pub use console::{ConsoleTarget, ConsoleTransport};
#[cfg(feature = "file")]
pub use file::FileTransport;
#[cfg(feature = "file")]
pub use rotating_file::{RotatingFileTransport, RotationPolicy, RotationStrategy};
#[cfg(all(feature = "syslog", unix))]
pub use self::syslog::{parse_facility, SyslogTransport};
pub use writer::{SharedBuffer, WriterTransport};

pub use crate::core::{Closeable, FilteredTransport, RawSink, Transport};
