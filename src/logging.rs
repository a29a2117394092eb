//! Append-only file log shared by every update handler.
//!
//! One [`LogWriter`] exists per process and is handed around as an
//! `Arc<LogWriter>`. Each call opens the file, appends exactly one line and
//! closes it again. Calls are serialized through an async mutex that is held
//! only for the file operation itself.
//!
//! There is no cancellation for a write in flight: if the process stops while
//! a line is being appended, that one line may or may not reach the disk.

use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// `yyyy-MM-dd HH:mm:ss.fff`, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const FILE_EXT: &str = "log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Trace,
    Info,
    Debug,
    Warning,
    Error,
    Fatal,
}

/// Bracketed tags padded to the width of `[WARNING]`, plus the separator.
/// Indexed by `LogLevel as usize`.
const LEVEL_TAGS: [&str; 6] = [
    "[TRACE]   ",
    "[INFO]    ",
    "[DEBUG]   ",
    "[WARNING] ",
    "[ERROR]   ",
    "[FATAL]   ",
];

impl LogLevel {
    pub fn tag(self) -> &'static str {
        LEVEL_TAGS[self as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of the timestamp stamped on every line.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// One formatted line of the log file.
///
/// The message is written verbatim. A message containing a line terminator
/// ends up split over several physical lines; callers are expected to pass
/// single-line text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    timestamp: NaiveDateTime,
    level: LogLevel,
    message: String,
}

impl LogRecord {
    pub fn new(timestamp: NaiveDateTime, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level.tag(),
            self.message
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to create log file {}", .path.display())]
    Init { path: PathBuf, source: io::Error },
    #[error("failed to append to log file {}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// `<executable name>.log`, falling back to the package name when the
/// executable path cannot be resolved.
pub fn process_log_file_name() -> String {
    let stem = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    format!("{}.{}", stem, FILE_EXT)
}

pub struct LogWriter {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl LogWriter {
    /// Opens `<process name>.log` in the working directory.
    pub fn new() -> Result<Self, LogError> {
        Self::open(process_log_file_name(), Arc::new(LocalClock))
    }

    /// Writes the header line if the file does not exist yet.
    ///
    /// Creation is exclusive, so two writers racing on a fresh path produce a
    /// single header.
    pub fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self, LogError> {
        let path = path.into();
        let now = clock.now();
        create_with(&path, |file| write_header(file, &path, now))?;

        Ok(Self {
            path,
            clock,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn log(&self, level: LogLevel, message: impl AsRef<str>) -> Result<(), LogError> {
        let _guard = self.write_lock.lock().await;
        let record = LogRecord::new(self.clock.now(), level, message.as_ref());
        self.append_line(&record.to_string()).await
    }

    pub async fn info(&self, message: impl AsRef<str>) -> Result<(), LogError> {
        self.log(LogLevel::Info, message).await
    }

    pub async fn error(&self, message: impl AsRef<str>) -> Result<(), LogError> {
        self.log(LogLevel::Error, message).await
    }

    pub async fn fatal(&self, message: impl AsRef<str>) -> Result<(), LogError> {
        self.log(LogLevel::Fatal, message).await
    }

    // Caller holds `write_lock`.
    async fn append_line(&self, line: &str) -> Result<(), LogError> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| self.write_error(source))?;

        file.write_all(buf.as_bytes())
            .await
            .map_err(|source| self.write_error(source))?;
        // tokio buffers internally; the line is only on disk once flushed.
        file.flush()
            .await
            .map_err(|source| self.write_error(source))?;

        Ok(())
    }

    fn write_error(&self, source: io::Error) -> LogError {
        LogError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

// The bot only writes INFO, ERROR and FATAL itself.
#[allow(dead_code)]
impl LogWriter {
    pub async fn trace(&self, message: impl AsRef<str>) -> Result<(), LogError> {
        self.log(LogLevel::Trace, message).await
    }

    pub async fn debug(&self, message: impl AsRef<str>) -> Result<(), LogError> {
        self.log(LogLevel::Debug, message).await
    }

    pub async fn warning(&self, message: impl AsRef<str>) -> Result<(), LogError> {
        self.log(LogLevel::Warning, message).await
    }
}

/// Exclusively creates `path` and runs `init` on it. An existing file is left
/// untouched and `init` is not run.
///
/// If `init` fails the file is removed again; otherwise the next open would
/// find it and never write the header.
fn create_with(
    path: &Path,
    init: impl FnOnce(&mut fs::File) -> io::Result<()>,
) -> Result<(), LogError> {
    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(()),
        Err(source) => {
            return Err(LogError::Init {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let initialized = init(&mut file);
    drop(file);

    initialized.map_err(|source| {
        let _ = fs::remove_file(path);
        LogError::Init {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn write_header(w: &mut impl Write, path: &Path, now: NaiveDateTime) -> io::Result<()> {
    w.write_all(header_line(path, now).as_bytes())?;
    w.flush()
}

fn header_line(path: &Path, now: NaiveDateTime) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("{} {} is created.\n", now.format(TIMESTAMP_FORMAT), file_name)
}
