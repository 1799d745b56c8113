//! Log writer module
//!
//! Thread-safe log output to stdout/stderr or files, with runtime
//! retargeting so a config reload can move log files without a restart.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(Mutex<File>),
}

impl LogTarget {
    /// Target for the access/info stream; stdout when no path is set
    fn for_access(path: Option<&str>) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(Self::Stdout),
        }
    }

    /// Target for the error stream; stderr when no path is set
    fn for_error(path: Option<&str>) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(Self::Stderr),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Thread-safe log writer holding the access and error targets
pub struct LogWriter {
    access: Mutex<LogTarget>,
    error: Mutex<LogTarget>,
}

impl LogWriter {
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            access: Mutex::new(LogTarget::for_access(access_log_file)?),
            error: Mutex::new(LogTarget::for_error(error_log_file)?),
        })
    }

    /// Write to the access/info stream
    pub fn write_info(&self, message: &str) {
        if let Ok(target) = self.access.lock() {
            target.write_line(message);
        }
    }

    /// Write to the error stream
    pub fn write_error(&self, message: &str) {
        if let Ok(target) = self.error.lock() {
            target.write_line(message);
        }
    }

    /// Point both streams at new targets (runtime reconfiguration).
    /// Both files are opened before either stream is touched, so a bad
    /// path leaves the current targets in place.
    pub fn retarget(
        &self,
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
    ) -> io::Result<()> {
        let new_access = LogTarget::for_access(access_log_file)?;
        let new_error = LogTarget::for_error(error_log_file)?;
        if let Ok(mut target) = self.access.lock() {
            *target = new_access;
        }
        if let Ok(mut target) = self.error.lock() {
            *target = new_error;
        }
        Ok(())
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer
///
/// Panics if `init()` has not been called.
pub fn get() -> &'static LogWriter {
    LOG_WRITER
        .get()
        .expect("Log writer not initialized. Call logger::init() first.")
}

/// Check if the log writer has been initialized
pub fn is_initialized() -> bool {
    LOG_WRITER.get().is_some()
}
