//! NØNOS Subsystem Logger
//!
//! Ring-buffered logger with severity filtering. Entries are stamped
//! with a monotonically increasing sequence number; sinks, timestamps
//! and tamper evidence are kernel services layered on top of this.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use spin::Mutex;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

pub const MAX_MESSAGE_LEN: usize = 256;
pub(crate) const LOG_BUFFER_SIZE: usize = 256;

/// A single buffered log record.
#[derive(Clone)]
pub struct LogEntry {
    pub sequence: u64,
    pub severity: Severity,
    pub message: heapless::String<MAX_MESSAGE_LEN>,
}

pub struct Logger {
    entries: Mutex<heapless::Deque<LogEntry, LOG_BUFFER_SIZE>>,
    sequence: AtomicU64,
    min_level: Mutex<Severity>,
}

static LOGGER: Logger = Logger::new();
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize the logging subsystem.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    LOGGER.log_fmt(Severity::Info, format_args!("[LOG] subsystem logger online"));
}

/// Get the global logger if initialized.
pub fn try_get_logger() -> Option<&'static Logger> {
    if INITIALIZED.load(Ordering::Relaxed) {
        Some(&LOGGER)
    } else {
        None
    }
}

impl Logger {
    pub const fn new() -> Self {
        Self {
            entries: Mutex::new(heapless::Deque::new()),
            sequence: AtomicU64::new(0),
            min_level: Mutex::new(Severity::Debug),
        }
    }

    /// Buffer a preformatted message.
    pub fn log_fmt(&self, severity: Severity, args: fmt::Arguments<'_>) {
        if severity < *self.min_level.lock() {
            return;
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        // Truncate rather than fail if the message exceeds the entry size
        let mut message = heapless::String::new();
        let _ = Truncating(&mut message).write_fmt(args);

        let entry = LogEntry {
            sequence,
            severity,
            message,
        };

        let mut entries = self.entries.lock();
        if entries.is_full() {
            entries.pop_front();
        }
        let _ = entries.push_back(entry);
    }

    pub fn set_min_level(&self, level: Severity) {
        *self.min_level.lock() = level;
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<LogEntry> {
        self.entries.lock().back().cloned()
    }

    /// Visit buffered entries in order, oldest first.
    pub fn for_each_entry(&self, mut visit: impl FnMut(&LogEntry)) {
        for entry in self.entries.lock().iter() {
            visit(entry);
        }
    }
}

/// Writer that keeps whatever fits instead of rejecting a whole piece
/// the way the fixed-capacity string does.
struct Truncating<'a>(&'a mut heapless::String<MAX_MESSAGE_LEN>);

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! log_dbg {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::log::try_get_logger() {
            logger.log_fmt($crate::log::Severity::Debug, format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::log::try_get_logger() {
            logger.log_fmt($crate::log::Severity::Info, format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::log::try_get_logger() {
            logger.log_fmt($crate::log::Severity::Warn, format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::log::try_get_logger() {
            logger.log_fmt($crate::log::Severity::Error, format_args!($($arg)*));
        }
    }};
}
