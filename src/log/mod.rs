//! NØNOS Logging Subsystem

pub mod logger;

#[cfg(test)]
mod tests;

pub use logger::{init as init_logger, try_get_logger, LogEntry, Logger, Severity};

pub use crate::{log_dbg, log_err, log_info, log_warn};
