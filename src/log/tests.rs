use super::logger::{self, Logger, Severity};
use std::format;
use std::string::ToString;

#[test]
fn test_severity_ordering() {
    assert!(Severity::Debug < Severity::Info);
    assert!(Severity::Info < Severity::Warn);
    assert!(Severity::Warn < Severity::Error);
    assert!(Severity::Error < Severity::Fatal);
}

#[test]
fn test_logger_buffers_entries() {
    let logger = Logger::new();
    assert_eq!(logger.entry_count(), 0);

    logger.log_fmt(Severity::Info, format_args!("block at {:#x}", 0x400000));
    logger.log_fmt(Severity::Warn, format_args!("short on order {}", 10));

    assert_eq!(logger.entry_count(), 2);
    let latest = logger.latest().expect("entry");
    assert_eq!(latest.severity, Severity::Warn);
    assert_eq!(latest.message.as_str(), "short on order 10");
    assert_eq!(latest.sequence, 1);
}

#[test]
fn test_logger_ring_overwrites_oldest() {
    let logger = Logger::new();
    for index in 0..logger::LOG_BUFFER_SIZE + 16 {
        logger.log_fmt(Severity::Debug, format_args!("entry {}", index));
    }

    assert_eq!(logger.entry_count(), logger::LOG_BUFFER_SIZE);

    let mut first_sequence = None;
    logger.for_each_entry(|entry| {
        if first_sequence.is_none() {
            first_sequence = Some(entry.sequence);
        }
    });
    // The 16 oldest entries fell off the front
    assert_eq!(first_sequence, Some(16));
}

#[test]
fn test_logger_respects_min_level() {
    let logger = Logger::new();
    logger.set_min_level(Severity::Warn);

    logger.log_fmt(Severity::Info, format_args!("dropped"));
    logger.log_fmt(Severity::Error, format_args!("kept"));

    assert_eq!(logger.entry_count(), 1);
    assert_eq!(logger.latest().expect("entry").message.as_str(), "kept");
}

#[test]
fn test_logger_truncates_long_messages() {
    let logger = Logger::new();
    let long = "x".repeat(2 * logger::MAX_MESSAGE_LEN);
    logger.log_fmt(Severity::Info, format_args!("{}", long));

    let entry = logger.latest().expect("entry");
    assert_eq!(entry.message.len(), logger::MAX_MESSAGE_LEN);
}

#[test]
fn test_global_logger_macros() {
    logger::init();
    let logger = logger::try_get_logger().expect("logger");

    let before = logger.entry_count();
    crate::log_info!("probe {}", 42);
    assert!(logger.entry_count() > before || before == logger::LOG_BUFFER_SIZE);

    // Formatting paths shared by the other macros
    crate::log_dbg!("{}", format!("{}-{}", "a", "b"));
    crate::log_warn!("warn {}", "probe");
    crate::log_err!("err {}", 1.to_string());
}
