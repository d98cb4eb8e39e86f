use log::{LevelFilter, Log};
use stance_base::logging::{
    format_record, init_file_logger, init_stdout_logger, resolve_max_level, FileLogger,
    StdoutLogger,
};
use std::fs;

fn record_args() -> log::Metadata<'static> {
    log::MetadataBuilder::new()
        .level(log::Level::Info)
        .target("test")
        .build()
}

#[test]
fn test_stdout_logger_implements_log_trait() {
    let logger = StdoutLogger;
    assert!(logger.enabled(&record_args()));

    let record = log::RecordBuilder::new()
        .level(log::Level::Info)
        .target("test")
        .file(Some("test.rs"))
        .line(Some(42))
        .args(format_args!("test message"))
        .build();

    logger.log(&record);
    logger.flush();
}

#[test]
fn test_format_record_layout() {
    let record = log::RecordBuilder::new()
        .level(log::Level::Warn)
        .file(Some("tracker.rs"))
        .line(Some(12))
        .args(format_args!("frame dropped"))
        .build();

    let line = format_record(&record);
    assert!(line.contains("[WARN]"));
    assert!(line.contains("[thread:"));
    assert!(line.ends_with("tracker.rs:12 - frame dropped"));
}

#[test]
fn test_file_logger_writes_to_file() {
    let test_dir = std::env::temp_dir().join(format!("stance-log-test-{}-write", std::process::id()));
    let _ = fs::remove_dir_all(&test_dir);

    let logger = FileLogger::new(&test_dir).expect("Failed to create FileLogger");
    assert!(test_dir.is_dir());

    let record = log::RecordBuilder::new()
        .level(log::Level::Error)
        .target("test")
        .file(Some("test.rs"))
        .line(Some(100))
        .args(format_args!("test error message"))
        .build();

    logger.log(&record);
    logger.flush();

    let entries: Vec<_> = fs::read_dir(&test_dir)
        .expect("Failed to read test directory")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(entries.len(), 1, "Should have exactly one log file");

    let content = fs::read_to_string(entries[0].path()).expect("Failed to read log file");
    assert!(content.contains("[ERROR]"));
    assert!(content.contains("test.rs:100"));
    assert!(content.contains("test error message"));
    assert!(content.ends_with('\n'));

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn test_resolve_max_level_override() {
    assert_eq!(resolve_max_level(Some("trace")), LevelFilter::Trace);
    assert_eq!(resolve_max_level(Some(" warn ")), LevelFilter::Warn);
    assert_eq!(resolve_max_level(Some("off")), LevelFilter::Off);
}

#[test]
fn test_resolve_max_level_default_follows_build_mode() {
    let expected = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    assert_eq!(resolve_max_level(None), expected);
    assert_eq!(resolve_max_level(Some("loud")), expected);
}

#[test]
fn test_init_stdout_logger_sets_global_logger() {
    init_stdout_logger();
    assert!(log::logger().enabled(&record_args()));
    log::info!("Test message from global logger");
}

#[test]
fn test_init_file_logger_invalid_dir_returns_error() {
    let result = init_file_logger("/proc/nonexistent/path");
    assert!(result.is_err());
}
