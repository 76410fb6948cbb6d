use phonebook_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn console_only_runs_no_file_writer_and_installs_once() {
    let logger = Logger::builder("phonebook-console")
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");
    assert!(!logger.writes_files());

    let err = Logger::builder("phonebook-console-second").init().expect_err("second init");
    assert!(matches!(err, LoggerError::AlreadyInstalled { .. }));
}
