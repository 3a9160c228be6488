use moringa_logger::{LevelFilter, LogFormat, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logging_creates_json_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("integration-file-logging")
        .format(LogFormat::Json)
        .path(&log_dir)
        .json_files()
        .level(LevelFilter::INFO)
        .init()?;

    assert!(logger.guard().is_some());
    tracing::info!(contact_id = "abc", "hello from integration test");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let first_line = contents.lines().next().expect("log file should not be empty");
    assert!(first_line.starts_with('{'), "file lines should be JSON: {first_line}");
    assert!(first_line.contains("contact_id"));

    Ok(())
}
