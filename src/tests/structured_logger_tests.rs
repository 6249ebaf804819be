use super::*;
use tempfile::TempDir;

fn create_test_logger() -> (StructuredLogger, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger =
        StructuredLogger::new("test-session", temp_dir.path()).expect("Failed to create logger");
    (logger, temp_dir)
}

fn read_entries(temp_dir: &TempDir) -> Vec<LogEntry> {
    let content = std::fs::read_to_string(temp_dir.path().join(LOG_FILE_NAME))
        .expect("Failed to read log file");
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("Failed to parse log entry"))
        .collect()
}

#[test]
fn test_log_entries_are_valid_json() {
    let (logger, temp_dir) = create_test_logger();

    logger.log("TestComponent", serde_json::json!({"key": "value1"}));
    logger.log("TestComponent", serde_json::json!({"key": "value2"}));

    let entries = read_entries(&temp_dir);
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry.session_id, "test-session");
        assert_eq!(entry.component, "TestComponent");
    }
}

#[test]
fn test_sequence_numbers_monotonic() {
    let (logger, temp_dir) = create_test_logger();

    for i in 0..10 {
        logger.log("Test", serde_json::json!({"iteration": i}));
    }

    let mut prev_seq = 0u64;
    for entry in read_entries(&temp_dir) {
        assert!(
            entry.seq > prev_seq,
            "Sequence numbers should be monotonically increasing"
        );
        prev_seq = entry.seq;
    }
    assert_eq!(prev_seq, 10);
}

#[test]
fn test_concurrent_logging() {
    use std::sync::Arc;
    use std::thread;

    let (logger, temp_dir) = create_test_logger();
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..5)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..20 {
                    logger.log("Thread", serde_json::json!({"thread": t, "iteration": i}));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(read_entries(&temp_dir).len(), 100);
}

#[test]
fn test_timestamp_format() {
    let (logger, temp_dir) = create_test_logger();

    logger.log("Test", serde_json::json!({"msg": "test"}));

    let entry = read_entries(&temp_dir).remove(0);
    assert!(entry.ts.contains('T'));
    assert!(entry.ts.ends_with('Z'));
    let micros_part = entry.ts.split('.').nth(1).unwrap();
    assert_eq!(micros_part.len(), 7);
}

#[test]
fn test_outcome_logging_carries_status_and_record() {
    let (logger, temp_dir) = create_test_logger();

    logger.log_outcome(
        "login",
        &Outcome::<String, String>::success("ok".to_string()).with_log("logou"),
    );
    logger.log_outcome(
        "login",
        &Outcome::<String, String>::fault("boom".to_string()),
    );
    logger.log_outcome(
        "register",
        &Outcome::<String, String>::running("Iniciando registro ...".to_string()),
    );

    let entries = read_entries(&temp_dir);
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].component, "login");
    assert_eq!(entries[0].event["type"], "Outcome");
    assert_eq!(entries[0].event["code"], 200);
    assert_eq!(entries[0].event["record"]["state"], "success");
    assert_eq!(entries[0].event["record"]["log"], "logou");

    assert_eq!(entries[1].event["code"], 500);
    assert_eq!(entries[1].event["record"]["critical"], true);

    assert_eq!(entries[2].event["code"], 102);
    assert_eq!(entries[2].event["record"]["value"], "Iniciando registro ...");
}

#[test]
fn test_command_and_timeout_events() {
    let (logger, temp_dir) = create_test_logger();

    logger.log_command("open-door");
    logger.log_timeout("open-door", 30);

    let entries = read_entries(&temp_dir);
    assert_eq!(entries[0].component, "Cli");
    assert_eq!(entries[0].event["type"], "Command");
    assert_eq!(entries[0].event["command"], "open-door");
    assert_eq!(entries[1].event["type"], "Timeout");
    assert_eq!(entries[1].event["secs"], 30);
}

#[test]
fn test_random_session_ids_differ() {
    let temp_dir = TempDir::new().unwrap();
    let first = StructuredLogger::with_random_session(temp_dir.path()).unwrap();
    let second = StructuredLogger::with_random_session(temp_dir.path()).unwrap();

    assert_ne!(first.session_id(), second.session_id());
    assert!(Uuid::parse_str(first.session_id()).is_ok());
    assert_eq!(first.path(), &temp_dir.path().join(LOG_FILE_NAME));
}
