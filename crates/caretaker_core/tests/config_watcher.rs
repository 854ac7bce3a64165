use caretaker_core::{load_config, ConfigError, ConfigWatcher};
use std::time::Duration;

const POLL: Duration = Duration::from_millis(25);
const EVENT_WAIT: Duration = Duration::from_secs(5);
const QUIET_WAIT: Duration = Duration::from_millis(300);

#[test]
fn load_config_reads_operator_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buildings.json");
    std::fs::write(&path, r#"[{"name":"Oak","roomCount":2}]"#).unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.buildings.len(), 1);
    assert_eq!(config.buildings[0].room_count, 2);
}

#[test]
fn load_config_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn watcher_emits_parsed_config_on_content_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buildings.json");
    std::fs::write(&path, r#"[{"name":"Oak","roomCount":2}]"#).unwrap();

    let watcher = ConfigWatcher::spawn(&path, POLL);
    std::fs::write(&path, r#"[{"name":"Oak","roomCount":3}]"#).unwrap();

    let config = watcher
        .changes()
        .recv_timeout(EVENT_WAIT)
        .expect("change should be delivered");
    assert_eq!(config.buildings[0].room_count, 3);
    watcher.stop();
}

#[test]
fn write_landing_right_after_spawn_is_a_change_not_the_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buildings.json");
    std::fs::write(&path, r#"[{"name":"Oak","roomCount":2}]"#).unwrap();

    // No sleep between spawn and write: the baseline must be the content
    // read before the watcher thread starts, so this write is delivered
    // even when the thread is scheduled late.
    let watcher = ConfigWatcher::spawn(&path, POLL);
    std::fs::write(&path, r#"[{"name":"Elm","roomCount":1}]"#).unwrap();

    let config = watcher
        .changes()
        .recv_timeout(EVENT_WAIT)
        .expect("post-spawn write must be delivered");
    assert_eq!(config.buildings[0].name, "Elm");

    // Exactly one event for one content change.
    assert!(watcher.changes().recv_timeout(QUIET_WAIT).is_err());
    watcher.stop();
}

#[test]
fn watcher_ignores_identical_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buildings.json");
    let content = r#"[{"name":"Oak","roomCount":2}]"#;
    std::fs::write(&path, content).unwrap();

    let watcher = ConfigWatcher::spawn(&path, POLL);
    std::fs::write(&path, content).unwrap();

    let result = watcher.changes().recv_timeout(QUIET_WAIT);
    assert!(result.is_err(), "identical content must not be delivered");
    watcher.stop();
}

#[test]
fn watcher_skips_invalid_content_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buildings.json");
    std::fs::write(&path, r#"[{"name":"Oak","roomCount":2}]"#).unwrap();

    let watcher = ConfigWatcher::spawn(&path, POLL);

    std::fs::write(&path, "{broken").unwrap();
    let result = watcher.changes().recv_timeout(QUIET_WAIT);
    assert!(result.is_err(), "invalid content must not be delivered");

    std::fs::write(&path, r#"[{"name":"Elm","roomCount":1}]"#).unwrap();
    let config = watcher
        .changes()
        .recv_timeout(EVENT_WAIT)
        .expect("valid content should be delivered after recovery");
    assert_eq!(config.buildings[0].name, "Elm");
    watcher.stop();
}
