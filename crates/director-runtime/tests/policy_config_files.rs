#![forbid(unsafe_code)]

//! Loading [`DirectorConfig`] from files on disk.
//!
//! Run:
//!   cargo test -p director-runtime --features policy-config --test policy_config_files

use std::io::Write;
use std::time::Duration;

use director_core::{Selector, SequenceId, Value};
use director_harness::{MemoryStage, StageCall, fixtures};
use director_runtime::{Director, DirectorConfig, ManualClock, PolicyConfigError};

fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn toml_file_round_trip() {
    let file = write_file(
        ".toml",
        r#"
skip_window_ms = 250
instant_duration_cap_ms = 120
hurry_selector = "point"
"#,
    );
    let config = DirectorConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(config.skip_window(), Duration::from_millis(250));
    assert_eq!(config.instant_duration_cap(), Duration::from_millis(120));
    assert_eq!(config.rollback_duration_cap(), Duration::from_millis(300));
    assert_eq!(config.hurry_selector(), Selector::Type("point".into()));

    let text = toml::to_string(&config).unwrap();
    assert_eq!(DirectorConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn json_file_loads() {
    let file = write_file(".json", r#"{"skip_duration_cap_ms": 20, "rollback_duration_cap_ms": 90}"#);
    let config = DirectorConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.skip_duration_cap(), Duration::from_millis(20));
    assert_eq!(config.rollback_duration_cap(), Duration::from_millis(90));

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["skip_window_ms"], 500);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DirectorConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, PolicyConfigError::Io(_)));
    assert!(err.to_string().starts_with("I/O error"));
}

#[test]
fn malformed_files_are_parse_errors() {
    let toml_file = write_file(".toml", "skip_window_ms = \"soon\"");
    assert!(matches!(
        DirectorConfig::from_toml_file(toml_file.path()),
        Err(PolicyConfigError::Toml(_))
    ));

    let json_file = write_file(".json", "{ not json");
    assert!(matches!(
        DirectorConfig::from_json_file(json_file.path()),
        Err(PolicyConfigError::Json(_))
    ));
}

#[test]
fn invalid_values_list_every_problem() {
    let file = write_file(
        ".toml",
        "skip_duration_cap_ms = 900\ninstant_duration_cap_ms = 100\nhurry_selector = \"\"\n",
    );
    match DirectorConfig::from_toml_file(file.path()) {
        Err(PolicyConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn loaded_config_drives_the_director() {
    let file = write_file(".toml", "skip_window_ms = 50\nhurry_selector = \"point\"\n");
    let config = DirectorConfig::from_toml_file(file.path()).unwrap();
    let clock = ManualClock::new();
    let mut d = Director::with_config(MemoryStage::new(), fixtures::lesson(), config)
        .with_clock(clock.clone());

    d.forward(false).unwrap();
    clock.advance_ms(100);
    d.forward(false).unwrap();
    // 100ms is outside the 50ms window: scripted timing survives.
    assert_eq!(d.stage().in_flight().len(), 2);
    assert!(
        d.stage()
            .journal()
            .iter()
            .filter(|c| matches!(c, StageCall::Hurry(_)))
            .all(|c| *c == StageCall::Hurry(Selector::Type("point".into())))
    );

    clock.advance_ms(10);
    d.forward(false).unwrap();
    assert!(d.stage().in_flight().is_empty());
    assert_eq!(
        d.stage().attrs(SequenceId(2)).unwrap().get("x"),
        Some(&Value::Number(-3.0))
    );
}
