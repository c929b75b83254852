use std::fs;
use std::path::PathBuf;

use viewer_engine::{ConfigError, LogTarget, PageConfig};

#[test]
fn example_page_config_resolves() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../session_page.example.ron");
    let config = PageConfig::load(&path).expect("example config parses");
    assert_eq!(config.log_destination, LogTarget::Terminal);

    let endpoints = config.resolve().expect("example config is complete");
    assert_eq!(
        endpoints.stream_url.as_str(),
        "ws://localhost:8000/ws/session/3f2c9a4e-8d1b-4c55-9a0e-2b7f1c6d9e10/"
    );
    assert_eq!(endpoints.csrf_token.as_deref(), Some("replace-me"));
}

#[test]
fn config_without_session_id_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("page.ron");
    fs::write(
        &path,
        r#"(status_url: "http://localhost:8000/session/x/status/")"#,
    )
    .unwrap();

    let config = PageConfig::load(&path).unwrap();
    assert!(matches!(
        config.resolve(),
        Err(ConfigError::MissingSessionId)
    ));
}

#[test]
fn malformed_config_is_a_parse_error() {
    assert!(matches!(
        PageConfig::from_ron_str("(session_id: 42"),
        Err(ConfigError::Parse(_))
    ));
}
