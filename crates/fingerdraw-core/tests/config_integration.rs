//! Integration tests for configuration files.

use fingerdraw_core::{Config, ConfigError, Mode, SelectionStateMachine, SessionState};
use tempfile::TempDir;

#[test]
fn test_save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::for_mode(Mode::teams(3));
    cfg.session.countdown_ms = 1_500;
    cfg.reveal.team_ms = 250;
    cfg.feedback.reveal_notes = false;
    cfg.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.mode(), Mode::teams(3));
}

#[test]
fn test_missing_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::LoadFailed { .. }));
}

#[test]
fn test_broken_file_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[session\ncountdown_ms = ").unwrap();
    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailed(_)));
}

#[test]
fn test_loaded_config_drives_the_machine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[session]
mode = "ordering"
countdown_ms = 1000

[reveal]
rank_ms = 100
"#,
    )
    .unwrap();

    let cfg = Config::load_from(&path).unwrap();
    let mut m = SelectionStateMachine::with_seed(cfg, 8);
    m.step(
        [
            fingerdraw_core::InputEvent::Down {
                id: 1.into(),
                x: 0.0,
                y: 0.0,
            },
            fingerdraw_core::InputEvent::Down {
                id: 2.into(),
                x: 50.0,
                y: 50.0,
            },
        ],
        0,
    );
    assert_eq!(m.session().deadline_ms(), Some(1_000));

    m.tick_at(1_000);
    assert_eq!(m.state(), SessionState::Revealing);
    m.tick_at(1_100);
    m.tick_at(1_200);
    assert_eq!(m.state(), SessionState::Done);
}
