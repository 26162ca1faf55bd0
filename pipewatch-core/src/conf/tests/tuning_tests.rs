use crate::conf::{ConfigError, TuningConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn defaults_match_the_built_in_constants() {
    // Act
    let cfg = TuningConfig::default();

    // Assert
    assert_eq!(cfg.replay.yield_every, 50);
    assert_eq!(cfg.replay.queue_capacity, 1024);
    assert!(cfg.live.reconnect);
    assert_eq!(cfg.live.backoff_initial(), Duration::from_secs(1));
    assert_eq!(cfg.live.backoff_max(), Duration::from_secs(10));
    assert_eq!(cfg.render.sparkline_width, 32);
    assert!(cfg.validate().is_ok());
}

#[test]
fn partial_file_keeps_defaults_for_the_rest() {
    // Act
    let cfg: TuningConfig = "[replay]\nyield_every = 10\n\n[live]\nreconnect = false\n"
        .parse()
        .unwrap();

    // Assert
    assert_eq!(cfg.replay.yield_every, 10);
    assert_eq!(cfg.replay.queue_capacity, 1024);
    assert!(!cfg.live.reconnect);
    assert_eq!(cfg.live.backoff_max_ms, 10_000);
}

#[test]
fn empty_file_is_the_default() {
    // Act
    let cfg: TuningConfig = "".parse().unwrap();

    // Assert
    assert_eq!(cfg, TuningConfig::default());
}

#[test]
fn unknown_keys_are_rejected() {
    // Act
    let err = "[replay]\nyeild_every = 10\n".parse::<TuningConfig>().unwrap_err();

    // Assert
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("yeild_every"));
}

#[test]
fn zero_yield_interval_is_invalid() {
    // Act
    let err = "[replay]\nyield_every = 0\n".parse::<TuningConfig>().unwrap_err();

    // Assert
    assert!(matches!(
        err,
        ConfigError::InvalidTuning {
            field: "replay.yield_every",
            ..
        }
    ));
}

#[test]
fn backoff_start_may_not_exceed_its_cap() {
    // Act
    let err = "[live]\nbackoff_initial_ms = 5000\nbackoff_max_ms = 1000\n"
        .parse::<TuningConfig>()
        .unwrap_err();

    // Assert
    assert_eq!(
        err.to_string(),
        "invalid tuning value for 'live.backoff_initial_ms': 5000 exceeds live.backoff_max_ms (1000)"
    );
}

#[test]
fn loads_from_file() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("pipewatch.toml");
    fs::write(&path, "[render]\nsparkline_width = 16\n").unwrap();

    // Act
    let cfg = TuningConfig::from_file(&path).unwrap();

    // Assert
    assert_eq!(cfg.render.sparkline_width, 16);
}

#[test]
fn missing_file_reports_its_path() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    // Act
    let err = TuningConfig::from_file(&path).unwrap_err();

    // Assert
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn zero_sparkline_width_is_invalid() {
    // Act
    let err = "[render]\nsparkline_width = 0\n"
        .parse::<TuningConfig>()
        .unwrap_err();

    // Assert
    assert!(matches!(
        err,
        ConfigError::InvalidTuning {
            field: "render.sparkline_width",
            ..
        }
    ));
}
