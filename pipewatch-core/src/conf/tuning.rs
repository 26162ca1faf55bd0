use crate::conf::error::ConfigError;
use crate::ingest::constants::{
    DEFAULT_BACKOFF_INITIAL, DEFAULT_BACKOFF_MAX, DEFAULT_QUEUE_CAPACITY, DEFAULT_YIELD_EVERY,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Runtime knobs, read from an optional TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningConfig {
    pub replay: ReplayTuning,
    pub live: LiveTuning,
    pub render: RenderTuning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayTuning {
    /// Entries folded between cooperative yields.
    pub yield_every: usize,
    pub queue_capacity: usize,
}

impl Default for ReplayTuning {
    fn default() -> Self {
        Self {
            yield_every: DEFAULT_YIELD_EVERY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiveTuning {
    pub reconnect: bool,
    pub backoff_initial_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for LiveTuning {
    fn default() -> Self {
        Self {
            reconnect: true,
            backoff_initial_ms: DEFAULT_BACKOFF_INITIAL.as_millis() as u64,
            backoff_max_ms: DEFAULT_BACKOFF_MAX.as_millis() as u64,
        }
    }
}

impl LiveTuning {
    pub fn backoff_initial(&self) -> Duration {
        Duration::from_millis(self.backoff_initial_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderTuning {
    pub sparkline_width: usize,
}

impl Default for RenderTuning {
    fn default() -> Self {
        Self {
            sparkline_width: 32,
        }
    }
}

impl TuningConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let cfg: Self = toml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replay.yield_every == 0 {
            return Err(ConfigError::InvalidTuning {
                field: "replay.yield_every",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.replay.queue_capacity == 0 {
            return Err(ConfigError::InvalidTuning {
                field: "replay.queue_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.render.sparkline_width == 0 {
            return Err(ConfigError::InvalidTuning {
                field: "render.sparkline_width",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.live.backoff_initial_ms > self.live.backoff_max_ms {
            return Err(ConfigError::InvalidTuning {
                field: "live.backoff_initial_ms",
                reason: format!(
                    "{} exceeds live.backoff_max_ms ({})",
                    self.live.backoff_initial_ms, self.live.backoff_max_ms
                ),
            });
        }
        Ok(())
    }
}

impl FromStr for TuningConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s).map_err(|e| ConfigError::parse("<string>", e))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
