use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    //-------------------------------------------------------------------------
    // IO / Parsing
    //-------------------------------------------------------------------------
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {path}\n\n{source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    //-------------------------------------------------------------------------
    // Startup options
    //-------------------------------------------------------------------------
    #[error("invalid URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("page URL '{page}' has no host to derive the live endpoint from")]
    MissingHost { page: String },

    #[error("live endpoint '{value}' must use ws:// or wss://")]
    InvalidLiveEndpoint { value: String },

    #[error("replay source '{value}' must be an http, https or file URL")]
    UnsupportedReplaySource { value: String },

    //-------------------------------------------------------------------------
    // Tuning
    //-------------------------------------------------------------------------
    #[error("invalid tuning value for '{field}': {reason}")]
    InvalidTuning { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_url(value: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            value: value.into(),
            source,
        }
    }
}
