use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid UTF-8 sequence at byte offset {offset}")]
    InvalidSequence { offset: u64 },

    #[error("stream ended inside a multi-byte character ({pending} byte(s) left undecoded)")]
    Truncated { pending: usize },
}

/// A non-blank line that does not describe a log entry.
#[derive(Debug, Error)]
#[error("malformed log entry{} at {line}:{column}: {source}", .stream_line.map(|n| format!(" on stream line {n}")).unwrap_or_default())]
pub struct MalformedEntry {
    /// The offending text, trimmed.
    pub text: String,
    /// 1-based line of the replay stream, when the entry came from one.
    pub stream_line: Option<usize>,
    /// Position of the failure inside `text`.
    pub line: usize,
    pub column: usize,
    #[source]
    pub source: serde_json::Error,
}

impl MalformedEntry {
    pub fn new(text: &str, source: serde_json::Error) -> Self {
        Self {
            text: text.to_string(),
            stream_line: None,
            line: source.line(),
            column: source.column(),
            source,
        }
    }

    pub fn on_stream_line(mut self, stream_line: usize) -> Self {
        self.stream_line = Some(stream_line);
        self
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    //-------------------------------------------------------------------------
    // Live
    //-------------------------------------------------------------------------
    #[error("connection to {endpoint} closed: {reason}")]
    Connection { endpoint: String, reason: String },

    //-------------------------------------------------------------------------
    // Replay
    //-------------------------------------------------------------------------
    #[error("transfer from {url} failed: {source}")]
    Transfer {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("replay source {url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to read replay file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub fn transfer(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transfer {
            url: url.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
