use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub type Score = i64;

/// One record of the simulation log.
///
/// `time` is simulation-clock seconds as stamped by the producer. Entries on a
/// single stream arrive in producer order; nothing here assumes the values are
/// strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry<U = String> {
    pub time: f64,
    pub msg: Message<U>,
}

impl<U> LogEntry<U> {
    pub fn map_user<V>(self, f: impl Fn(U) -> V) -> LogEntry<V> {
        LogEntry {
            time: self.time,
            msg: self.msg.map_user(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message<U = String> {
    CollectStart {
        user: U,
        pipe_id: usize,
        #[serde(with = "crate::ingest::secs")]
        delay: Duration,
    },
    UpdatePipe {
        id: usize,
        #[serde(flatten)]
        state: PipeState,
    },
    CollectEnd {
        user: U,
    },
    UpdateUser {
        user: U,
        score: Score,
    },
}

impl<U> Message<U> {
    pub fn map_user<V>(self, f: impl Fn(U) -> V) -> Message<V> {
        match self {
            Message::CollectStart {
                user,
                pipe_id,
                delay,
            } => Message::CollectStart {
                user: f(user),
                pipe_id,
                delay,
            },
            Message::UpdatePipe { id, state } => Message::UpdatePipe { id, state },
            Message::CollectEnd { user } => Message::CollectEnd { user: f(user) },
            Message::UpdateUser { user, score } => Message::UpdateUser {
                user: f(user),
                score,
            },
        }
    }

    /// Wire tag, handy for structured log fields.
    pub fn tag(&self) -> &'static str {
        match self {
            Message::CollectStart { .. } => "CollectStart",
            Message::UpdatePipe { .. } => "UpdatePipe",
            Message::CollectEnd { .. } => "CollectEnd",
            Message::UpdateUser { .. } => "UpdateUser",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeState {
    pub value: Score,
    #[serde(with = "crate::ingest::secs")]
    pub base_delay: Duration,
    pub direction: PipeDirection,
    /// Active modifiers and their remaining intensity (uses left).
    #[serde(default)]
    pub modifiers: BTreeMap<Modifier, usize>,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PipeDirection {
    Up,
    Down,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Slow,
    Double,
    Min,
    Shuffle,
    Reverse,
}
