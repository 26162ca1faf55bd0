use crate::ingest::{LogEntry, Message, SeriesModel, SessionStatus};
use crate::render::Sink;
use std::time::Duration;

pub(crate) fn update_user_line(time: f64, user: &str, score: i64) -> String {
    format!(r#"{{"time":{time},"msg":{{"type":"UpdateUser","user":"{user}","score":{score}}}}}"#)
}

pub(crate) fn update_user(time: f64, user: &str, score: i64) -> LogEntry {
    LogEntry {
        time,
        msg: Message::UpdateUser {
            user: user.to_string(),
            score,
        },
    }
}

pub(crate) fn collect_start(time: f64, user: &str) -> LogEntry {
    LogEntry {
        time,
        msg: Message::CollectStart {
            user: user.to_string(),
            pipe_id: 1,
            delay: Duration::from_millis(1500),
        },
    }
}

pub(crate) fn collect_end(time: f64, user: &str) -> LogEntry {
    LogEntry {
        time,
        msg: Message::CollectEnd {
            user: user.to_string(),
        },
    }
}

/// Counts what the folding loop tells it.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub redraws: usize,
    pub series_seen: Vec<usize>,
    pub statuses: Vec<SessionStatus>,
}

impl Sink for RecordingSink {
    fn redraw(&mut self, model: &SeriesModel) {
        self.redraws += 1;
        self.series_seen.push(model.len());
    }

    fn status(&mut self, status: &SessionStatus) {
        self.statuses.push(status.clone());
    }
}
