use pipewatch_core::ingest::{LogEntry, Message};

pub fn score_entry(time: f64, user: &str, score: i64) -> LogEntry {
    LogEntry {
        time,
        msg: Message::UpdateUser {
            user: user.to_string(),
            score,
        },
    }
}

/// One compact JSONL line, no terminator.
pub fn score_line(time: f64, user: &str, score: i64) -> String {
    serde_json::to_string(&score_entry(time, user, score)).expect("entry serializes")
}

/// A frame the way the simulation pushes it: pretty-printed over several lines.
pub fn pretty_frame(time: f64, user: &str, score: i64) -> String {
    serde_json::to_string_pretty(&score_entry(time, user, score)).expect("entry serializes")
}

/// `count` score updates alternating between `users`, joined with `terminator`.
pub fn scores_body(count: usize, users: &[&str], terminator: &str) -> String {
    (0..count)
        .map(|i| {
            let user = users[i % users.len()];
            score_line(i as f64 * 0.25, user, i as i64) + terminator
        })
        .collect()
}
