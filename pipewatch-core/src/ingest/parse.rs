use crate::ingest::error::MalformedEntry;
use crate::ingest::types::LogEntry;

/// Parse one line (or one live frame) into a log entry.
///
/// Blank input is filler and yields `Ok(None)`. Anything else must be a
/// complete entry; the caller decides what to do with a `MalformedEntry`.
pub fn parse_entry(text: &str) -> Result<Option<LogEntry>, MalformedEntry> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    serde_json::from_str::<LogEntry>(trimmed)
        .map(Some)
        .map_err(|source| MalformedEntry::new(trimmed, source))
}
