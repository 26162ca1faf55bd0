//! Log Ingestion Pipeline
//!
//! This module turns the simulation's event log into a per-user score model that a
//! sink can draw.
//!
//! Entries reach us one of two ways:
//! - **Live**: a persistent WebSocket where every text frame is one whole entry
//! - **Replay**: one large newline-delimited body, pulled in chunks that can split
//!   lines, `\r\n` pairs and multi-byte characters anywhere
//!
//! Both adapters push onto a single bounded queue. One folding loop drains it,
//! so entries are applied in exactly the order they were decoded, whatever the
//! source. Replay folding yields back to the runtime every few dozen entries so a
//! large log never starves the rest of the process.
//!
//! The overall data processing architecture is:
//!
//! source (LiveAdapter | ReplayAdapter)
//! LineStream (replay only)
//! parse_entry
//! Feed queue
//! Session::run
//! SeriesModel::fold
//! Sink
//!

mod cancel;
mod color;
pub mod constants;
mod decoder;
mod error;
mod feed;
mod fold;
mod parse;
mod record;
mod secs;
mod session;
pub mod source;
mod types;
mod yield_ctl;

#[cfg(test)]
mod tests;

pub use cancel::{CancelHandle, CancelToken};
pub use color::{Rgb, hsl_to_rgb, series_color};
pub use decoder::{LineDecoder, LineError, LineStream};
pub use error::{DecodeError, MalformedEntry, SourceError};
pub use feed::{Feed, FeedSender, SourceEvent, feed_queue};
pub use fold::{FoldEffect, NameMap, PlayerSeries, Point, SeriesModel};
pub use parse::parse_entry;
pub use record::LogRecorder;
pub use session::{IngestReport, NotifyPolicy, Outcome, Session, SessionStatus};
pub use source::{FeedSource, LiveAdapter, ReplayAdapter, ReplaySource};
pub use types::{LogEntry, Message, Modifier, PipeDirection, PipeState, Score};
pub use yield_ctl::YieldController;

use crate::render::Sink;

/// Run one session to completion: the adapter and the folding loop are polled
/// together on the current task, joined by the entry queue.
pub async fn drive<A, S>(
    adapter: A,
    session: &mut Session<S>,
    queue_capacity: usize,
    cancel: CancelToken,
) -> IngestReport
where
    A: FeedSource,
    S: Sink,
{
    let (feed, rx) = feed_queue(queue_capacity, cancel.clone());
    let ((), report) = tokio::join!(adapter.produce(feed), session.run(rx, cancel));
    report
}
