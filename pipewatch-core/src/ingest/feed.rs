use crate::ingest::cancel::CancelToken;
use crate::ingest::error::{DecodeError, MalformedEntry, SourceError};
use crate::ingest::types::LogEntry;
use std::time::Duration;
use tokio::sync::mpsc;

/// One item on the session's single entry queue.
#[derive(Debug)]
pub enum Feed {
    Entry(LogEntry),
    Malformed(MalformedEntry),
    Source(SourceEvent),
}

#[derive(Debug)]
pub enum SourceEvent {
    Connecting { endpoint: String },
    Connected { endpoint: String },
    Disconnected { reason: String },
    Reconnecting { delay: Duration },
    Finished,
    /// The byte stream stopped being text; salvaged lines were already queued.
    Truncated(DecodeError),
    Failed(SourceError),
    Cancelled,
}

impl SourceEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SourceEvent::Finished
                | SourceEvent::Truncated(_)
                | SourceEvent::Failed(_)
                | SourceEvent::Cancelled
        )
    }
}

/// Producer end of the entry queue, shared by both adapters.
pub struct FeedSender {
    tx: mpsc::Sender<Feed>,
    cancel: CancelToken,
}

impl FeedSender {
    /// Queue `feed`, waiting for room. Returns `false` once the session is
    /// gone or cancelled, at which point the producer should stop.
    pub async fn send(&self, feed: Feed) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(feed) => sent.is_ok(),
        }
    }

    pub async fn entry(&self, entry: LogEntry) -> bool {
        self.send(Feed::Entry(entry)).await
    }

    pub async fn source(&self, event: SourceEvent) -> bool {
        self.send(Feed::Source(event)).await
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

pub fn feed_queue(capacity: usize, cancel: CancelToken) -> (FeedSender, mpsc::Receiver<Feed>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (FeedSender { tx, cancel }, rx)
}
