mod backoff;
mod live;
mod replay;

pub use backoff::Backoff;
pub use live::LiveAdapter;
pub use replay::{ReplayAdapter, ReplaySource};

use crate::ingest::feed::FeedSender;
use crate::ingest::session::NotifyPolicy;

/// A producer feeding the session's entry queue.
#[allow(async_fn_in_trait)]
pub trait FeedSource {
    /// How the folding loop should notify the sink for this source.
    fn notify_policy(&self) -> NotifyPolicy;

    /// Push entries until the source ends, fails, or is cancelled. The last
    /// item sent is always a terminal `SourceEvent` unless the queue is gone.
    async fn produce(self, feed: FeedSender);
}
