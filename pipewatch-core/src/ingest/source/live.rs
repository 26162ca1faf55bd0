use crate::ingest::constants::{DEFAULT_BACKOFF_INITIAL, DEFAULT_BACKOFF_MAX};
use crate::ingest::error::SourceError;
use crate::ingest::feed::{Feed, FeedSender, SourceEvent};
use crate::ingest::parse::parse_entry;
use crate::ingest::session::NotifyPolicy;
use crate::ingest::source::{Backoff, FeedSource};
use futures_util::StreamExt;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

/// Follows the simulation's push connection, one entry per frame.
#[derive(Debug, Clone)]
pub struct LiveAdapter {
    endpoint: Url,
    reconnect: bool,
    backoff_initial: Duration,
    backoff_max: Duration,
}

/// Why a connection ended.
enum Closed {
    Dropped(String),
    Cancelled,
    QueueGone,
}

impl LiveAdapter {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            reconnect: true,
            backoff_initial: DEFAULT_BACKOFF_INITIAL,
            backoff_max: DEFAULT_BACKOFF_MAX,
        }
    }

    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.backoff_initial = initial;
        self.backoff_max = max;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Read frames until the connection drops. Each text frame is one whole
    /// entry, often pretty-printed over several lines, so no line splitting.
    async fn follow<S>(&self, ws: &mut S, feed: &FeedSender) -> Closed
    where
        S: futures_util::Stream<
                Item = Result<Message, tokio_tungstenite::tungstenite::Error>,
            > + Unpin,
    {
        let cancel = feed.cancel_token();
        loop {
            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Closed::Cancelled,
                frame = ws.next() => frame,
            };

            let item = match frame {
                Some(Ok(Message::Text(text))) => match parse_entry(text.as_str()) {
                    Ok(Some(entry)) => Feed::Entry(entry),
                    Ok(None) => continue,
                    Err(bad) => Feed::Malformed(bad),
                },
                Some(Ok(Message::Binary(bytes))) => {
                    warn!(len = bytes.len(), "ignoring binary frame on log connection");
                    continue;
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("closed by server ({})", f.code))
                        .unwrap_or_else(|| "closed by server".to_string());
                    return Closed::Dropped(reason);
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Closed::Dropped(err.to_string()),
                None => return Closed::Dropped("connection closed".to_string()),
            };

            if !feed.send(item).await {
                return if cancel.is_cancelled() {
                    Closed::Cancelled
                } else {
                    Closed::QueueGone
                };
            }
        }
    }
}

impl FeedSource for LiveAdapter {
    fn notify_policy(&self) -> NotifyPolicy {
        NotifyPolicy::PerEntry
    }

    async fn produce(self, feed: FeedSender) {
        let cancel = feed.cancel_token().clone();
        let endpoint = self.endpoint.to_string();
        let mut backoff = Backoff::new(self.backoff_initial, self.backoff_max);

        loop {
            if !feed
                .source(SourceEvent::Connecting {
                    endpoint: endpoint.clone(),
                })
                .await
            {
                return;
            }

            let connected = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                connected = connect_async(endpoint.as_str()) => connected,
            };

            let reason = match connected {
                Ok((mut ws, _)) => {
                    info!(endpoint = %endpoint, "live log connected");
                    backoff.reset();
                    if !feed
                        .source(SourceEvent::Connected {
                            endpoint: endpoint.clone(),
                        })
                        .await
                    {
                        return;
                    }

                    match self.follow(&mut ws, &feed).await {
                        Closed::Dropped(reason) => reason,
                        Closed::Cancelled | Closed::QueueGone => {
                            let _ = ws.close(None).await;
                            return;
                        }
                    }
                }
                Err(err) => {
                    warn!(endpoint = %endpoint, error = %err, "live log connect failed");
                    err.to_string()
                }
            };

            if !feed
                .source(SourceEvent::Disconnected {
                    reason: reason.clone(),
                })
                .await
            {
                return;
            }

            if !self.reconnect {
                feed.source(SourceEvent::Failed(SourceError::Connection {
                    endpoint: endpoint.clone(),
                    reason,
                }))
                .await;
                return;
            }

            let delay = backoff.next_delay();
            debug!(delay_ms = delay.as_millis() as u64, "scheduling reconnect");
            if !feed.source(SourceEvent::Reconnecting { delay }).await {
                return;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
