use crate::ingest::constants::{DEFAULT_YIELD_EVERY, FILE_CHUNK_SIZE};
use crate::ingest::decoder::{LineError, LineStream};
use crate::ingest::error::SourceError;
use crate::ingest::feed::{Feed, FeedSender, SourceEvent};
use crate::ingest::parse::parse_entry;
use crate::ingest::session::NotifyPolicy;
use crate::ingest::source::FeedSource;
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use url::Url;

type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, SourceError>> + Send>>;

/// Where a complete historical log is pulled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaySource {
    Http(Url),
    File(PathBuf),
}

impl ReplaySource {
    /// `http`, `https` and `file` URLs are supported; anything else is handed back.
    pub fn from_url(url: Url) -> Result<Self, Url> {
        match url.scheme() {
            "http" | "https" => Ok(Self::Http(url)),
            "file" => url.to_file_path().map(Self::File).map_err(|_| url),
            _ => Err(url),
        }
    }

    async fn open(&self) -> Result<ChunkStream, SourceError> {
        match self {
            ReplaySource::Http(url) => {
                let response = reqwest::get(url.clone())
                    .await
                    .map_err(|e| SourceError::transfer(url.as_str(), e))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(SourceError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }

                let url = url.to_string();
                Ok(Box::pin(response.bytes_stream().map(move |chunk| {
                    chunk.map_err(|e| SourceError::transfer(url.as_str(), e))
                })))
            }
            ReplaySource::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| SourceError::io(path, e))?;
                Ok(Box::pin(file_chunks(file, path.clone())))
            }
        }
    }
}

impl fmt::Display for ReplaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplaySource::Http(url) => write!(f, "{url}"),
            ReplaySource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn file_chunks(
    file: tokio::fs::File,
    path: PathBuf,
) -> impl Stream<Item = Result<Bytes, SourceError>> {
    futures_util::stream::unfold(Some(file), move |state| {
        let path = path.clone();
        async move {
            let mut file = state?;
            let mut buf = BytesMut::with_capacity(FILE_CHUNK_SIZE);
            match file.read_buf(&mut buf).await {
                Ok(0) => None,
                Ok(_) => Some((Ok(buf.freeze()), Some(file))),
                Err(e) => Some((Err(SourceError::io(path, e)), None)),
            }
        }
    })
}

/// Pulls a bulk log through the line decoder and parser into the queue.
#[derive(Debug, Clone)]
pub struct ReplayAdapter {
    source: ReplaySource,
    yield_every: usize,
}

impl ReplayAdapter {
    pub fn new(source: ReplaySource) -> Self {
        Self {
            source,
            yield_every: DEFAULT_YIELD_EVERY,
        }
    }

    pub fn with_yield_every(mut self, every: usize) -> Self {
        self.yield_every = every.max(1);
        self
    }

    pub fn source(&self) -> &ReplaySource {
        &self.source
    }
}

impl FeedSource for ReplayAdapter {
    fn notify_policy(&self) -> NotifyPolicy {
        NotifyPolicy::Batched {
            every: self.yield_every,
        }
    }

    async fn produce(self, feed: FeedSender) {
        let cancel = feed.cancel_token().clone();
        info!(source = %self.source, "starting replay");

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            opened = self.source.open() => opened,
        };
        let chunks = match opened {
            Ok(chunks) => chunks,
            Err(err) => {
                feed.source(SourceEvent::Failed(err)).await;
                return;
            }
        };

        let mut lines = LineStream::new(chunks);
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                next = lines.next_line() => next,
            };

            let item = match next {
                None => {
                    debug!(lines = lines.lines_read(), "replay stream exhausted");
                    feed.source(SourceEvent::Finished).await;
                    return;
                }
                Some(Ok(line)) => match parse_entry(&line) {
                    Ok(Some(entry)) => Feed::Entry(entry),
                    Ok(None) => continue,
                    Err(bad) => Feed::Malformed(bad.on_stream_line(lines.lines_read())),
                },
                Some(Err(LineError::Decode(err))) => {
                    warn!(error = %err, lines = lines.lines_read(), "replay is not valid text past this point");
                    feed.source(SourceEvent::Truncated(err)).await;
                    return;
                }
                Some(Err(LineError::Source(err))) => {
                    feed.source(SourceEvent::Failed(err)).await;
                    return;
                }
            };

            if !feed.send(item).await {
                return;
            }
        }
    }
}
