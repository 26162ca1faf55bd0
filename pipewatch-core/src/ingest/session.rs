use crate::ingest::cancel::CancelToken;
use crate::ingest::error::{DecodeError, SourceError};
use crate::ingest::feed::{Feed, SourceEvent};
use crate::ingest::fold::SeriesModel;
use crate::ingest::record::LogRecorder;
use crate::ingest::types::LogEntry;
use crate::ingest::yield_ctl::YieldController;
use crate::render::Sink;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};

/// When the sink hears about model changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyPolicy {
    /// Redraw after every folded entry (live).
    PerEntry,
    /// Redraw at each yield boundary and once at the end (replay).
    Batched { every: usize },
}

/// One-line, user-visible state of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Connecting { endpoint: String },
    Live { endpoint: String },
    Disconnected { reason: String },
    Reconnecting { delay: Duration },
    Finished { folded: usize, skipped: usize },
    Truncated { diagnostic: String, folded: usize },
    Failed { diagnostic: String, folded: usize },
    Cancelled { folded: usize },
}

impl SessionStatus {
    fn from_event(event: &SourceEvent, folded: usize, skipped: usize) -> Self {
        match event {
            SourceEvent::Connecting { endpoint } => Self::Connecting {
                endpoint: endpoint.clone(),
            },
            SourceEvent::Connected { endpoint } => Self::Live {
                endpoint: endpoint.clone(),
            },
            SourceEvent::Disconnected { reason } => Self::Disconnected {
                reason: reason.clone(),
            },
            SourceEvent::Reconnecting { delay } => Self::Reconnecting { delay: *delay },
            SourceEvent::Finished => Self::Finished { folded, skipped },
            SourceEvent::Truncated(err) => Self::Truncated {
                diagnostic: err.to_string(),
                folded,
            },
            SourceEvent::Failed(err) => Self::Failed {
                diagnostic: err.to_string(),
                folded,
            },
            SourceEvent::Cancelled => Self::Cancelled { folded },
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting { endpoint } => write!(f, "connecting to {endpoint}"),
            Self::Live { endpoint } => write!(f, "live: {endpoint}"),
            Self::Disconnected { reason } => write!(f, "disconnected: {reason}"),
            Self::Reconnecting { delay } => {
                write!(f, "reconnecting in {:.1}s", delay.as_secs_f64())
            }
            Self::Finished { folded, skipped } => {
                write!(f, "replay complete: {folded} entries")?;
                if *skipped > 0 {
                    write!(f, ", {skipped} malformed skipped")?;
                }
                Ok(())
            }
            Self::Truncated { diagnostic, folded } => {
                write!(f, "replay cut short after {folded} entries: {diagnostic}")
            }
            Self::Failed { diagnostic, folded } => {
                write!(f, "failed after {folded} entries: {diagnostic}")
            }
            Self::Cancelled { folded } => write!(f, "cancelled after {folded} entries"),
        }
    }
}

#[derive(Debug, Default)]
pub enum Outcome {
    Finished,
    Truncated(DecodeError),
    Failed(SourceError),
    Cancelled,
    /// The producer went away without a closing event.
    #[default]
    Closed,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub folded: usize,
    pub skipped: usize,
    pub redraws: usize,
    pub outcome: Outcome,
}

impl IngestReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// The single folding loop of a session.
///
/// Owns the model and the sink. Whatever the source, entries reach
/// `SeriesModel::fold` only from here, strictly in queue order.
pub struct Session<S> {
    model: SeriesModel,
    sink: S,
    policy: NotifyPolicy,
    recorder: Option<LogRecorder>,
    redraws: usize,
}

impl<S: Sink> Session<S> {
    pub fn new(model: SeriesModel, sink: S, policy: NotifyPolicy) -> Self {
        Self {
            model,
            sink,
            policy,
            recorder: None,
            redraws: 0,
        }
    }

    pub fn with_recorder(mut self, recorder: LogRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn model(&self) -> &SeriesModel {
        &self.model
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (SeriesModel, S) {
        (self.model, self.sink)
    }

    pub async fn run(&mut self, mut rx: mpsc::Receiver<Feed>, cancel: CancelToken) -> IngestReport {
        let mut yields = match self.policy {
            NotifyPolicy::PerEntry => None,
            NotifyPolicy::Batched { every } => Some(YieldController::new(every)),
        };
        let mut folded = 0;
        let mut skipped = 0;
        let mut announced = false;

        let outcome = loop {
            let feed = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Outcome::Cancelled,
                feed = rx.recv() => feed,
            };
            let Some(feed) = feed else {
                break Outcome::Closed;
            };

            match feed {
                Feed::Entry(entry) => {
                    self.record(&entry);
                    let effect = self.model.fold(&entry);
                    trace!(tag = entry.msg.tag(), time = entry.time, ?effect, "folded entry");
                    folded += 1;

                    match yields.as_mut() {
                        None => self.redraw(),
                        Some(ctl) => {
                            if ctl.tick() {
                                self.redraw();
                                ctl.pause().await;
                            }
                        }
                    }
                }
                Feed::Malformed(bad) => {
                    skipped += 1;
                    warn!(
                        stream_line = ?bad.stream_line,
                        line = bad.line,
                        column = bad.column,
                        text = %bad.text,
                        error = %bad.source,
                        "skipping malformed entry"
                    );
                }
                Feed::Source(event) => {
                    let status = SessionStatus::from_event(&event, folded, skipped);
                    log_status(&status);
                    self.sink.status(&status);

                    if event.is_terminal() {
                        announced = true;
                        break match event {
                            SourceEvent::Truncated(err) => Outcome::Truncated(err),
                            SourceEvent::Failed(err) => Outcome::Failed(err),
                            SourceEvent::Cancelled => Outcome::Cancelled,
                            _ => Outcome::Finished,
                        };
                    }
                }
            }
        };

        if !announced {
            let status = match outcome {
                Outcome::Cancelled => SessionStatus::Cancelled { folded },
                _ => SessionStatus::Finished { folded, skipped },
            };
            log_status(&status);
            self.sink.status(&status);
        }

        self.redraw();

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.flush() {
                warn!(error = %e, "failed to flush recorded log");
            }
        }

        info!(folded, skipped, redraws = self.redraws, "session ended");

        IngestReport {
            folded,
            skipped,
            redraws: self.redraws,
            outcome,
        }
    }

    fn redraw(&mut self) {
        self.redraws += 1;
        self.sink.redraw(&self.model);
    }

    fn record(&mut self, entry: &LogEntry) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        if let Err(e) = recorder.record(entry) {
            // Stop recording rather than failing the session.
            warn!(error = %e, written = recorder.written(), "recording disabled");
            self.recorder = None;
        }
    }
}

fn log_status(status: &SessionStatus) {
    match status {
        SessionStatus::Failed { .. } => error!(%status, "source failed"),
        SessionStatus::Disconnected { .. } | SessionStatus::Truncated { .. } => {
            warn!(%status, "source interrupted")
        }
        _ => info!(%status, "source status"),
    }
}
