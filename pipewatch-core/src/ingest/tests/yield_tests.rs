use crate::ingest::tests::test_helpers::update_user;
use crate::ingest::{
    CancelToken, FeedSender, FeedSource, NotifyPolicy, SeriesModel, Session, SessionStatus,
    SourceEvent, drive,
};
use crate::render::Sink;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Queues every entry up front; sending never waits on the queue.
struct Burst {
    entries: usize,
    every: usize,
}

impl FeedSource for Burst {
    fn notify_policy(&self) -> NotifyPolicy {
        NotifyPolicy::Batched { every: self.every }
    }

    async fn produce(self, feed: FeedSender) {
        for i in 0..self.entries {
            if !feed.entry(update_user(i as f64, "u1", i as i64)).await {
                return;
            }
        }
        feed.source(SourceEvent::Finished).await;
    }
}

/// Samples a counter bumped by a competing task at every redraw.
struct TickSampler {
    ticks: Arc<AtomicUsize>,
    seen: Vec<usize>,
}

impl Sink for TickSampler {
    fn redraw(&mut self, _model: &SeriesModel) {
        self.seen.push(self.ticks.load(Ordering::SeqCst));
    }

    fn status(&mut self, _status: &SessionStatus) {}
}

#[tokio::test(flavor = "current_thread")]
async fn replay_hands_the_runtime_a_turn_at_every_boundary() {
    // Arrange
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();
    tokio::spawn(async move {
        loop {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
        }
    });

    let source = Burst {
        entries: 500,
        every: 50,
    };
    let sink = TickSampler {
        ticks: ticks.clone(),
        seen: Vec::new(),
    };
    let mut session = Session::new(SeriesModel::default(), sink, source.notify_policy());

    // Act
    let report = drive(source, &mut session, 1024, CancelToken::never()).await;

    // Assert
    assert_eq!(report.folded, 500);
    assert_eq!(report.redraws, 11);

    let boundaries = &session.sink().seen[..10];
    for pair in boundaries.windows(2) {
        assert!(
            pair[1] > pair[0],
            "no other task ran between boundary redraws: {boundaries:?}"
        );
    }
}
