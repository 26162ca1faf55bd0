use crate::ingest::source::Backoff;
use crate::ingest::tests::test_helpers::RecordingSink;
use crate::ingest::{
    CancelHandle, DecodeError, FeedSource, LiveAdapter, NotifyPolicy, Outcome, SeriesModel,
    Session, SessionStatus, SourceEvent, YieldController, drive,
};
use crate::render::Sink;
use pretty_assertions::assert_eq;
use std::net::TcpListener;
use std::time::Duration;
use url::Url;

/// Cancels the session as soon as a reconnect is scheduled.
struct CancelOnReconnect {
    inner: RecordingSink,
    handle: CancelHandle,
}

impl Sink for CancelOnReconnect {
    fn redraw(&mut self, model: &SeriesModel) {
        self.inner.redraw(model);
    }

    fn status(&mut self, status: &SessionStatus) {
        self.inner.status(status);
        if matches!(status, SessionStatus::Reconnecting { .. }) {
            self.handle.cancel();
        }
    }
}

fn unused_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("ws://127.0.0.1:{port}/logs")).unwrap()
}

#[test]
fn backoff_doubles_up_to_the_cap_and_resets() {
    // Arrange
    let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(10));

    // Act
    let delays: Vec<u64> = (0..6).map(|_| backoff.next_delay().as_secs()).collect();
    backoff.reset();

    // Assert
    assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);
    assert_eq!(backoff.next_delay(), Duration::from_secs(1));
}

#[test]
fn yield_controller_marks_every_nth_entry() {
    // Arrange
    let mut ctl = YieldController::new(50);

    // Act
    let marks: Vec<usize> = (1..=500).filter(|_| ctl.tick()).collect();

    // Assert
    assert_eq!(marks.len(), 10);
    assert_eq!(ctl.boundaries(), 10);
}

#[test]
fn terminal_events() {
    assert!(SourceEvent::Finished.is_terminal());
    assert!(SourceEvent::Cancelled.is_terminal());
    assert!(SourceEvent::Truncated(DecodeError::Truncated { pending: 1 }).is_terminal());
    assert!(!SourceEvent::Reconnecting { delay: Duration::ZERO }.is_terminal());
    assert!(
        !SourceEvent::Disconnected {
            reason: "reset".to_string()
        }
        .is_terminal()
    );
}

#[test]
fn cancel_token_reflects_the_handle() {
    // Arrange
    let handle = CancelHandle::new();
    let token = handle.token();

    // Act
    let before = token.is_cancelled();
    handle.cancel();
    handle.cancel();

    // Assert
    assert!(!before);
    assert!(token.is_cancelled());
}

#[test]
fn live_adapter_notifies_per_entry() {
    let adapter = LiveAdapter::new(Url::parse("ws://127.0.0.1:8080/logs").unwrap());
    assert_eq!(adapter.notify_policy(), NotifyPolicy::PerEntry);
}

#[tokio::test]
async fn unreachable_endpoint_without_reconnect_fails() {
    // Arrange
    let endpoint = unused_endpoint();
    let adapter = LiveAdapter::new(endpoint.clone()).with_reconnect(false);
    let mut session = Session::new(
        SeriesModel::default(),
        RecordingSink::default(),
        adapter.notify_policy(),
    );

    // Act
    let report = drive(adapter, &mut session, 16, CancelHandle::new().token()).await;

    // Assert
    assert!(report.is_failure());
    let statuses = &session.sink().statuses;
    assert_eq!(
        statuses[0],
        SessionStatus::Connecting {
            endpoint: endpoint.to_string()
        }
    );
    assert!(matches!(statuses[1], SessionStatus::Disconnected { .. }));
    assert!(matches!(statuses[2], SessionStatus::Failed { folded: 0, .. }));
}

#[tokio::test]
async fn unreachable_endpoint_with_reconnect_schedules_a_retry() {
    // Arrange
    let handle = CancelHandle::new();
    let adapter = LiveAdapter::new(unused_endpoint())
        .with_backoff(Duration::from_millis(10), Duration::from_millis(40));
    let sink = CancelOnReconnect {
        inner: RecordingSink::default(),
        handle: handle.clone(),
    };
    let mut session = Session::new(SeriesModel::default(), sink, adapter.notify_policy());

    // Act
    let report = drive(adapter, &mut session, 16, handle.token()).await;

    // Assert
    assert!(matches!(report.outcome, Outcome::Cancelled));
    let statuses = &session.sink().inner.statuses;
    assert!(matches!(statuses[0], SessionStatus::Connecting { .. }));
    assert!(matches!(statuses[1], SessionStatus::Disconnected { .. }));
    assert_eq!(
        statuses[2],
        SessionStatus::Reconnecting {
            delay: Duration::from_millis(10)
        }
    );
    assert_eq!(statuses.last(), Some(&SessionStatus::Cancelled { folded: 0 }));
}
