use crate::ingest::tests::test_helpers::{RecordingSink, update_user, update_user_line};
use crate::ingest::{
    CancelHandle, CancelToken, Feed, IngestReport, LogRecorder, NotifyPolicy, Outcome,
    SeriesModel, Session, SessionStatus, SourceError, SourceEvent, feed_queue, parse_entry,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

fn session(policy: NotifyPolicy) -> Session<RecordingSink> {
    Session::new(SeriesModel::default(), RecordingSink::default(), policy)
}

async fn run_with(session: &mut Session<RecordingSink>, items: Vec<Feed>) -> IngestReport {
    let (feed, rx) = feed_queue(items.len() + 1, CancelToken::never());
    for item in items {
        assert!(feed.send(item).await);
    }
    drop(feed);
    session.run(rx, CancelToken::never()).await
}

fn line(text: &str) -> Option<Feed> {
    match parse_entry(text) {
        Ok(Some(entry)) => Some(Feed::Entry(entry)),
        Ok(None) => None,
        Err(bad) => Some(Feed::Malformed(bad)),
    }
}

#[tokio::test]
async fn folds_two_score_updates() {
    // Arrange
    let mut session = session(NotifyPolicy::PerEntry);
    let items = vec![
        Feed::Entry(update_user(1.0, "u1", 10)),
        Feed::Entry(update_user(2.0, "u1", 15)),
        Feed::Source(SourceEvent::Finished),
    ];

    // Act
    let report = run_with(&mut session, items).await;

    // Assert
    assert_eq!(report.folded, 2);
    assert!(matches!(report.outcome, Outcome::Finished));
    let series = session.model().get("u1").unwrap();
    let points: Vec<(f64, i64)> = series.points().iter().map(|p| (p.time, p.score)).collect();
    assert_eq!(points, vec![(1.0, 10), (2.0, 15)]);
}

#[tokio::test]
async fn blank_line_between_entries_changes_nothing() {
    // Arrange
    let mut session = session(NotifyPolicy::Batched { every: 50 });
    let items: Vec<Feed> = [
        update_user_line(1.0, "u1", 10),
        String::new(),
        update_user_line(2.0, "u1", 15),
    ]
    .iter()
    .filter_map(|l| line(l))
    .collect();

    // Act
    let report = run_with(&mut session, items).await;

    // Assert
    assert_eq!(report.folded, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(session.model().get("u1").unwrap().points().len(), 2);
}

#[tokio::test]
async fn malformed_line_is_skipped_and_folding_continues() {
    // Arrange
    let mut session = session(NotifyPolicy::Batched { every: 50 });
    let items: Vec<Feed> = [
        update_user_line(1.0, "u1", 10),
        r#"{"time":1.5,"msg":{"type":"UpdateUser""#.to_string(),
        update_user_line(2.0, "u1", 15),
    ]
    .iter()
    .filter_map(|l| line(l))
    .collect();

    // Act
    let report = run_with(&mut session, items).await;

    // Assert
    assert_eq!(report.folded, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(session.model().get("u1").unwrap().latest().unwrap().score, 15);
    assert_eq!(
        session.sink().statuses,
        vec![SessionStatus::Finished {
            folded: 2,
            skipped: 1
        }]
    );
}

#[tokio::test]
async fn batched_replay_redraws_at_boundaries_and_once_at_the_end() {
    // Arrange
    let mut session = session(NotifyPolicy::Batched { every: 50 });
    let mut items: Vec<Feed> = (0..500)
        .map(|i| Feed::Entry(update_user(i as f64, "u1", i)))
        .collect();
    items.push(Feed::Source(SourceEvent::Finished));

    // Act
    let report = run_with(&mut session, items).await;

    // Assert
    assert_eq!(report.folded, 500);
    assert_eq!(report.redraws, 11);
    assert_eq!(session.sink().redraws, 11);
}

#[tokio::test]
async fn batched_replay_with_partial_last_batch() {
    // Arrange
    let mut session = session(NotifyPolicy::Batched { every: 50 });
    let items: Vec<Feed> = (0..120)
        .map(|i| Feed::Entry(update_user(i as f64, "u1", i)))
        .collect();

    // Act
    let report = run_with(&mut session, items).await;

    // Assert
    assert_eq!(report.redraws, 3);
    assert!(matches!(report.outcome, Outcome::Closed));
}

#[tokio::test]
async fn live_policy_redraws_per_entry() {
    // Arrange
    let mut session = session(NotifyPolicy::PerEntry);
    let items = vec![
        Feed::Source(SourceEvent::Connecting {
            endpoint: "ws://127.0.0.1:8080/logs".to_string(),
        }),
        Feed::Source(SourceEvent::Connected {
            endpoint: "ws://127.0.0.1:8080/logs".to_string(),
        }),
        Feed::Entry(update_user(1.0, "u1", 1)),
        Feed::Entry(update_user(2.0, "u2", 2)),
        Feed::Entry(update_user(3.0, "u1", 3)),
    ];

    // Act
    let report = run_with(&mut session, items).await;

    // Assert
    assert_eq!(report.redraws, 4);
    assert_eq!(session.sink().series_seen, vec![1, 2, 2, 2]);
    assert_eq!(
        session.sink().statuses[..2].to_vec(),
        vec![
            SessionStatus::Connecting {
                endpoint: "ws://127.0.0.1:8080/logs".to_string()
            },
            SessionStatus::Live {
                endpoint: "ws://127.0.0.1:8080/logs".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn failure_reports_what_was_folded_before_it() {
    // Arrange
    let mut session = session(NotifyPolicy::Batched { every: 50 });
    let items = vec![
        Feed::Entry(update_user(1.0, "u1", 10)),
        Feed::Source(SourceEvent::Failed(SourceError::HttpStatus {
            url: "http://127.0.0.1:8080/game.jsonl".to_string(),
            status: 404,
        })),
        Feed::Entry(update_user(2.0, "u1", 20)),
    ];

    // Act
    let report = run_with(&mut session, items).await;

    // Assert
    assert!(report.is_failure());
    assert_eq!(report.folded, 1);
    let status = session.sink().statuses.last().unwrap().to_string();
    assert_eq!(
        status,
        "failed after 1 entries: replay source http://127.0.0.1:8080/game.jsonl answered with HTTP 404"
    );
}

#[tokio::test]
async fn cancellation_ends_the_loop_and_announces_it() {
    // Arrange
    let handle = CancelHandle::new();
    let mut session = session(NotifyPolicy::PerEntry);
    let (feed, rx) = feed_queue(8, handle.token());
    assert!(feed.entry(update_user(1.0, "u1", 1)).await);

    // Act
    let (report, ()) = tokio::join!(session.run(rx, handle.token()), async {
        tokio::task::yield_now().await;
        handle.cancel();
    });

    // Assert
    assert!(matches!(report.outcome, Outcome::Cancelled));
    assert_eq!(report.folded, 1);
    assert_eq!(
        session.sink().statuses.last(),
        Some(&SessionStatus::Cancelled { folded: 1 })
    );
    assert!(!feed.entry(update_user(2.0, "u1", 2)).await);
}

#[tokio::test]
async fn recorder_tees_folded_entries_as_jsonl() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("game_log.jsonl");
    let recorder = LogRecorder::create(&path).unwrap();
    let mut session = session(NotifyPolicy::PerEntry).with_recorder(recorder);
    let items = vec![
        Feed::Entry(update_user(1.0, "u1", 10)),
        Feed::Entry(update_user(2.0, "u2", 4)),
    ];

    // Act
    run_with(&mut session, items).await;

    // Assert
    let written = fs::read_to_string(&path).unwrap();
    let parsed: Vec<_> = written
        .lines()
        .map(|l| parse_entry(l).unwrap().unwrap())
        .collect();
    assert_eq!(
        parsed,
        vec![update_user(1.0, "u1", 10), update_user(2.0, "u2", 4)]
    );
}
