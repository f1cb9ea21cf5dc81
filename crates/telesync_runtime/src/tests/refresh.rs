use std::sync::Arc;
use std::time::Duration;

use telesync_constant::texts;
use telesync_core::{ConversationId, MessageId, RefreshOutcome};
use telesync_directory::ClientConfig;

use super::support::{
    config, default_harness, harness, snapshot, unsynced_harness, SwitchableSource,
    UnreachableSource, CHAT,
};

#[tokio::test]
async fn test_refresh_posts_roster_and_footer() {
    let h = default_harness(&["Alpha", "Beta"]).await;

    let report = h.coordinator.refresh(CHAT).await;

    assert_eq!(
        report.outcome,
        RefreshOutcome::Done {
            pages_delivered: 1,
            pages_failed: 0
        }
    );
    assert_eq!(report.live_messages.len(), 2);
    assert_eq!(
        h.sink.text_of(report.live_messages[0]).unwrap(),
        "Alpha\n• x\n• y\nBeta\n• w"
    );
    assert!(h
        .sink
        .text_of(report.live_messages[1])
        .unwrap()
        .contains(texts::LAST_UPDATED));

    // Placeholder was posted first and superseded.
    assert_eq!(h.sink.sent_texts()[0], texts::LOADING);
    assert_eq!(h.sink.visible(CHAT), report.live_messages);
    assert_eq!(h.sessions.current_live_messages(CHAT).await, report.live_messages);

    h.directory.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_refresh_with_absent_categories() {
    let h = default_harness(&["Alpha", "Missing"]).await;

    let report = h.coordinator.refresh(CHAT).await;

    assert!(report.is_done());
    assert_eq!(h.sink.text_of(report.live_messages[0]).unwrap(), "Alpha\n• x\n• y");
}

#[tokio::test]
async fn test_no_matches_message() {
    let h = default_harness(&["Nothing here"]).await;

    let report = h.coordinator.refresh(CHAT).await;

    assert!(report.is_done());
    assert_eq!(h.sink.text_of(report.live_messages[0]).unwrap(), texts::NO_MATCHES);
}

#[tokio::test]
async fn test_second_refresh_retires_first() {
    let h = default_harness(&["Alpha"]).await;

    let first = h.coordinator.refresh(CHAT).await;
    let second = h.coordinator.refresh(CHAT).await;

    assert_eq!(second.retire_failures, 0);
    for id in &first.live_messages {
        assert!(h.sink.is_deleted(*id));
    }
    assert_eq!(h.sink.visible(CHAT), second.live_messages);
}

#[tokio::test]
async fn test_retirement_is_idempotent() {
    let h = default_harness(&["Alpha"]).await;

    let first = h.coordinator.refresh(CHAT).await;
    h.coordinator.refresh(CHAT).await;

    // Put already-deleted ids back and retire them a second time.
    h.sessions
        .replace_live_messages(CHAT, first.live_messages.clone())
        .await;
    let third = h.coordinator.refresh(CHAT).await;

    assert!(third.is_done());
    assert_eq!(third.retire_failures, first.live_messages.len());

    // Ids never posted at all are tolerated too.
    h.sessions
        .replace_live_messages(CHAT, vec![MessageId(9_000), MessageId(9_001)])
        .await;
    let fourth = h.coordinator.refresh(CHAT).await;
    assert!(fourth.is_done());
    assert_eq!(fourth.retire_failures, 2);
}

#[tokio::test]
async fn test_partial_page_failure_continues() {
    // "Alpha\n• x\n• y" is 13 characters, so Beta lands on its own page.
    let source = SwitchableSource::new(snapshot());
    let h = harness(
        source,
        config(&["Alpha", "Beta", "Gamma"]).with_page_limit(13),
        ClientConfig::new(),
    )
    .await;
    h.sink.fail_sends_containing("Beta");

    let report = h.coordinator.refresh(CHAT).await;

    assert_eq!(
        report.outcome,
        RefreshOutcome::Done {
            pages_delivered: 2,
            pages_failed: 1
        }
    );
    let live_texts: Vec<String> = report
        .live_messages
        .iter()
        .map(|id| h.sink.text_of(*id).unwrap())
        .collect();
    assert_eq!(live_texts[0], "Alpha\n• x\n• y");
    assert_eq!(live_texts[1], "Gamma\n• z");
    assert!(live_texts[2].starts_with(texts::PARTIAL_FAILURE));
    assert!(live_texts[3].contains(texts::LAST_UPDATED));
    assert_eq!(live_texts.len(), 4);
}

#[tokio::test]
async fn test_fetch_timeout_then_recovery() {
    let source = SwitchableSource::new(snapshot());
    let h = harness(
        Arc::clone(&source) as Arc<dyn telesync_directory::DirectorySource>,
        config(&["Alpha"]).with_snapshot_timeout(Duration::from_millis(100)),
        ClientConfig::new().with_max_staleness(Duration::ZERO),
    )
    .await;

    source.set_delay(Duration::from_millis(300));
    let failed = h.coordinator.refresh(CHAT).await;

    assert!(matches!(failed.outcome, RefreshOutcome::Failed { .. }));
    assert_eq!(failed.live_messages.len(), 1);
    assert_eq!(h.sink.text_of(failed.live_messages[0]).unwrap(), texts::TIMEOUT);
    assert_eq!(h.sessions.current_live_messages(CHAT).await, failed.live_messages);

    let session = h.sessions.get_or_create(CHAT).await;
    assert!(session.try_lock().is_some(), "gate must be released after a failed cycle");
    drop(session);

    // Let the abandoned fetch finish, then refresh normally.
    source.set_delay(Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(400)).await;
    let recovered = h.coordinator.refresh(CHAT).await;

    assert!(recovered.is_done());
    assert!(h.sink.is_deleted(failed.live_messages[0]));
    assert_eq!(h.sink.visible(CHAT), recovered.live_messages);

    h.directory.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_not_ready_directory_shows_not_ready() {
    let h = unsynced_harness(
        Arc::new(UnreachableSource),
        config(&["Alpha"]),
        ClientConfig::new().with_wait_for_ready(false),
    );

    let report = h.coordinator.refresh(CHAT).await;

    assert!(matches!(report.outcome, RefreshOutcome::Failed { .. }));
    assert_eq!(report.live_messages.len(), 1);
    assert_eq!(h.sink.text_of(report.live_messages[0]).unwrap(), texts::NOT_READY);
    assert_eq!(h.sink.visible(CHAT), report.live_messages);
    assert_eq!(h.sessions.current_live_messages(CHAT).await, report.live_messages);

    let session = h.sessions.get_or_create(CHAT).await;
    assert!(session.try_lock().is_some(), "gate must be released after a failed cycle");
}

#[tokio::test]
async fn test_failure_notice_sent_when_placeholder_cannot_be_edited() {
    let h = unsynced_harness(
        Arc::new(UnreachableSource),
        config(&["Alpha"]),
        ClientConfig::new().with_wait_for_ready(false),
    );
    h.sink.fail_edits();

    let report = h.coordinator.refresh(CHAT).await;

    assert!(matches!(report.outcome, RefreshOutcome::Failed { .. }));
    let live_texts: Vec<String> = report
        .live_messages
        .iter()
        .map(|id| h.sink.text_of(*id).unwrap())
        .collect();
    assert_eq!(live_texts, vec![texts::LOADING.to_string(), texts::NOT_READY.to_string()]);
    assert_eq!(h.sink.visible(CHAT), report.live_messages);
    assert_eq!(h.sessions.current_live_messages(CHAT).await, report.live_messages);
}

#[tokio::test]
async fn test_panic_mid_cycle_keeps_session_in_sync() {
    let h = default_harness(&["Alpha"]).await;
    assert!(h.coordinator.refresh(CHAT).await.is_done());

    h.sink.panic_on_send_containing("• x");
    let broken = h.coordinator.refresh(CHAT).await;

    match &broken.outcome {
        RefreshOutcome::Failed { reason } => assert!(reason.contains("sink exploded")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    // Only the placeholder was posted before the page send blew up.
    assert_eq!(broken.live_messages.len(), 1);
    assert_eq!(h.sink.text_of(broken.live_messages[0]).unwrap(), texts::LOADING);
    assert_eq!(h.sink.visible(CHAT), broken.live_messages);
    assert_eq!(h.sessions.current_live_messages(CHAT).await, broken.live_messages);

    h.sink.clear_markers();
    let next = h.coordinator.refresh(CHAT).await;

    assert!(next.is_done());
    assert_eq!(next.retire_failures, 0);
    assert!(h.sink.is_deleted(broken.live_messages[0]));
    assert_eq!(h.sink.visible(CHAT), next.live_messages);
}

#[tokio::test]
async fn test_concurrent_refreshes_same_conversation() {
    let h = default_harness(&["Alpha", "Beta"]).await;
    h.sink.set_send_delay(Duration::from_millis(10));

    let (a, b) = tokio::join!(h.coordinator.refresh(CHAT), h.coordinator.refresh(CHAT));
    assert!(a.is_done() && b.is_done());

    let committed = h.sessions.current_live_messages(CHAT).await;
    let (later, earlier) = if committed == a.live_messages { (a, b) } else { (b, a) };

    assert_eq!(committed, later.live_messages);
    assert_eq!(later.retire_failures, 0);
    for id in &earlier.live_messages {
        assert!(h.sink.is_deleted(*id), "earlier cycle's message {} still visible", id);
    }
    assert_eq!(h.sink.visible(CHAT), later.live_messages);
}

#[tokio::test]
async fn test_other_conversation_not_blocked_by_gate() {
    let h = default_harness(&["Alpha"]).await;

    let busy = h.sessions.get_or_create(ConversationId(1)).await;
    let _held = busy.lock().await;

    let report = tokio::time::timeout(
        Duration::from_secs(2),
        h.coordinator.refresh(ConversationId(2)),
    )
    .await
    .expect("refresh of another conversation must not wait for this gate");
    assert!(report.is_done());
}

#[tokio::test]
async fn test_admission_limit_still_serves_everyone() {
    let source = SwitchableSource::new(snapshot());
    let h = harness(
        source,
        config(&["Alpha"]).with_max_concurrent_refreshes(1),
        ClientConfig::new(),
    )
    .await;
    h.sink.set_send_delay(Duration::from_millis(5));

    let reports = futures::future::join_all(
        (1..=4).map(|chat| h.coordinator.refresh(ConversationId(chat))),
    )
    .await;

    assert!(reports.iter().all(|r| r.is_done()));
    assert_eq!(h.sessions.len().await, 4);
}
