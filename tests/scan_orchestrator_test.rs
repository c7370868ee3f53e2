//! End-to-end scan cycles over a temporary document and policy directory.

mod common;

use common::{FakeDetector, Fixture, Response, candidate, semantic};
use policywatch::application::{ScanEvent, ScanOutcome};
use policywatch::domain::models::{ViolationFilter, ViolationStatus};
use policywatch::ScanError;
use policywatch::services::DetectorKind;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const RISKY_DOC: &str = "Sharing: restricted.\n\
    Deploy key: sk_live_abcdefghijklmnop\n\
    Once uploaded, users cannot delete their photos.";

const CLEAN_DOC: &str = "A perfectly ordinary onboarding guide.";

fn completed(outcome: &ScanOutcome) -> (policywatch::ReconcileSummary, DetectorKind) {
    match outcome {
        ScanOutcome::Completed { summary, detector } => (*summary, *detector),
        other => panic!("expected a completed scan, got {other:?}"),
    }
}

#[tokio::test]
async fn test_heuristic_startup_scan_finds_token_and_retention() {
    let fixture = Fixture::new(RISKY_DOC);
    let orchestrator = fixture.orchestrator(None);

    let outcome = orchestrator.initialize().await.unwrap();
    let (summary, detector) = completed(&outcome);
    assert_eq!(detector, DetectorKind::Heuristic);
    assert_eq!(summary.new, 2);
    assert!(summary.changed);

    let violations = orchestrator
        .monitor()
        .violations(&ViolationFilter::default())
        .await;
    let token = violations.iter().find(|v| v.id == "b-003").unwrap();
    assert_eq!(token.policy_id, "secrets-handling");
    assert_eq!(token.status, ViolationStatus::Open);
    let retention = violations.iter().find(|v| v.id == "b-004").unwrap();
    assert_eq!(retention.policy_id, "data-retention");
    assert!(retention.details.evidence.contains("cannot delete"));

    let status = orchestrator.monitor().status().await;
    assert!(status.last_scan_at.is_some());
    assert!(status.last_scan_error.is_none());
    assert_eq!(status.detector_mode, "heuristic");
    assert_eq!(status.open_count, 2);
}

#[tokio::test]
async fn test_unchanged_inputs_detect_only_once() {
    let fixture = Fixture::new(RISKY_DOC);
    let detector = FakeDetector::returning(vec![candidate("s-1", "gdpr")]);
    let orchestrator = fixture.orchestrator(semantic(&detector));

    assert_ok!(orchestrator.initialize().await);
    assert_eq!(detector.calls(), 1);
    let before = orchestrator.monitor().status().await;
    let ledger_before = orchestrator
        .monitor()
        .violations(&ViolationFilter::default())
        .await;

    assert_eq!(assert_ok!(orchestrator.scan_once(false).await), ScanOutcome::Skipped);
    assert_eq!(assert_ok!(orchestrator.scan_once(false).await), ScanOutcome::Skipped);
    assert_eq!(detector.calls(), 1, "no detection without a change");

    // Skipped cycles leave every piece of state as it was.
    let after = orchestrator.monitor().status().await;
    assert_eq!(after.cycles_run, 1);
    assert_eq!(after.detections_run, 1);
    assert_eq!(after.last_scan_at, before.last_scan_at);
    assert_eq!(after.last_scan_error, before.last_scan_error);
    assert_eq!(after.last_detector_diagnostic, before.last_detector_diagnostic);
    assert_eq!(
        orchestrator
            .monitor()
            .violations(&ViolationFilter::default())
            .await,
        ledger_before
    );
}

#[tokio::test]
async fn test_document_change_triggers_scan() {
    let fixture = Fixture::new(RISKY_DOC);
    let detector = FakeDetector::returning(vec![]);
    let orchestrator = fixture.orchestrator(semantic(&detector));
    orchestrator.initialize().await.unwrap();

    fixture.write_document(CLEAN_DOC, 60);
    let outcome = orchestrator.scan_once(false).await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Completed { .. }));
    assert_eq!(detector.calls(), 2);
}

#[tokio::test]
async fn test_policy_change_triggers_scan() {
    let fixture = Fixture::new(RISKY_DOC);
    let detector = FakeDetector::returning(vec![]);
    let orchestrator = fixture.orchestrator(semantic(&detector));
    orchestrator.initialize().await.unwrap();
    assert_eq!(orchestrator.monitor().policies().await.len(), 3);

    fixture.write_policy("access_control", "Do not share publicly.", 60);
    let outcome = orchestrator.scan_once(false).await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Completed { .. }));
    assert_eq!(detector.calls(), 2);
    assert_eq!(orchestrator.monitor().policies().await.len(), 4);
}

#[tokio::test]
async fn test_forced_scan_always_detects() {
    let fixture = Fixture::new(RISKY_DOC);
    let detector = FakeDetector::returning(vec![]);
    let orchestrator = fixture.orchestrator(semantic(&detector));
    orchestrator.initialize().await.unwrap();

    orchestrator.trigger_scan().await.unwrap();
    orchestrator.trigger_scan().await.unwrap();
    assert_eq!(detector.calls(), 3);
}

#[tokio::test]
async fn test_missing_document_is_recorded_not_returned() {
    let fixture = Fixture::new(RISKY_DOC);
    let orchestrator = fixture.orchestrator(None);
    orchestrator.initialize().await.unwrap();
    let before = orchestrator
        .monitor()
        .violations(&ViolationFilter::default())
        .await;

    fixture.remove_document();
    let outcome = orchestrator.scan_once(false).await.unwrap();
    assert_eq!(outcome, ScanOutcome::SourceMissing);

    let status = orchestrator.monitor().status().await;
    let error = status.last_scan_error.expect("missing source should be recorded");
    assert!(error.contains("Missing source file"));
    assert!(error.contains("user_journey.txt"));

    let after = orchestrator
        .monitor()
        .violations(&ViolationFilter::default())
        .await;
    assert_eq!(before, after, "ledger is untouched");

    // Recovery clears the error.
    fixture.write_document(RISKY_DOC, 120);
    orchestrator.scan_once(false).await.unwrap();
    assert!(orchestrator.monitor().status().await.last_scan_error.is_none());
}

#[tokio::test]
async fn test_unreadable_document_is_returned_and_recorded() {
    let fixture = Fixture::new(RISKY_DOC);
    let orchestrator = fixture.orchestrator(None);
    assert_ok!(orchestrator.initialize().await);

    fixture.remove_document();
    std::fs::create_dir(&fixture.doc_path).unwrap();
    let err = assert_err!(orchestrator.scan_once(false).await);
    assert!(matches!(err, ScanError::DocumentRead { .. }));

    let status = orchestrator.monitor().status().await;
    assert_eq!(status.last_scan_error, Some(err.to_string()));
    assert_eq!(status.open_count, 2, "ledger is untouched");
}

#[tokio::test]
async fn test_semantic_failure_falls_back_to_heuristic() {
    let fixture = Fixture::new(RISKY_DOC);
    let detector = FakeDetector::failing();
    let orchestrator = fixture.orchestrator(semantic(&detector));

    let outcome = orchestrator.initialize().await.unwrap();
    let (summary, kind) = completed(&outcome);
    assert_eq!(kind, DetectorKind::Heuristic);
    assert_eq!(summary.new, 2);

    let status = orchestrator.monitor().status().await;
    assert_eq!(status.detector_mode, "semantic");
    assert_eq!(status.model.as_deref(), Some("fake-model"));
    assert!(status.last_scan_error.is_none());
    assert_eq!(
        status.last_detector_diagnostic.as_deref(),
        Some("Timeout waiting for response")
    );
}

#[tokio::test]
async fn test_resolve_and_reopen_across_document_edits() {
    let fixture = Fixture::new(RISKY_DOC);
    let orchestrator = fixture.orchestrator(None);
    orchestrator.initialize().await.unwrap();

    fixture.write_document(CLEAN_DOC, 60);
    let (summary, _) = completed(&orchestrator.scan_once(false).await.unwrap());
    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.open_count, 0);
    assert_eq!(summary.resolved_count, 2);

    fixture.write_document(RISKY_DOC, 120);
    let (summary, _) = completed(&orchestrator.scan_once(false).await.unwrap());
    assert_eq!(summary.reopened, 2);
    assert_eq!(summary.new, 0);

    let violations = orchestrator
        .monitor()
        .violations(&ViolationFilter::default())
        .await;
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| v.resolved_at.is_none()));
}

#[tokio::test]
async fn test_only_open_violations_are_sent_to_detector() {
    let fixture = Fixture::new(RISKY_DOC);
    let detector = FakeDetector::returning(vec![candidate("a", "gdpr"), candidate("b", "gdpr")]);
    let orchestrator = fixture.orchestrator(semantic(&detector));
    orchestrator.initialize().await.unwrap();

    detector.set_response(Response::Candidates(vec![candidate("a", "gdpr")]));
    orchestrator.trigger_scan().await.unwrap();
    orchestrator.trigger_scan().await.unwrap();

    assert_eq!(detector.seen_open(), vec![0, 2, 1]);
}

#[tokio::test]
async fn test_concurrent_triggers_are_serialized() {
    let fixture = Fixture::new(RISKY_DOC);
    let detector = FakeDetector::slow(vec![candidate("a", "gdpr")], Duration::from_millis(20));
    let orchestrator = fixture.orchestrator(semantic(&detector));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.trigger_scan().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(detector.calls(), 8);
    assert_eq!(detector.max_in_flight(), 1, "cycles must never overlap");

    let violations = orchestrator
        .monitor()
        .violations(&ViolationFilter::default())
        .await;
    assert_eq!(violations.len(), 1);
    assert_eq!(orchestrator.monitor().status().await.detections_run, 8);
}

#[tokio::test]
async fn test_readers_are_not_blocked_by_detection() {
    let fixture = Fixture::new(RISKY_DOC);
    let detector = FakeDetector::slow(vec![], Duration::from_millis(300));
    let orchestrator = fixture.orchestrator(semantic(&detector));

    let scanning = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.trigger_scan().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = tokio::time::timeout(
        Duration::from_millis(100),
        orchestrator.monitor().status(),
    )
    .await
    .expect("status must not wait for the detector");
    assert!(status.last_scan_at.is_none());

    scanning.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_background_loop_picks_up_changes_and_stops() {
    let fixture = Fixture::new(RISKY_DOC);
    let orchestrator = fixture.orchestrator(None);
    orchestrator.initialize().await.unwrap();
    let mut events = orchestrator.subscribe();

    let handle = orchestrator.start(Duration::from_millis(20)).unwrap();
    assert!(orchestrator.is_running());
    assert!(
        orchestrator.start(Duration::from_millis(20)).is_none(),
        "second start is a no-op"
    );

    fixture.write_document(CLEAN_DOC, 60);
    let resolved = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(ScanEvent::Scanned { summary, .. }) = events.recv().await {
                if summary.resolved > 0 {
                    return summary.resolved;
                }
            }
        }
    })
    .await
    .expect("Timeout waiting for scan event");
    assert_eq!(resolved, 2);

    assert!(orchestrator.shutdown());
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Timeout waiting for loop to stop")
        .unwrap();
    assert!(!orchestrator.is_running());
}

#[tokio::test]
async fn test_failed_cycle_does_not_stop_the_loop() {
    let fixture = Fixture::new(RISKY_DOC);
    let orchestrator = fixture.orchestrator(None);
    assert_ok!(orchestrator.initialize().await);
    let mut events = orchestrator.subscribe();

    // The path still has a signal but can no longer be read as text.
    fixture.remove_document();
    std::fs::create_dir(&fixture.doc_path).unwrap();

    let handle = orchestrator.start(Duration::from_millis(20)).unwrap();
    // Wait for several failed ticks, not just the first.
    let error = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let status = orchestrator.monitor().status().await;
            if let Some(error) = status.last_scan_error {
                if status.cycles_run >= 4 {
                    return error;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Timeout waiting for failed cycles to be recorded");
    assert!(error.contains("Failed to read source file"));
    assert!(orchestrator.is_running(), "a failed cycle must not stop polling");
    assert_eq!(orchestrator.monitor().status().await.detections_run, 1);

    std::fs::remove_dir(&fixture.doc_path).unwrap();
    fixture.write_document(CLEAN_DOC, 60);
    let resolved = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(ScanEvent::Scanned { summary, .. }) = events.recv().await {
                return summary.resolved;
            }
        }
    })
    .await
    .expect("Timeout waiting for the loop to recover");
    assert_eq!(resolved, 2);
    assert!(orchestrator.monitor().status().await.last_scan_error.is_none());

    assert!(orchestrator.shutdown());
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Timeout waiting for loop to stop")
        .unwrap();
}

#[tokio::test]
async fn test_uploaded_policies_are_replaced_by_disk_reload() {
    let fixture = Fixture::new(RISKY_DOC);
    let orchestrator = fixture.orchestrator(None);
    orchestrator.initialize().await.unwrap();
    let monitor = orchestrator.monitor();

    let uploaded = monitor.add_policy("Vendor rules", "No vendor secrets.").await;
    assert_eq!(monitor.policies().await[0].id, uploaded.id);
    assert_eq!(monitor.policies().await.len(), 4);

    assert!(monitor.delete_policy("gdpr").await);
    assert_eq!(monitor.policies().await.len(), 3);

    fixture.write_policy("gdpr", "Personal data must be protected.", 60);
    orchestrator.scan_once(false).await.unwrap();
    let ids: Vec<String> = monitor.policies().await.into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["data-retention", "gdpr", "secrets-handling"]);
}
