use crate::audio_harness::{GREETING_URL, IDEA_URL, TRIAGE_URL, permissive_coordinator};
use knowyou::audio::{PlayOutcome, PlaybackEvent, PlaybackState};
use std::sync::Arc;

#[tokio::test]
async fn modules_taking_turns_never_overlap() {
    let (coordinator, port) = permissive_coordinator();

    for (id, url, source) in [
        ("greeting", GREETING_URL, "home"),
        ("triage-q1", TRIAGE_URL, "health"),
        ("idea-fb", IDEA_URL, "ideas"),
    ] {
        let outcome = coordinator.play_audio(id, url, source).await.unwrap();
        assert_eq!(outcome, PlayOutcome::Started);
        assert_eq!(port.live_handles().len(), 1, "overlap after {id}");
    }

    let live = port.live_handles();
    assert_eq!(port.url_of(live[0]).as_deref(), Some(IDEA_URL));
    assert_eq!(port.loaded_count(), 3);
}

#[tokio::test]
async fn concurrent_requests_leave_exactly_one_winner() {
    let (coordinator, port) = permissive_coordinator();
    let gates = [port.gate(GREETING_URL), port.gate(TRIAGE_URL)];

    let mut updates = coordinator.subscribe();
    let greeting = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.play_audio("greeting", GREETING_URL, "home").await }
    });
    updates
        .wait_for(|s| s.current_id.as_deref() == Some("greeting"))
        .await
        .unwrap();

    let triage = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.play_audio("triage-q1", TRIAGE_URL, "health").await }
    });
    updates
        .wait_for(|s| s.current_id.as_deref() == Some("triage-q1"))
        .await
        .unwrap();

    // Release in reverse order: the older request finishes last.
    gates[1].notify_one();
    assert_eq!(triage.await.unwrap().unwrap(), PlayOutcome::Started);
    gates[0].notify_one();
    assert_eq!(greeting.await.unwrap().unwrap(), PlayOutcome::Superseded);

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.current_id.as_deref(), Some("triage-q1"));
    assert!(snapshot.is_playing);
    let live = port.live_handles();
    assert_eq!(live.len(), 1);
    assert_eq!(port.url_of(live[0]).as_deref(), Some(TRIAGE_URL));
}

#[tokio::test]
async fn subscribers_observe_progress_and_natural_end() {
    let (coordinator, port) = permissive_coordinator();
    let mut updates = coordinator.subscribe();

    coordinator
        .play_audio("greeting", GREETING_URL, "home")
        .await
        .unwrap();
    let handle = port.live_handles()[0];

    coordinator.handle_event(
        handle,
        PlaybackEvent::TimeUpdate {
            current_time: 45.0,
            duration: Some(60.0),
        },
    );
    let progress = updates.borrow_and_update().progress;
    assert!((progress - 75.0).abs() < f64::EPSILON);

    coordinator.handle_event(handle, PlaybackEvent::Ended);
    updates.changed().await.unwrap();
    let snapshot = updates.borrow().clone();
    assert_eq!(snapshot.state, PlaybackState::Idle);
    assert!(snapshot.progress.abs() < f64::EPSILON);
    assert!(port.live_handles().is_empty());
}

#[tokio::test]
async fn visualizer_reads_fixed_resolution_spectrum() {
    let (coordinator, _port) = permissive_coordinator();
    coordinator
        .play_audio("greeting", GREETING_URL, "home")
        .await
        .unwrap();

    let first = coordinator.frequency_data();
    assert_eq!(first.len(), 32);
    assert_eq!(coordinator.frequency_data(), first);

    coordinator.stop_all_and_cleanup();
    assert!(coordinator.frequency_data().is_empty());
}
