use crate::audio_harness::{GREETING_URL, TRIAGE_URL, gesture_coordinator};
use knowyou::audio::{
    GestureUnlock, PendingPlay, PlayOutcome, PlaybackState, UserGesture, spawn_gesture_listener,
};
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::test]
async fn blocked_greeting_plays_after_first_tap() {
    let (coordinator, port) = gesture_coordinator();
    let (tx, rx) = mpsc::channel(8);
    let listener = spawn_gesture_listener(
        Arc::clone(&coordinator),
        Some(Arc::clone(&port) as Arc<dyn GestureUnlock>),
        rx,
    );

    let outcome = coordinator
        .play_audio("greeting", GREETING_URL, "home")
        .await
        .unwrap();
    assert_eq!(outcome, PlayOutcome::Deferred);
    assert_eq!(
        coordinator.pending_play(),
        Some(PendingPlay {
            id: "greeting".into(),
            audio_url: GREETING_URL.into(),
            source: "home".into(),
        })
    );

    tx.send(UserGesture::Touch).await.unwrap();
    tx.send(UserGesture::Click).await.unwrap();
    drop(tx);
    listener.await.unwrap();

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert_eq!(snapshot.current_id.as_deref(), Some("greeting"));
    assert!(snapshot.pending_play.is_none());
    // One deferred attempt plus exactly one retry.
    assert_eq!(port.inner().loaded_count(), 2);
    assert_eq!(port.inner().live_handles().len(), 1);
}

#[tokio::test]
async fn newer_request_replaces_stale_pending_play() {
    let (coordinator, port) = gesture_coordinator();

    coordinator
        .play_audio("greeting", GREETING_URL, "home")
        .await
        .unwrap();
    coordinator
        .play_audio("triage-q1", TRIAGE_URL, "health")
        .await
        .unwrap();

    let pending = coordinator.pending_play().unwrap();
    assert_eq!(pending.id, "triage-q1");

    port.unlock();
    coordinator.retry_pending_play().await.unwrap();

    let live = port.inner().live_handles();
    assert_eq!(live.len(), 1);
    assert_eq!(port.inner().url_of(live[0]).as_deref(), Some(TRIAGE_URL));
}

#[tokio::test]
async fn cleanup_drops_pending_play() {
    let (coordinator, port) = gesture_coordinator();
    coordinator
        .play_audio("greeting", GREETING_URL, "home")
        .await
        .unwrap();

    coordinator.stop_all_and_cleanup();
    port.unlock();

    assert_eq!(coordinator.retry_pending_play().await.unwrap(), None);
    assert!(coordinator.snapshot().is_idle());
    assert!(port.inner().live_handles().is_empty());
}
