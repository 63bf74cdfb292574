use super::coordinator::AudioCoordinator;
use super::port::GestureUnlock;
use super::state::PlayOutcome;
use std::sync::Arc;
use strum::Display;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// User interactions that browsers accept as permission to play audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UserGesture {
    Touch,
    Click,
    KeyPress,
}

/// Unlock the port (if it needs it) and retry whatever autoplay blocked.
///
/// Returns the retry outcome, or `None` when nothing was pending.
pub async fn on_user_gesture(
    coordinator: &AudioCoordinator,
    unlock: Option<&dyn GestureUnlock>,
    gesture: UserGesture,
) -> Option<PlayOutcome> {
    if let Some(unlock) = unlock {
        unlock.unlock();
    }

    match coordinator.retry_pending_play().await {
        Ok(Some(outcome)) => {
            tracing::info!(%gesture, %outcome, "audio.gesture_retry");
            Some(outcome)
        }
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(%gesture, error = %err, "audio.gesture_retry_failed");
            None
        }
    }
}

/// Listen for gestures until the sender side is dropped.
pub fn spawn_gesture_listener(
    coordinator: Arc<AudioCoordinator>,
    unlock: Option<Arc<dyn GestureUnlock>>,
    mut gestures: mpsc::Receiver<UserGesture>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(gesture) = gestures.recv().await {
            on_user_gesture(&coordinator, unlock.as_deref(), gesture).await;
        }
        tracing::debug!("audio.gesture_listener_stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioPlaybackPort, GesturePolicyPort, PermissivePlaybackPort};
    use crate::config::AudioConfig;
    use crate::observability::NoopObserver;

    fn gated_coordinator() -> (
        Arc<AudioCoordinator>,
        Arc<GesturePolicyPort<PermissivePlaybackPort>>,
    ) {
        let port = Arc::new(GesturePolicyPort::new(PermissivePlaybackPort::new()));
        let coordinator = Arc::new(AudioCoordinator::new(
            Arc::clone(&port) as Arc<dyn AudioPlaybackPort>,
            Arc::new(NoopObserver),
            &AudioConfig::default(),
        ));
        (coordinator, port)
    }

    #[tokio::test]
    async fn gesture_unlocks_and_retries_pending_play() {
        let (coordinator, port) = gated_coordinator();
        let outcome = coordinator
            .play_audio("welcome", "https://cdn.example/welcome.mp3", "home")
            .await
            .unwrap();
        assert_eq!(outcome, PlayOutcome::Deferred);

        let retried = on_user_gesture(&coordinator, Some(port.as_ref()), UserGesture::Touch).await;
        assert_eq!(retried, Some(PlayOutcome::Started));
        assert!(coordinator.snapshot().is_playing);
        assert_eq!(port.inner().live_handles().len(), 1);
    }

    #[tokio::test]
    async fn second_gesture_does_not_retry_again() {
        let (coordinator, port) = gated_coordinator();
        coordinator
            .play_audio("welcome", "https://cdn.example/welcome.mp3", "home")
            .await
            .unwrap();

        on_user_gesture(&coordinator, Some(port.as_ref()), UserGesture::Click).await;
        let again = on_user_gesture(&coordinator, Some(port.as_ref()), UserGesture::Click).await;
        assert_eq!(again, None);
        assert_eq!(port.inner().loaded_count(), 2);
    }

    #[tokio::test]
    async fn listener_task_drains_channel() {
        let (coordinator, port) = gated_coordinator();
        coordinator
            .play_audio("tip", "https://cdn.example/tip.mp3", "health")
            .await
            .unwrap();

        let (tx, rx) = mpsc::channel(4);
        let task = spawn_gesture_listener(
            Arc::clone(&coordinator),
            Some(Arc::clone(&port) as Arc<dyn GestureUnlock>),
            rx,
        );
        tx.send(UserGesture::KeyPress).await.unwrap();
        drop(tx);
        task.await.unwrap();

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.current_id.as_deref(), Some("tip"));
        assert!(snapshot.is_playing);
        assert!(snapshot.pending_play.is_none());
    }
}
