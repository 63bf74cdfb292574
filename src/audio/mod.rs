//! Single-flight audio playback.
//!
//! [`AudioCoordinator`] owns the one live clip shared by every audio consumer
//! (assistant replies, health triage prompts, onboarding narration). The
//! platform side sits behind [`AudioPlaybackPort`]; [`GesturePolicyPort`]
//! layers the "no sound before a user gesture" browser rule on top of any
//! backend, and [`spawn_gesture_listener`] turns gestures into retries of
//! playback that rule blocked.

pub mod coordinator;
pub mod gesture;
pub mod permissive;
pub mod policy;
pub mod port;
pub mod state;

pub use coordinator::AudioCoordinator;
pub use gesture::{UserGesture, on_user_gesture, spawn_gesture_listener};
pub use permissive::PermissivePlaybackPort;
pub use policy::GesturePolicyPort;
pub use port::{AudioPlaybackPort, FrequencyAnalyser, GestureUnlock, HandleId, PlaybackEvent};
pub use state::{AudioInstance, AudioSnapshot, PendingPlay, PlayOutcome, PlaybackState};

use crate::config::{AudioConfig, AutoplayPolicy};
use crate::observability::Observer;
use std::sync::Arc;

/// A coordinator wired to the in-memory backend, plus the unlock hook the
/// gesture listener needs when the policy demands one.
pub struct AudioStack {
    pub coordinator: Arc<AudioCoordinator>,
    pub unlock: Option<Arc<dyn GestureUnlock>>,
}

/// Factory: build the coordinator for the configured autoplay policy
pub fn create_audio_stack(config: &AudioConfig, observer: Arc<dyn Observer>) -> AudioStack {
    let backend = PermissivePlaybackPort::new().with_analyser();
    match config.autoplay_policy {
        AutoplayPolicy::Gesture => {
            let port = Arc::new(GesturePolicyPort::new(backend));
            AudioStack {
                coordinator: Arc::new(AudioCoordinator::new(
                    Arc::clone(&port) as Arc<dyn AudioPlaybackPort>,
                    observer,
                    config,
                )),
                unlock: Some(port),
            }
        }
        AutoplayPolicy::Permissive => AudioStack {
            coordinator: Arc::new(AudioCoordinator::new(Arc::new(backend), observer, config)),
            unlock: None,
        },
    }
}
