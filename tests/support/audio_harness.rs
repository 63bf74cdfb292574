#![allow(dead_code)]

use std::sync::Arc;

use knowyou::audio::{
    AudioCoordinator, AudioPlaybackPort, GesturePolicyPort, PermissivePlaybackPort,
};
use knowyou::config::AudioConfig;
use knowyou::observability::NoopObserver;

pub const GREETING_URL: &str = "https://cdn.knowyou.example/tts/greeting.mp3";
pub const TRIAGE_URL: &str = "https://cdn.knowyou.example/tts/triage-question.mp3";
pub const IDEA_URL: &str = "https://cdn.knowyou.example/tts/idea-feedback.mp3";

pub fn permissive_coordinator() -> (Arc<AudioCoordinator>, Arc<PermissivePlaybackPort>) {
    let port = Arc::new(PermissivePlaybackPort::new().with_analyser());
    let coordinator = Arc::new(AudioCoordinator::new(
        Arc::clone(&port) as Arc<dyn AudioPlaybackPort>,
        Arc::new(NoopObserver),
        &AudioConfig::default(),
    ));
    (coordinator, port)
}

pub fn gesture_coordinator() -> (
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
