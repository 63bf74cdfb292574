use super::port::HandleId;
use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    PendingUserGesture,
}

/// The single live clip owned by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInstance {
    pub id: String,
    pub handle: HandleId,
    pub url: String,
    pub source: String,
    /// Monotonic request token; late platform callbacks compare against it.
    pub(crate) token: u64,
}

/// A play request refused by the autoplay policy, kept verbatim for retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPlay {
    pub id: String,
    pub audio_url: String,
    pub source: String,
}

/// What happened to a play request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayOutcome {
    Started,
    /// Autoplay was denied; the request waits for a user gesture.
    Deferred,
    /// A newer request or a stop took over while this one was loading.
    Superseded,
}

/// Published view of the coordinator, for polling or subscribing consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioSnapshot {
    pub state: PlaybackState,
    pub current_id: Option<String>,
    pub current_source: Option<String>,
    /// Playback position in percent, 0.0 - 100.0
    pub progress: f64,
    pub is_playing: bool,
    pub pending_play: Option<PendingPlay>,
}

impl AudioSnapshot {
    pub fn is_idle(&self) -> bool {
        self.state == PlaybackState::Idle && self.current_id.is_none()
    }
}

/// Percentage of `duration` reached at `current_time`, clamped to 0..=100.
pub fn progress_percent(current_time: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(total) if total.is_finite() && total > 0.0 && current_time.is_finite() => {
            (current_time / total * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}
