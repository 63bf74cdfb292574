//! Error types for the `KnowYOU` subsystems.
//!
//! Library callers match on these to decide a recovery strategy; the CLI and
//! config plumbing use `anyhow::Result` for ad-hoc context chains.
//!
//! Expected business outcomes (a blocked invitation, autoplay denied by the
//! platform) are data, not errors. They only surface here when a caller asks
//! for an operation that cannot go ahead because of them.

use crate::invitations::DeliveryReport;
use thiserror::Error;

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Audio errors ────────────────────────────────────────────────────────────

/// Failures reported by an [`AudioPlaybackPort`](crate::audio::AudioPlaybackPort).
///
/// `NotAllowed` is the autoplay denial case and is never surfaced to users by
/// the coordinator; everything else is a real playback failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("playback not allowed before a user gesture")]
    NotAllowed,

    #[error("playback aborted: {0}")]
    Aborted(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("network error while fetching audio: {0}")]
    Network(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("unknown audio handle {0}")]
    UnknownHandle(u64),
}

impl PlaybackError {
    /// Autoplay denial is recoverable through a user gesture.
    pub fn is_autoplay_denied(&self) -> bool {
        matches!(self, Self::NotAllowed)
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to play {id}: {source}")]
    Playback {
        id: String,
        #[source]
        source: PlaybackError,
    },

    #[error("no audio is loaded")]
    NothingLoaded,
}

// ─── Invitation errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("invitation cannot be sent: {0}")]
    Blocked(String),

    #[error("missing recipient for {channel}")]
    MissingRecipient { channel: String },

    /// A required send failed. `report` holds the per-channel outcomes up
    /// to and including the failure.
    #[error("delivery via {channel} failed: {message}")]
    Delivery {
        channel: String,
        message: String,
        report: Box<DeliveryReport>,
    },
}

impl InvitationError {
    /// Outcomes recorded before delivery stopped, if any channel was tried.
    pub fn partial_report(&self) -> Option<&DeliveryReport> {
        match self {
            Self::Delivery { report, .. } => Some(report.as_ref()),
            Self::Blocked(_) | Self::MissingRecipient { .. } => None,
        }
    }
}
