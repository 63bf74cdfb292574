use crate::error::PlaybackError;
use async_trait::async_trait;
use std::fmt;

/// Opaque reference to one platform audio element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "audio#{}", self.0)
    }
}

/// Callbacks raised by the platform for a handle.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    TimeUpdate {
        current_time: f64,
        duration: Option<f64>,
    },
    Ended,
    Error(PlaybackError),
}

/// Frequency-domain view of a playing source.
///
/// Dropping the analyser detaches it from the audio graph.
pub trait FrequencyAnalyser: Send + Sync {
    fn bin_count(&self) -> usize;

    /// Current magnitude per bin, `bin_count()` entries.
    fn frequency_data(&self) -> Vec<u8>;
}

/// Platform audio primitive, implemented per playback backend
///
/// The coordinator is the only owner of handles it loads; a port never starts
/// playback on its own.
#[async_trait]
pub trait AudioPlaybackPort: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Create a new element pointed at `url`. Does not start playback.
    fn load(&self, url: &str) -> Result<HandleId, PlaybackError>;

    /// Start (or continue) playback. Resolves once audio is actually playing.
    ///
    /// Fails with [`PlaybackError::NotAllowed`] when the platform requires a
    /// user gesture first.
    async fn play(&self, handle: HandleId) -> Result<(), PlaybackError>;

    fn pause(&self, handle: HandleId);

    /// Pause, detach and clear the source. Must be idempotent; a released
    /// handle can never play again.
    fn release(&self, handle: HandleId);

    fn seek(&self, handle: HandleId, seconds: f64) -> Result<(), PlaybackError>;

    fn set_volume(&self, handle: HandleId, volume: f32) -> Result<(), PlaybackError>;

    fn current_time(&self, handle: HandleId) -> f64;

    /// `None` while metadata is not loaded yet.
    fn duration(&self, handle: HandleId) -> Option<f64>;

    fn attach_analyser(
        &self,
        _handle: HandleId,
        _bins: usize,
    ) -> Result<Box<dyn FrequencyAnalyser>, PlaybackError> {
        Err(PlaybackError::Unsupported(
            "frequency analysis not available on this backend".into(),
        ))
    }

    /// Resume a suspended audio graph before playback continues.
    async fn resume_graph(&self) -> Result<(), PlaybackError> {
        Ok(())
    }

    /// Tear down the shared audio graph, if any.
    fn close_graph(&self) {}
}

/// Implemented by ports that can be unlocked by a user gesture.
pub trait GestureUnlock: Send + Sync {
    fn unlock(&self);

    fn is_unlocked(&self) -> bool;
}
