use super::port::{AudioPlaybackPort, FrequencyAnalyser, GestureUnlock, HandleId};
use crate::error::PlaybackError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Autoplay policy layer over a playback backend.
///
/// Mirrors browsers that refuse to start audio until the page has seen a
/// user gesture: every `play` fails with [`PlaybackError::NotAllowed`] until
/// [`unlock`](GestureUnlock::unlock) is called. Once unlocked it stays
/// unlocked for the life of the port.
pub struct GesturePolicyPort<P> {
    inner: P,
    unlocked: AtomicBool,
}

impl<P: AudioPlaybackPort> GesturePolicyPort<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            unlocked: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: AudioPlaybackPort> GestureUnlock for GesturePolicyPort<P> {
    fn unlock(&self) {
        if !self.unlocked.swap(true, Ordering::AcqRel) {
            tracing::debug!(port = self.inner.name(), "audio.unlocked");
        }
    }

    fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::Acquire)
    }
}

#[async_trait]
impl<P: AudioPlaybackPort> AudioPlaybackPort for GesturePolicyPort<P> {
    fn name(&self) -> &str {
        "gesture-policy"
    }

    fn load(&self, url: &str) -> Result<HandleId, PlaybackError> {
        self.inner.load(url)
    }

    async fn play(&self, handle: HandleId) -> Result<(), PlaybackError> {
        if !self.is_unlocked() {
            return Err(PlaybackError::NotAllowed);
        }
        self.inner.play(handle).await
    }

    fn pause(&self, handle: HandleId) {
        self.inner.pause(handle);
    }

    fn release(&self, handle: HandleId) {
        self.inner.release(handle);
    }

    fn seek(&self, handle: HandleId, seconds: f64) -> Result<(), PlaybackError> {
        self.inner.seek(handle, seconds)
    }

    fn set_volume(&self, handle: HandleId, volume: f32) -> Result<(), PlaybackError> {
        self.inner.set_volume(handle, volume)
    }

    fn current_time(&self, handle: HandleId) -> f64 {
        self.inner.current_time(handle)
    }

    fn duration(&self, handle: HandleId) -> Option<f64> {
        self.inner.duration(handle)
    }

    fn attach_analyser(
        &self,
        handle: HandleId,
        bins: usize,
    ) -> Result<Box<dyn FrequencyAnalyser>, PlaybackError> {
        self.inner.attach_analyser(handle, bins)
    }

    async fn resume_graph(&self) -> Result<(), PlaybackError> {
        if !self.is_unlocked() {
            return Err(PlaybackError::NotAllowed);
        }
        self.inner.resume_graph().await
    }

    fn close_graph(&self) {
        self.inner.close_graph();
    }
}
