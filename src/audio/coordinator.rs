use super::port::{AudioPlaybackPort, FrequencyAnalyser, HandleId, PlaybackEvent};
use super::state::{
    AudioInstance, AudioSnapshot, PendingPlay, PlayOutcome, PlaybackState, progress_percent,
};
use crate::config::AudioConfig;
use crate::error::{AudioError, PlaybackError};
use crate::observability::{Observer, ObserverEvent, ObserverMetric};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

struct Inner {
    current: Option<AudioInstance>,
    analyser: Option<Box<dyn FrequencyAnalyser>>,
    pending: Option<PendingPlay>,
    state: PlaybackState,
    progress: f64,
    volume: f32,
    next_token: u64,
    retries: u64,
}

impl Inner {
    fn is_current(&self, token: u64) -> bool {
        self.current.as_ref().is_some_and(|c| c.token == token)
    }

    fn snapshot(&self) -> AudioSnapshot {
        AudioSnapshot {
            state: self.state,
            current_id: self.current.as_ref().map(|c| c.id.clone()),
            current_source: self.current.as_ref().map(|c| c.source.clone()),
            progress: self.progress,
            is_playing: self.state == PlaybackState::Playing,
            pending_play: self.pending.clone(),
        }
    }
}

/// Single-flight audio playback across independent consumers.
///
/// Instance-based, no global statics: create one per process and hand out
/// `Arc` clones. At most one platform handle is live at any time; every
/// request tears the previous one down before acquiring its own. Platform
/// results that arrive after a newer request (or a stop) took over are
/// dropped, so a superseded clip can never start playing again.
pub struct AudioCoordinator {
    port: Arc<dyn AudioPlaybackPort>,
    observer: Arc<dyn Observer>,
    frequency_bins: usize,
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<AudioSnapshot>,
}

impl AudioCoordinator {
    pub fn new(
        port: Arc<dyn AudioPlaybackPort>,
        observer: Arc<dyn Observer>,
        config: &AudioConfig,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(AudioSnapshot::default());
        Self {
            port,
            observer,
            frequency_bins: config.frequency_bins,
            inner: Mutex::new(Inner {
                current: None,
                analyser: None,
                pending: None,
                state: PlaybackState::Idle,
                progress: 0.0,
                volume: config.default_volume.clamp(0.0, 1.0),
                next_token: 0,
                retries: 0,
            }),
            snapshot_tx,
        }
    }

    pub fn port_name(&self) -> &str {
        self.port.name()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> AudioSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Receive every state change; only the latest value is retained.
    pub fn subscribe(&self) -> watch::Receiver<AudioSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().state
    }

    pub fn pending_play(&self) -> Option<PendingPlay> {
        self.lock().pending.clone()
    }

    /// Stop whatever is live and play `url` instead.
    ///
    /// Autoplay denial is not an error: the request is parked as a
    /// [`PendingPlay`] and `Ok(PlayOutcome::Deferred)` is returned.
    pub async fn play_audio(
        &self,
        id: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<PlayOutcome, AudioError> {
        let (id, url, source) = (id.into(), url.into(), source.into());

        let (token, handle) = {
            let mut inner = self.lock();
            self.teardown(&mut inner);
            inner.pending = None;
            inner.progress = 0.0;

            let handle = match self.port.load(&url) {
                Ok(handle) => handle,
                Err(err) => {
                    warn!(id = %id, url = %url, error = %err, "audio.load_failed");
                    self.transition(&mut inner, PlaybackState::Idle);
                    self.publish(&inner);
                    self.record_failure(&id, &err);
                    return Err(AudioError::Playback { id, source: err });
                }
            };
            if let Err(err) = self.port.set_volume(handle, inner.volume) {
                debug!(handle = %handle, error = %err, "audio.volume_unsupported");
            }

            inner.next_token += 1;
            let token = inner.next_token;
            inner.current = Some(AudioInstance {
                id: id.clone(),
                handle,
                url: url.clone(),
                source: source.clone(),
                token,
            });
            self.transition(&mut inner, PlaybackState::Loading);
            self.publish(&inner);
            (token, handle)
        };

        let started = Instant::now();
        let result = self.port.play(handle).await;

        let mut inner = self.lock();
        if !inner.is_current(token) {
            // Superseded while loading; keep the platform element silent.
            self.port.release(handle);
            debug!(id = %id, handle = %handle, "audio.superseded");
            return Ok(PlayOutcome::Superseded);
        }

        match result {
            Ok(()) => {
                self.attach_analyser(&mut inner, handle);
                self.transition(&mut inner, PlaybackState::Playing);
                self.publish(&inner);
                self.observer
                    .record_metric(&ObserverMetric::PlaybackStartLatency(started.elapsed()));
                info!(id = %id, source = %source, "audio.started");
                Ok(PlayOutcome::Started)
            }
            Err(err) if err.is_autoplay_denied() => {
                inner.current = None;
                self.port.release(handle);
                info!(id = %id, source = %source, "audio.autoplay_deferred");
                self.observer.record_event(&ObserverEvent::AutoplayDeferred {
                    id: id.clone(),
                    source: source.clone(),
                });
                inner.pending = Some(PendingPlay {
                    id,
                    audio_url: url,
                    source,
                });
                self.transition(&mut inner, PlaybackState::PendingUserGesture);
                self.publish(&inner);
                Ok(PlayOutcome::Deferred)
            }
            Err(err) => {
                inner.current = None;
                inner.progress = 0.0;
                self.port.release(handle);
                warn!(id = %id, url = %url, error = %err, "audio.play_failed");
                self.transition(&mut inner, PlaybackState::Idle);
                self.publish(&inner);
                self.record_failure(&id, &err);
                Err(AudioError::Playback { id, source: err })
            }
        }
    }

    /// Re-issue the request parked by an autoplay denial, if any.
    ///
    /// The pending slot is cleared before playback is attempted, so
    /// concurrent gestures retry a given request at most once.
    pub async fn retry_pending_play(&self) -> Result<Option<PlayOutcome>, AudioError> {
        let pending = {
            let mut inner = self.lock();
            let pending = inner.pending.take();
            if pending.is_some() {
                inner.retries += 1;
                self.observer
                    .record_metric(&ObserverMetric::PendingRetries(inner.retries));
                self.publish(&inner);
            }
            pending
        };

        let Some(pending) = pending else {
            return Ok(None);
        };
        info!(id = %pending.id, source = %pending.source, "audio.retry_pending");
        self.play_audio(pending.id, pending.audio_url, pending.source)
            .await
            .map(Some)
    }

    /// Returns false when nothing was playing.
    pub fn pause_audio(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != PlaybackState::Playing {
            return false;
        }
        let Some(handle) = inner.current.as_ref().map(|c| c.handle) else {
            return false;
        };
        self.port.pause(handle);
        self.transition(&mut inner, PlaybackState::Paused);
        self.publish(&inner);
        true
    }

    /// Continue a paused clip. `Ok(None)` when nothing was paused.
    pub async fn resume_audio(&self) -> Result<Option<PlayOutcome>, AudioError> {
        let (token, handle) = {
            let inner = self.lock();
            if inner.state != PlaybackState::Paused {
                return Ok(None);
            }
            match inner.current.as_ref() {
                Some(current) => (current.token, current.handle),
                None => return Ok(None),
            }
        };

        if let Err(err) = self.port.resume_graph().await {
            debug!(error = %err, "audio.resume_graph_failed");
        }
        let result = self.port.play(handle).await;

        let mut inner = self.lock();
        if !inner.is_current(token) {
            self.port.release(handle);
            return Ok(Some(PlayOutcome::Superseded));
        }
        match inner.state {
            PlaybackState::Paused => {}
            // A platform `Play` event for this clip got there first.
            PlaybackState::Playing => return Ok(Some(PlayOutcome::Started)),
            // Something else already moved the clip on; leave it there.
            _ => return Ok(Some(PlayOutcome::Superseded)),
        }

        match result {
            Ok(()) => {
                self.transition(&mut inner, PlaybackState::Playing);
                self.publish(&inner);
                Ok(Some(PlayOutcome::Started))
            }
            Err(err) if err.is_autoplay_denied() => {
                let Some(current) = inner.current.take() else {
                    return Ok(None);
                };
                self.port.release(current.handle);
                inner.analyser = None;
                self.observer.record_event(&ObserverEvent::AutoplayDeferred {
                    id: current.id.clone(),
                    source: current.source.clone(),
                });
                inner.pending = Some(PendingPlay {
                    id: current.id,
                    audio_url: current.url,
                    source: current.source,
                });
                inner.progress = 0.0;
                self.transition(&mut inner, PlaybackState::PendingUserGesture);
                self.publish(&inner);
                Ok(Some(PlayOutcome::Deferred))
            }
            Err(err) => {
                let id = inner
                    .current
                    .as_ref()
                    .map(|c| c.id.clone())
                    .unwrap_or_default();
                self.teardown(&mut inner);
                inner.progress = 0.0;
                warn!(id = %id, error = %err, "audio.resume_failed");
                self.transition(&mut inner, PlaybackState::Idle);
                self.publish(&inner);
                self.record_failure(&id, &err);
                Err(AudioError::Playback { id, source: err })
            }
        }
    }

    /// Stop the live clip (if any) and forget any parked request.
    pub fn stop_audio(&self) {
        let mut inner = self.lock();
        self.teardown(&mut inner);
        inner.pending = None;
        inner.progress = 0.0;
        self.transition(&mut inner, PlaybackState::Idle);
        self.publish(&inner);
    }

    /// Stop everything and release the shared audio graph.
    pub fn stop_all_and_cleanup(&self) {
        self.stop_audio();
        self.port.close_graph();
        debug!(port = self.port.name(), "audio.cleanup");
    }

    /// Jump to `seconds` within the live clip.
    pub fn seek(&self, seconds: f64) -> Result<(), AudioError> {
        let mut inner = self.lock();
        let Some(current) = inner.current.as_ref() else {
            return Err(AudioError::NothingLoaded);
        };
        let (id, handle) = (current.id.clone(), current.handle);
        self.port
            .seek(handle, seconds.max(0.0))
            .map_err(|source| AudioError::Playback { id, source })?;
        inner.progress =
            progress_percent(self.port.current_time(handle), self.port.duration(handle));
        self.publish(&inner);
        Ok(())
    }

    /// Set the volume for the live clip and every later one.
    pub fn set_volume(&self, volume: f32) -> Result<(), AudioError> {
        let mut inner = self.lock();
        inner.volume = volume.clamp(0.0, 1.0);
        if let Some(current) = inner.current.as_ref() {
            self.port
                .set_volume(current.handle, inner.volume)
                .map_err(|source| AudioError::Playback {
                    id: current.id.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    /// Snapshot of the analyser bins, empty when no analyser is attached.
    pub fn frequency_data(&self) -> Vec<u8> {
        self.lock()
            .analyser
            .as_ref()
            .map(|analyser| analyser.frequency_data())
            .unwrap_or_default()
    }

    /// Feed a platform callback for `handle`. Callbacks for anything other
    /// than the live handle are ignored.
    pub fn handle_event(&self, handle: HandleId, event: PlaybackEvent) {
        let mut inner = self.lock();
        let Some(current) = inner.current.as_ref() else {
            trace!(handle = %handle, ?event, "audio.event_without_instance");
            return;
        };
        if current.handle != handle {
            trace!(handle = %handle, ?event, "audio.stale_event");
            return;
        }
        let id = current.id.clone();

        match event {
            PlaybackEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                inner.progress = progress_percent(current_time, duration);
                self.publish(&inner);
            }
            PlaybackEvent::Pause => {
                if inner.state == PlaybackState::Playing {
                    self.transition(&mut inner, PlaybackState::Paused);
                    self.publish(&inner);
                }
            }
            PlaybackEvent::Play => {
                if inner.state == PlaybackState::Paused {
                    self.transition(&mut inner, PlaybackState::Playing);
                    self.publish(&inner);
                }
            }
            PlaybackEvent::Ended => {
                self.teardown(&mut inner);
                inner.progress = 0.0;
                debug!(id = %id, "audio.ended");
                self.transition(&mut inner, PlaybackState::Idle);
                self.publish(&inner);
            }
            PlaybackEvent::Error(err) => {
                self.teardown(&mut inner);
                inner.progress = 0.0;
                warn!(id = %id, error = %err, "audio.platform_error");
                self.transition(&mut inner, PlaybackState::Idle);
                self.publish(&inner);
                self.record_failure(&id, &err);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the live handle and its analyser. Must run before any new
    /// handle is acquired.
    fn teardown(&self, inner: &mut Inner) {
        inner.analyser = None;
        if let Some(previous) = inner.current.take() {
            self.port.release(previous.handle);
            debug!(id = %previous.id, handle = %previous.handle, "audio.released");
        }
    }

    fn attach_analyser(&self, inner: &mut Inner, handle: HandleId) {
        if self.frequency_bins == 0 {
            return;
        }
        match self.port.attach_analyser(handle, self.frequency_bins) {
            Ok(analyser) => inner.analyser = Some(analyser),
            Err(err) => debug!(handle = %handle, error = %err, "audio.analyser_unavailable"),
        }
    }

    fn transition(&self, inner: &mut Inner, to: PlaybackState) {
        let from = inner.state;
        if from == to {
            return;
        }
        inner.state = to;
        self.observer.record_event(&ObserverEvent::AudioTransition {
            id: inner.current.as_ref().map(|c| c.id.clone()),
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    fn publish(&self, inner: &Inner) {
        self.snapshot_tx.send_replace(inner.snapshot());
    }

    fn record_failure(&self, id: &str, err: &PlaybackError) {
        self.observer.record_event(&ObserverEvent::PlaybackFailed {
            id: id.to_string(),
            message: err.to_string(),
        });
    }
}

impl Drop for AudioCoordinator {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.analyser = None;
        if let Some(current) = inner.current.take() {
            self.port.release(current.handle);
        }
    }
}
