use super::port::{AudioPlaybackPort, FrequencyAnalyser, HandleId};
use crate::error::PlaybackError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

const DEFAULT_DURATION_SECS: f64 = 60.0;

#[derive(Debug, Clone)]
struct ElementState {
    url: String,
    playing: bool,
    released: bool,
    position: f64,
    duration: Option<f64>,
    volume: f32,
}

#[derive(Default)]
struct PortState {
    next_id: u64,
    elements: HashMap<HandleId, ElementState>,
    play_failures: HashMap<String, VecDeque<PlaybackError>>,
    load_failures: HashMap<String, PlaybackError>,
    durations: HashMap<String, f64>,
    gates: HashMap<String, Arc<Notify>>,
    play_calls: Vec<HandleId>,
    analyser_supported: bool,
    graph_closed: bool,
}

/// In-memory playback backend that never enforces an autoplay policy.
///
/// Deterministic stand-in for a real platform: it tracks which elements are
/// playing, lets callers script failures per URL, and can hold a `play`
/// until released through a gate so late completions can be exercised.
/// Wrap it in [`GesturePolicyPort`](super::GesturePolicyPort) to model a
/// browser that wants a user gesture first.
#[derive(Default)]
pub struct PermissivePlaybackPort {
    state: Mutex<PortState>,
}

impl PermissivePlaybackPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the synthetic frequency analyser.
    pub fn with_analyser(self) -> Self {
        self.lock().analyser_supported = true;
        self
    }

    pub fn set_duration(&self, url: &str, seconds: f64) {
        self.lock().durations.insert(url.to_string(), seconds);
    }

    /// The next `play` of an element loaded from `url` fails with `err`.
    pub fn fail_next_play(&self, url: &str, err: PlaybackError) {
        self.lock()
            .play_failures
            .entry(url.to_string())
            .or_default()
            .push_back(err);
    }

    /// Every `load` of `url` fails with `err`.
    pub fn fail_load(&self, url: &str, err: PlaybackError) {
        self.lock().load_failures.insert(url.to_string(), err);
    }

    /// Hold the next `play` of `url` until the returned gate is notified.
    pub fn gate(&self, url: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().gates.insert(url.to_string(), Arc::clone(&gate));
        gate
    }

    /// Handles currently producing sound.
    pub fn live_handles(&self) -> Vec<HandleId> {
        let mut live: Vec<_> = self
            .lock()
            .elements
            .iter()
            .filter(|(_, element)| element.playing && !element.released)
            .map(|(handle, _)| *handle)
            .collect();
        live.sort();
        live
    }

    pub fn is_released(&self, handle: HandleId) -> bool {
        self.lock()
            .elements
            .get(&handle)
            .is_none_or(|element| element.released)
    }

    pub fn url_of(&self, handle: HandleId) -> Option<String> {
        self.lock().elements.get(&handle).map(|e| e.url.clone())
    }

    pub fn volume_of(&self, handle: HandleId) -> Option<f32> {
        self.lock().elements.get(&handle).map(|e| e.volume)
    }

    /// Every handle `play` was called with, in call order.
    pub fn play_calls(&self) -> Vec<HandleId> {
        self.lock().play_calls.clone()
    }

    pub fn loaded_count(&self) -> usize {
        self.lock().elements.len()
    }

    pub fn graph_closed(&self) -> bool {
        self.lock().graph_closed
    }

    fn lock(&self) -> MutexGuard<'_, PortState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AudioPlaybackPort for PermissivePlaybackPort {
    fn name(&self) -> &str {
        "permissive"
    }

    fn load(&self, url: &str) -> Result<HandleId, PlaybackError> {
        let mut state = self.lock();
        if let Some(err) = state.load_failures.get(url) {
            return Err(err.clone());
        }
        state.next_id += 1;
        let handle = HandleId(state.next_id);
        let duration = state
            .durations
            .get(url)
            .copied()
            .unwrap_or(DEFAULT_DURATION_SECS);
        state.graph_closed = false;
        state.elements.insert(
            handle,
            ElementState {
                url: url.to_string(),
                playing: false,
                released: false,
                position: 0.0,
                duration: Some(duration),
                volume: 1.0,
            },
        );
        Ok(handle)
    }

    async fn play(&self, handle: HandleId) -> Result<(), PlaybackError> {
        let gate = {
            let mut state = self.lock();
            state.play_calls.push(handle);
            let url = state
                .elements
                .get(&handle)
                .map(|e| e.url.clone())
                .ok_or(PlaybackError::UnknownHandle(handle.0))?;
            state.gates.remove(&url)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.lock();
        let url = match state.elements.get(&handle) {
            Some(element) if element.released => {
                return Err(PlaybackError::Aborted("source was cleared".into()));
            }
            Some(element) => element.url.clone(),
            None => return Err(PlaybackError::UnknownHandle(handle.0)),
        };
        if let Some(err) = state
            .play_failures
            .get_mut(&url)
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }
        if let Some(element) = state.elements.get_mut(&handle) {
            element.playing = true;
        }
        Ok(())
    }

    fn pause(&self, handle: HandleId) {
        if let Some(element) = self.lock().elements.get_mut(&handle) {
            element.playing = false;
        }
    }

    fn release(&self, handle: HandleId) {
        if let Some(element) = self.lock().elements.get_mut(&handle) {
            element.playing = false;
            element.released = true;
            element.position = 0.0;
        }
    }

    fn seek(&self, handle: HandleId, seconds: f64) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        let element = state
            .elements
            .get_mut(&handle)
            .ok_or(PlaybackError::UnknownHandle(handle.0))?;
        element.position = element
            .duration
            .map_or(seconds, |duration| seconds.min(duration));
        Ok(())
    }

    fn set_volume(&self, handle: HandleId, volume: f32) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        let element = state
            .elements
            .get_mut(&handle)
            .ok_or(PlaybackError::UnknownHandle(handle.0))?;
        element.volume = volume;
        Ok(())
    }

    fn current_time(&self, handle: HandleId) -> f64 {
        self.lock()
            .elements
            .get(&handle)
            .map_or(0.0, |element| element.position)
    }

    fn duration(&self, handle: HandleId) -> Option<f64> {
        self.lock()
            .elements
            .get(&handle)
            .and_then(|element| element.duration)
    }

    fn attach_analyser(
        &self,
        handle: HandleId,
        bins: usize,
    ) -> Result<Box<dyn FrequencyAnalyser>, PlaybackError> {
        let state = self.lock();
        if !state.analyser_supported {
            return Err(PlaybackError::Unsupported(
                "audio graph unavailable".into(),
            ));
        }
        if !state.elements.contains_key(&handle) {
            return Err(PlaybackError::UnknownHandle(handle.0));
        }
        Ok(Box::new(SyntheticAnalyser {
            seed: handle.0,
            bins,
        }))
    }

    fn close_graph(&self) {
        self.lock().graph_closed = true;
    }
}

/// Deterministic spectrum derived from the handle id.
struct SyntheticAnalyser {
    seed: u64,
    bins: usize,
}

impl FrequencyAnalyser for SyntheticAnalyser {
    fn bin_count(&self) -> usize {
        self.bins
    }

    fn frequency_data(&self) -> Vec<u8> {
        (0..self.bins)
            .map(|bin| {
                let value = (self.seed.wrapping_mul(31) + bin as u64 * 7) % 256;
                u8::try_from(value).unwrap_or(u8::MAX)
            })
            .collect()
    }
}
