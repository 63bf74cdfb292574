use serde::{Deserialize, Serialize};

/// How the playback port treats autoplay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AutoplayPolicy {
    /// Playback is refused until a user gesture unlocks audio.
    #[default]
    Gesture,
    /// Playback is always allowed.
    Permissive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Number of frequency bins exposed for visualization (0 disables analysis)
    #[serde(default = "default_frequency_bins")]
    pub frequency_bins: usize,
    /// Initial volume applied to every new clip (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub default_volume: f32,
    #[serde(default)]
    pub autoplay_policy: AutoplayPolicy,
}

fn default_frequency_bins() -> usize {
    32
}

fn default_volume() -> f32 {
    1.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            frequency_bins: default_frequency_bins(),
            default_volume: default_volume(),
            autoplay_policy: AutoplayPolicy::default(),
        }
    }
}
