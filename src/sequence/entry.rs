//! A single tone within a preset.
//!
//! An entry pairs an audible frequency with the human-readable purpose
//! shown while it plays.

use serde::{Deserialize, Serialize};

/// Lowest frequency accepted for playback, in Hz.
pub const MIN_FREQUENCY_HZ: f32 = 0.1;

/// One (frequency, purpose) pair of a preset.
///
/// The `enabled` flag is the only field a caller is expected to change,
/// and only before the owning preset is turned into a [`Sequence`](super::Sequence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    /// Tone frequency in Hz.
    pub hz: f32,

    /// What this tone is meant for (displayed, never interpreted).
    #[serde(default)]
    pub purpose: String,

    /// Disabled entries are skipped when a sequence is built.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FrequencyEntry {
    /// Creates an enabled entry.
    ///
    /// # Arguments
    ///
    /// * `hz` - Tone frequency in Hz, clamped to at least [`MIN_FREQUENCY_HZ`]
    /// * `purpose` - Display text for the tone
    pub fn new(hz: f32, purpose: impl Into<String>) -> Self {
        Self {
            hz: hz.max(MIN_FREQUENCY_HZ),
            purpose: purpose.into(),
            enabled: true,
        }
    }

    /// Returns whether the entry describes a tone that can actually be played.
    pub fn is_playable(&self) -> bool {
        self.enabled && self.hz.is_finite() && self.hz >= MIN_FREQUENCY_HZ
    }

    /// Formats the frequency for display, e.g. `"728 Hz"` or `"7.83 Hz"`.
    pub fn label(&self) -> String {
        if self.hz.fract() == 0.0 {
            format!("{} Hz", self.hz as u64)
        } else {
            format!("{:.2} Hz", self.hz)
        }
    }
}
