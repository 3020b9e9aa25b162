//! Player configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! wants to change:
//!
//! ```json
//! { "fade_in_ms": 1500, "checkpoint_every_ticks": 10 }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timing, gain, and storage settings for a [`Player`](crate::Player).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Length of one clock tick in milliseconds.
    pub tick_ms: u64,
    /// Linear fade-in window for a new tone.
    pub fade_in_ms: u64,
    /// Exponential fade-out window for a stopping tone.
    pub fade_out_ms: u64,
    /// Delay after a fade-out starts before its voice is torn down.
    /// Slightly longer than `fade_out_ms` so the ramp always finishes.
    pub teardown_delay_ms: u64,
    /// Gain a tone ramps up to.
    pub peak_gain: f32,
    /// Gain the exponential fade-out decays to (it can never reach zero).
    pub fade_floor: f32,
    /// Silence between consecutive playlist items.
    pub inter_item_pause_ms: u64,
    /// How long a previewed frequency sounds before fading out.
    pub preview_ms: u64,
    /// Write a checkpoint every this many progress ticks. 0 disables
    /// periodic checkpoints (frequency changes and pauses still write one).
    pub checkpoint_every_ticks: u32,
    /// Output sample rate for tone synthesis and export.
    pub sample_rate: u32,
    /// Directory holding checkpoints, the playlist autosave, and the log.
    pub state_dir: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            fade_in_ms: 1000,
            fade_out_ms: 500,
            teardown_delay_ms: 550,
            peak_gain: 0.5,
            fade_floor: 0.001,
            inter_item_pause_ms: 2000,
            preview_ms: 3000,
            checkpoint_every_ticks: 30,
            sample_rate: 44100,
            state_dir: PathBuf::from(".toneseq"),
        }
    }
}

impl PlayerConfig {
    /// Loads a config file, or returns defaults when `path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Clamps values that would break the engine's timing assumptions.
    pub fn sanitized(mut self) -> Self {
        self.tick_ms = self.tick_ms.max(1);
        self.teardown_delay_ms = self.teardown_delay_ms.max(self.fade_out_ms);
        self.peak_gain = self.peak_gain.clamp(0.0, 1.0);
        self.fade_floor = self.fade_floor.clamp(1e-6, self.peak_gain.max(1e-6));
        self.sample_rate = self.sample_rate.max(8000);
        self
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn teardown_delay(&self) -> Duration {
        Duration::from_millis(self.teardown_delay_ms)
    }

    pub fn inter_item_pause(&self) -> Duration {
        Duration::from_millis(self.inter_item_pause_ms)
    }

    pub fn preview(&self) -> Duration {
        Duration::from_millis(self.preview_ms)
    }

    /// Path of the checkpoint store directory.
    pub fn checkpoint_dir(&self) -> PathBuf {
        self.state_dir.join("state")
    }

    /// Path of the playlist autosave file.
    pub fn playlist_path(&self) -> PathBuf {
        self.state_dir.join("playlist.bin")
    }

    /// Path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("toneseq.log")
    }
}
