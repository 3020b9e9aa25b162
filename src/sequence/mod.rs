//! Frequency sequences and playback progress.
//!
//! This module provides the data the playback engine works on:
//! - [`FrequencyEntry`]: one tone and its purpose text
//! - [`Preset`]: the catalog's editable description of a session
//! - [`Sequence`]: the frozen, enabled-only list that actually plays
//! - [`Progress`]: where playback currently is inside a sequence

mod entry;
mod preset;

pub use entry::{FrequencyEntry, MIN_FREQUENCY_HZ};
pub use preset::{Preset, DEFAULT_MINUTES_PER_ENTRY};

use serde::{Deserialize, Serialize};

/// Shortest per-entry duration the player offers, in minutes.
pub const MIN_MINUTES_PER_ENTRY: u32 = 1;

/// Longest per-entry duration the player offers, in minutes.
pub const MAX_MINUTES_PER_ENTRY: u32 = 60;

/// An ordered, enabled-only list of entries with a fixed duration per entry.
///
/// Sequences are immutable once built. Editing a preset afterwards does not
/// change a sequence that was already made from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SequenceData")]
pub struct Sequence {
    preset_id: String,
    entries: Vec<FrequencyEntry>,
    seconds_per_entry: u32,
}

/// Stored form of a [`Sequence`]. Loading goes through [`Sequence::new`], so
/// saved files get the same filtering and duration floor as fresh ones.
#[derive(Deserialize)]
struct SequenceData {
    preset_id: String,
    entries: Vec<FrequencyEntry>,
    seconds_per_entry: u32,
}

impl From<SequenceData> for Sequence {
    fn from(data: SequenceData) -> Self {
        Sequence::new(data.preset_id, data.entries, data.seconds_per_entry)
    }
}

impl Sequence {
    /// Creates a sequence, dropping disabled or unplayable entries.
    ///
    /// # Arguments
    ///
    /// * `preset_id` - Identifier of the preset the entries came from
    /// * `entries` - Candidate entries in playback order
    /// * `seconds_per_entry` - Ticks each entry plays (at least 1)
    pub fn new(
        preset_id: impl Into<String>,
        entries: Vec<FrequencyEntry>,
        seconds_per_entry: u32,
    ) -> Self {
        Self {
            preset_id: preset_id.into(),
            entries: entries.into_iter().filter(|e| e.is_playable()).collect(),
            seconds_per_entry: seconds_per_entry.max(1),
        }
    }

    /// Identifier of the owning preset.
    pub fn preset_id(&self) -> &str {
        &self.preset_id
    }

    /// Entries in playback order.
    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    /// Returns the entry at `index`, if any.
    pub fn entry(&self, index: usize) -> Option<&FrequencyEntry> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing would play.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ticks each entry plays.
    pub fn seconds_per_entry(&self) -> u32 {
        self.seconds_per_entry
    }

    /// Total ticks from the first entry to natural completion.
    pub fn total_seconds(&self) -> u64 {
        self.entries.len() as u64 * self.seconds_per_entry as u64
    }

    /// Ticks already played when playback is at `progress`.
    pub fn elapsed_total(&self, progress: Progress) -> u64 {
        progress.current_index as u64 * self.seconds_per_entry as u64
            + progress.elapsed_in_entry as u64
    }
}

/// Position inside a sequence.
///
/// `elapsed_in_entry` resets to 0 exactly when `current_index` advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Index of the entry currently playing.
    pub current_index: usize,
    /// Whole ticks spent in the current entry.
    pub elapsed_in_entry: u32,
}

impl Progress {
    /// Creates a progress marker.
    pub fn new(current_index: usize, elapsed_in_entry: u32) -> Self {
        Self {
            current_index,
            elapsed_in_entry,
        }
    }
}

/// Formats seconds as `m:ss` (or `h:mm:ss` past an hour).
///
/// # Examples
///
/// ```
/// use toneseq::sequence::format_time;
///
/// assert_eq!(format_time(65), "1:05");
/// assert_eq!(format_time(3725), "1:02:05");
/// ```
pub fn format_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
