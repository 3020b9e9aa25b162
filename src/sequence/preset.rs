//! Presets as supplied by the catalog.
//!
//! A preset is the editable, catalog-shaped description of a session:
//! its frequencies (each of which can be toggled) and a default number of
//! minutes per frequency. Turning a preset into a [`Sequence`] freezes it.

use super::entry::FrequencyEntry;
use super::{Sequence, MAX_MINUTES_PER_ENTRY, MIN_MINUTES_PER_ENTRY};
use serde::{Deserialize, Serialize};

/// Default minutes each frequency plays when the catalog does not say.
pub const DEFAULT_MINUTES_PER_ENTRY: u32 = 5;

fn default_minutes() -> u32 {
    DEFAULT_MINUTES_PER_ENTRY
}

/// A named list of frequencies from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Stable identifier, used as the key for checkpoints.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Grouping shown in the preset list.
    #[serde(default)]
    pub category: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Minutes each enabled frequency plays.
    #[serde(default = "default_minutes")]
    pub minutes_per_entry: u32,

    /// Frequencies in playback order.
    pub frequencies: Vec<FrequencyEntry>,
}

impl Preset {
    /// Creates a preset with the default duration.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        frequencies: Vec<FrequencyEntry>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            description: String::new(),
            minutes_per_entry: DEFAULT_MINUTES_PER_ENTRY,
            frequencies,
        }
    }

    /// Toggles one frequency on or off.
    ///
    /// # Returns
    ///
    /// false if `index` is out of range
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.frequencies.get_mut(index) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Number of frequencies that would end up in a sequence.
    pub fn playable_count(&self) -> usize {
        self.frequencies.iter().filter(|f| f.is_playable()).count()
    }

    /// Minutes per entry clamped to the range the player accepts.
    pub fn clamped_minutes(&self) -> u32 {
        self.minutes_per_entry
            .clamp(MIN_MINUTES_PER_ENTRY, MAX_MINUTES_PER_ENTRY)
    }

    /// Builds a sequence using the preset's own duration.
    pub fn to_sequence(&self) -> Sequence {
        self.to_sequence_with_minutes(self.clamped_minutes())
    }

    /// Builds a sequence with a caller-chosen duration per entry.
    ///
    /// # Arguments
    ///
    /// * `minutes` - Minutes per entry, clamped to 1-60
    pub fn to_sequence_with_minutes(&self, minutes: u32) -> Sequence {
        let minutes = minutes.clamp(MIN_MINUTES_PER_ENTRY, MAX_MINUTES_PER_ENTRY);
        Sequence::new(self.id.clone(), self.frequencies.clone(), minutes * 60)
    }
}
