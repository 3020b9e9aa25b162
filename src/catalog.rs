//! Preset catalog.
//!
//! Catalog files are JSON:
//!
//! ```json
//! {
//!   "title": "My presets",
//!   "presets": [
//!     {
//!       "id": "calm",
//!       "name": "Calm",
//!       "minutes_per_entry": 3,
//!       "frequencies": [{ "hz": 432.0, "purpose": "Grounding" }]
//!     }
//!   ]
//! }
//! ```

use crate::sequence::{FrequencyEntry, Preset};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Read-only lookup of presets by id.
pub trait PresetSource {
    fn preset(&self, id: &str) -> Option<&Preset>;
}

/// An ordered collection of presets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub title: String,
    pub presets: Vec<Preset>,
}

impl Catalog {
    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or if two
    /// presets share an id
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        let catalog = Self::from_json(&text)
            .with_context(|| format!("parsing catalog {}", path.display()))?;
        tracing::info!(
            "Loaded catalog '{}' with {} presets",
            catalog.title,
            catalog.presets.len()
        );
        Ok(catalog)
    }

    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns error on malformed JSON or duplicate preset ids
    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(text)?;
        let mut seen = HashSet::new();
        for preset in &catalog.presets {
            if !seen.insert(preset.id.as_str()) {
                bail!("duplicate preset id '{}'", preset.id);
            }
        }
        Ok(catalog)
    }

    /// Presets shipped with the binary, used when no catalog file is given.
    pub fn built_in() -> Self {
        let preset = |id: &str, name: &str, category: &str, minutes: u32, freqs: &[(f32, &str)]| {
            let mut preset = Preset::new(
                id,
                name,
                freqs
                    .iter()
                    .map(|&(hz, purpose)| FrequencyEntry::new(hz, purpose))
                    .collect(),
            );
            preset.category = category.to_string();
            preset.minutes_per_entry = minutes;
            preset
        };

        Self {
            title: "Built-in".to_string(),
            presets: vec![
                preset(
                    "solfeggio",
                    "Solfeggio scale",
                    "Tones",
                    5,
                    &[
                        (174.0, "Foundation"),
                        (285.0, "Restoration"),
                        (396.0, "Release"),
                        (417.0, "Change"),
                        (528.0, "Transformation"),
                        (639.0, "Connection"),
                        (741.0, "Expression"),
                        (852.0, "Intuition"),
                        (963.0, "Unity"),
                    ],
                ),
                preset(
                    "evening",
                    "Evening wind-down",
                    "Rest",
                    10,
                    &[
                        (432.0, "Settle"),
                        (396.0, "Let go"),
                        (174.0, "Rest"),
                    ],
                ),
                preset(
                    "focus",
                    "Focus",
                    "Work",
                    5,
                    &[(528.0, "Clarity"), (741.0, "Attention"), (852.0, "Flow")],
                ),
                preset(
                    "schumann",
                    "Earth resonance",
                    "Low",
                    3,
                    &[(7.83, "Schumann fundamental"), (14.3, "Second harmonic")],
                ),
            ],
        }
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl PresetSource for Catalog {
    fn preset(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }
}
