//! Playlist queue and the orchestrator that chains its items.
//!
//! The orchestrator does not own a sequencer. It tracks which item is
//! playing, counts down the pause between items, and tells its owner what
//! to do next through [`PlaylistStep`].

use crate::error::{EngineError, StoreError};
use crate::sequence::{Preset, Sequence};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A queued copy of a preset's sequence.
///
/// The sequence is captured when the item is created, so later edits to
/// the preset (toggled entries, changed duration) do not reach the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub name: String,
    pub sequence: Sequence,
}

impl PlaylistItem {
    pub fn new(name: impl Into<String>, sequence: Sequence) -> Self {
        Self {
            name: name.into(),
            sequence,
        }
    }

    /// Snapshots a preset at the given minutes per entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptySequence`] if no frequency is enabled
    pub fn from_preset(preset: &Preset, minutes_per_entry: u32) -> Result<Self, EngineError> {
        let sequence = preset.to_sequence_with_minutes(minutes_per_entry);
        if sequence.is_empty() {
            return Err(EngineError::EmptySequence {
                preset_id: preset.id.clone(),
            });
        }
        Ok(Self::new(preset.name.clone(), sequence))
    }

    pub fn preset_id(&self) -> &str {
        self.sequence.preset_id()
    }
}

/// Ordered list of playlist items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistQueue {
    items: Vec<PlaylistItem>,
}

impl PlaylistQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: PlaylistItem) {
        self.items.push(item);
    }

    fn remove(&mut self, index: usize) -> Result<PlaylistItem, EngineError> {
        if index >= self.items.len() {
            return Err(EngineError::PlaylistIndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of every item's full length, in seconds.
    pub fn total_seconds(&self) -> u64 {
        self.items.iter().map(|i| i.sequence.total_seconds()).sum()
    }

    /// Saves the queue in binary format.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file writing fails
    pub fn save_to_binary<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let data = bincode::serialize(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Loads a queue saved with [`save_to_binary`](Self::save_to_binary).
    ///
    /// # Errors
    ///
    /// Returns error if file reading or parsing fails
    pub fn load_from_binary<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let data = fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }
}

/// What the owner of the orchestrator should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistStep {
    /// Load and play this item.
    Play {
        position: usize,
        len: usize,
        item: PlaylistItem,
    },
    /// Every item has played. The queue is left intact.
    Finished { len: usize },
}

/// Chains queue items with a pause between them.
#[derive(Debug, Default)]
pub struct PlaylistOrchestrator {
    queue: PlaylistQueue,
    active: bool,
    /// Position of the item currently loaded, if it is still queued.
    current: Option<usize>,
    /// Position of the item to play after the current one.
    next: usize,
    /// Time left in the pause between items.
    gap: Option<Duration>,
}

impl PlaylistOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item and returns its position.
    pub fn enqueue(&mut self, item: PlaylistItem) -> usize {
        tracing::info!(
            "Queued '{}' ({} frequencies)",
            item.name,
            item.sequence.len()
        );
        self.queue.push(item);
        self.queue.len() - 1
    }

    /// Removes one item. Positions of the playing and upcoming items are
    /// adjusted so playback order is unchanged for the rest of the queue.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PlaylistIndexOutOfRange`] for a bad index
    pub fn remove(&mut self, index: usize) -> Result<PlaylistItem, EngineError> {
        let item = self.queue.remove(index)?;
        if index < self.next {
            self.next -= 1;
        }
        self.current = match self.current {
            Some(c) if c == index => None,
            Some(c) if c > index => Some(c - 1),
            other => other,
        };
        tracing::debug!("Removed playlist item {} '{}'", index, item.name);
        Ok(item)
    }

    /// Empties the queue and leaves playlist mode. An item that is already
    /// playing carries on as a standalone session.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.stop();
    }

    /// Enters playlist mode at the first item.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyPlaylist`] if nothing is queued
    pub fn start(&mut self) -> Result<PlaylistStep, EngineError> {
        let Some(first) = self.queue.get(0).cloned() else {
            return Err(EngineError::EmptyPlaylist);
        };
        self.active = true;
        self.current = Some(0);
        self.next = 1;
        self.gap = None;
        tracing::info!("Playlist started with {} items", self.queue.len());
        Ok(PlaylistStep::Play {
            position: 0,
            len: self.queue.len(),
            item: first,
        })
    }

    /// Records that the current item finished and starts the pause.
    ///
    /// # Returns
    ///
    /// Position of the finished item, or None outside playlist mode
    pub fn item_finished(&mut self, pause: Duration) -> Option<usize> {
        if !self.active {
            return None;
        }
        self.gap = Some(pause);
        // A removed current item reports the slot it used to occupy.
        let position = self.current.take().unwrap_or(self.next);
        tracing::debug!("Playlist item {} finished, pausing {:?}", position, pause);
        Some(position)
    }

    /// Counts down the pause between items.
    ///
    /// # Returns
    ///
    /// The next step once the pause has fully elapsed
    pub fn advance(&mut self, elapsed: Duration) -> Option<PlaylistStep> {
        let remaining = self.gap?;
        if elapsed < remaining {
            self.gap = Some(remaining - elapsed);
            return None;
        }
        Some(self.next_step())
    }

    /// Ends the pause early.
    pub fn skip_gap(&mut self) -> Option<PlaylistStep> {
        self.gap?;
        Some(self.next_step())
    }

    fn next_step(&mut self) -> PlaylistStep {
        self.gap = None;
        match self.queue.get(self.next).cloned() {
            Some(item) => {
                let position = self.next;
                self.current = Some(position);
                self.next += 1;
                PlaylistStep::Play {
                    position,
                    len: self.queue.len(),
                    item,
                }
            }
            None => {
                self.stop();
                tracing::info!("Playlist complete");
                PlaylistStep::Finished {
                    len: self.queue.len(),
                }
            }
        }
    }

    /// Leaves playlist mode, keeping the queue.
    pub fn stop(&mut self) {
        self.active = false;
        self.current = None;
        self.next = 0;
        self.gap = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn in_gap(&self) -> bool {
        self.gap.is_some()
    }

    pub fn gap_remaining(&self) -> Option<Duration> {
        self.gap
    }

    pub fn current_position(&self) -> Option<usize> {
        self.current
    }

    pub fn queue(&self) -> &PlaylistQueue {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
