//! Resume checkpoints.
//!
//! A checkpoint records which preset was playing, which entry, and how far
//! into it. It is the only playback state that outlives the process. At most
//! one exists at a time; every save overwrites it.
//!
//! Persistence failures never reach the caller. They are logged and the
//! operation reports `false`, so playback carries on without resume.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::sequence::{Progress, Sequence};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Key under which the checkpoint is stored.
pub const CHECKPOINT_KEY: &str = "last_session";

/// Where a session was when it was last saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeCheckpoint {
    pub preset_id: String,
    pub current_index: usize,
    pub elapsed_in_entry: u32,
    /// Duration per entry at save time, so a resumed session keeps a
    /// custom duration. Absent in checkpoints written without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_per_entry: Option<u32>,
    /// Frequency at `current_index` when saved. Lets resume find the same
    /// tone if the preset's enabled entries have changed since.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hz: Option<f32>,
    /// Unix time in milliseconds.
    pub saved_at: u64,
}

impl ResumeCheckpoint {
    pub fn progress(&self) -> Progress {
        Progress::new(self.current_index, self.elapsed_in_entry)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Saves, loads, and clears the single resume checkpoint.
#[derive(Debug)]
pub struct CheckpointStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> CheckpointStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrites the checkpoint.
    ///
    /// # Arguments
    ///
    /// * `preset_id` - Preset being played
    /// * `progress` - Current index and elapsed ticks
    /// * `seconds_per_entry` - Duration per entry in use
    ///
    /// # Returns
    ///
    /// false if the write failed (already logged)
    pub fn save(&mut self, preset_id: &str, progress: Progress, seconds_per_entry: u32) -> bool {
        self.write(ResumeCheckpoint {
            preset_id: preset_id.to_string(),
            current_index: progress.current_index,
            elapsed_in_entry: progress.elapsed_in_entry,
            seconds_per_entry: Some(seconds_per_entry),
            hz: None,
            saved_at: now_millis(),
        })
    }

    /// Overwrites the checkpoint with a position inside `sequence`,
    /// recording the frequency playing there.
    pub fn save_position(&mut self, sequence: &Sequence, progress: Progress) -> bool {
        self.write(ResumeCheckpoint {
            preset_id: sequence.preset_id().to_string(),
            current_index: progress.current_index,
            elapsed_in_entry: progress.elapsed_in_entry,
            seconds_per_entry: Some(sequence.seconds_per_entry()),
            hz: sequence.entry(progress.current_index).map(|e| e.hz),
            saved_at: now_millis(),
        })
    }

    fn write(&mut self, checkpoint: ResumeCheckpoint) -> bool {
        let result = serde_json::to_vec(&checkpoint)
            .map_err(Into::into)
            .and_then(|data| self.store.put(CHECKPOINT_KEY, &data));
        match result {
            Ok(()) => {
                tracing::debug!(
                    "Checkpoint '{}' #{} +{}s",
                    checkpoint.preset_id,
                    checkpoint.current_index,
                    checkpoint.elapsed_in_entry
                );
                true
            }
            Err(e) => {
                tracing::warn!("Checkpoint write skipped: {}", e);
                false
            }
        }
    }

    /// Returns the last saved checkpoint, or None if there is none or it
    /// cannot be read.
    pub fn load(&self) -> Option<ResumeCheckpoint> {
        let data = match self.store.get(CHECKPOINT_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Checkpoint read failed: {}", e);
                return None;
            }
        };
        match serde_json::from_slice(&data) {
            Ok(checkpoint) => Some(checkpoint),
            Err(e) => {
                tracing::warn!("Ignoring corrupt checkpoint: {}", e);
                None
            }
        }
    }

    /// Deletes the checkpoint.
    ///
    /// # Returns
    ///
    /// false if the delete failed (already logged)
    pub fn clear(&mut self) -> bool {
        match self.store.delete(CHECKPOINT_KEY) {
            Ok(()) => {
                tracing::debug!("Checkpoint cleared");
                true
            }
            Err(e) => {
                tracing::warn!("Checkpoint clear failed: {}", e);
                false
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
