//! Error types for the playback engine and its collaborators.

use crate::engine::PlaybackState;
use thiserror::Error;

/// Errors returned by engine operations.
///
/// A returned error always means the operation did not happen: the engine
/// is left in the state it was in before the call.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The sequence has no enabled entries.
    #[error("sequence for preset '{preset_id}' has no enabled frequencies")]
    EmptySequence { preset_id: String },

    /// `play()` was called before any sequence was loaded.
    #[error("no sequence loaded")]
    NoSequenceLoaded,

    /// The operation is not allowed in the current state.
    #[error("cannot {operation} while {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: PlaybackState,
    },

    /// A resume position points past the end of the sequence.
    #[error("start index {index} is outside a sequence of {len} entries")]
    StartIndexOutOfRange { index: usize, len: usize },

    /// Playlist playback was requested with nothing queued.
    #[error("playlist is empty")]
    EmptyPlaylist,

    /// A playlist index does not exist.
    #[error("playlist index {index} is outside a queue of {len} items")]
    PlaylistIndexOutOfRange { index: usize, len: usize },

    /// A preset id could not be resolved by the catalog.
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// The checkpointed frequency is no longer enabled in its preset.
    #[error("preset '{preset_id}' no longer plays {hz} Hz")]
    CheckpointMismatch { preset_id: String, hz: f32 },
}

/// Errors from the key-value persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage cannot be used at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded or decoded.
    #[error("stored value is invalid: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Codec(e.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Codec(e.to_string())
    }
}

/// Errors from the audio output collaborator.
#[derive(Debug, Error)]
pub enum ToneError {
    /// No output device, or the device refused a stream.
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    /// A gain ramp could not be scheduled on a voice.
    #[error("could not schedule fade: {0}")]
    Schedule(String),
}
