//! Playback engine for frequency sequences.
//!
//! This module provides the pieces that turn a [`Sequence`](crate::sequence::Sequence)
//! into sound and events:
//! - [`Clock`]: the single tick source, counted in whole ticks
//! - [`ToneGenerator`]: one audible tone at a time with click-free fades
//! - [`Sequencer`]: the Idle/Playing/Paused/Completed state machine
//! - [`EventBus`]: typed delivery of progress, frequency-change, and completion events
//! - WAV export of a whole sequence

pub mod clock;
pub mod dsp;
pub mod events;
pub mod export;
pub mod output;
pub mod sequencer;
pub mod tone;

pub use clock::Clock;
pub use events::{
    EventBus, LogObserver, PlaybackEvent, PlaybackObserver, ProgressReport, SubscriptionId,
};
pub use export::export_to_wav;
pub use output::{RodioBackend, SilentBackend};
pub use sequencer::{Sequencer, SequencerEvent};
pub use tone::{ToneBackend, ToneGenerator, Voice};

use serde::{Deserialize, Serialize};

/// The current playback state of a sequencer.
///
/// Exactly one exists per engine; it alone decides whether a clock tick
/// has any effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing playing, progress at the start.
    #[default]
    Idle,
    /// Tone sounding, clock running.
    Playing,
    /// Tone faded out, progress kept.
    Paused,
    /// The last entry finished naturally.
    Completed,
}

impl PlaybackState {
    /// Returns true if a sequence may be loaded in this state.
    pub fn accepts_load(&self) -> bool {
        matches!(self, PlaybackState::Idle | PlaybackState::Completed)
    }

    /// Short label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Completed => "Complete",
        }
    }
}
