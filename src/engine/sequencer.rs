//! The sequencing state machine.
//!
//! ```text
//! Idle ──play──▶ Playing ◀──play── Paused
//!  ▲               │  └────pause────▶ │
//!  │               ▼ (last entry ends)│
//!  └──stop──── Completed ◀────────────┘ stop from any state
//! ```
//!
//! All transitions run synchronously on the caller's thread. A tick runs
//! to completion, including any entry advance it triggers, before the next
//! tick or call can observe the sequencer.

use super::clock::Clock;
use super::tone::{FadeSettings, ToneBackend, ToneGenerator};
use super::PlaybackState;
use crate::config::PlayerConfig;
use crate::error::EngineError;
use crate::sequence::{FrequencyEntry, Progress, Sequence};
use std::time::Duration;

/// Raw events produced by the sequencer, drained by its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    /// One tick was counted.
    Progress {
        progress: Progress,
        seconds_per_entry: u32,
        total_entries: usize,
    },
    /// A new entry started. `progress` is where it starts (elapsed is
    /// non-zero when resuming mid-entry).
    FrequencyChanged {
        progress: Progress,
        entry: FrequencyEntry,
    },
    /// The state machine changed state.
    StateChanged(PlaybackState),
    /// The last entry finished.
    Finished { preset_id: String },
}

/// Drives one sequence through the tone generator as the clock ticks.
pub struct Sequencer {
    state: PlaybackState,
    sequence: Option<Sequence>,
    progress: Progress,
    tone: ToneGenerator,
    clock: Clock,
    events: Vec<SequencerEvent>,
    preview_length: Duration,
    /// Time left on a preview tone, if one is sounding.
    preview: Option<Duration>,
}

impl Sequencer {
    /// Creates an idle sequencer.
    ///
    /// # Arguments
    ///
    /// * `backend` - Audio output for the tone generator
    /// * `config` - Tick length and fade settings
    pub fn new(backend: Box<dyn ToneBackend>, config: &PlayerConfig) -> Self {
        Self {
            state: PlaybackState::Idle,
            sequence: None,
            progress: Progress::default(),
            tone: ToneGenerator::new(backend, FadeSettings::from(config)),
            clock: Clock::new(config.tick()),
            events: Vec::new(),
            preview_length: config.preview(),
            preview: None,
        }
    }

    /// Sounds `hz` on its own for the configured preview length, then fades
    /// it out. A second preview replaces the first. Starting playback or
    /// stopping ends a preview early.
    ///
    /// # Errors
    ///
    /// Returns error if a session is Playing or Paused
    pub fn preview(&mut self, hz: f32) -> Result<(), EngineError> {
        if !matches!(self.state, PlaybackState::Idle | PlaybackState::Completed) {
            return Err(EngineError::InvalidTransition {
                operation: "preview",
                state: self.state,
            });
        }
        tracing::info!("Previewing {} Hz", hz);
        self.tone.play(hz);
        self.preview = Some(self.preview_length);
        Ok(())
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    /// Loads a sequence without starting it.
    ///
    /// # Arguments
    ///
    /// * `sequence` - Entries to play; must contain at least one entry
    /// * `start` - Where to begin (non-zero when resuming)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The sequencer is Playing or Paused
    /// - The sequence is empty
    /// - `start.current_index` is past the last entry
    ///
    /// On error nothing changes.
    pub fn load(&mut self, sequence: Sequence, start: Progress) -> Result<(), EngineError> {
        if !self.state.accepts_load() {
            tracing::error!(
                "Rejected load of '{}' while {:?}",
                sequence.preset_id(),
                self.state
            );
            return Err(EngineError::InvalidTransition {
                operation: "load",
                state: self.state,
            });
        }
        if sequence.is_empty() {
            tracing::error!(
                "Rejected load of '{}': no enabled frequencies",
                sequence.preset_id()
            );
            return Err(EngineError::EmptySequence {
                preset_id: sequence.preset_id().to_string(),
            });
        }
        if start.current_index >= sequence.len() {
            return Err(EngineError::StartIndexOutOfRange {
                index: start.current_index,
                len: sequence.len(),
            });
        }

        // Keeps elapsed < duration; a full entry would have advanced already.
        let elapsed = start
            .elapsed_in_entry
            .min(sequence.seconds_per_entry().saturating_sub(1));

        tracing::info!(
            "Loaded '{}': {} frequencies, {}s each, starting at #{} +{}s",
            sequence.preset_id(),
            sequence.len(),
            sequence.seconds_per_entry(),
            start.current_index,
            elapsed
        );

        self.clock.reset();
        self.sequence = Some(sequence);
        self.progress = Progress::new(start.current_index, elapsed);
        self.set_state(PlaybackState::Idle);
        Ok(())
    }

    /// Starts or resumes playback.
    ///
    /// From Idle/Completed this starts at the loaded progress and announces
    /// the current entry. From Paused it resumes without resetting elapsed
    /// time and without announcing the entry again. Playing is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSequenceLoaded`] if nothing is loaded
    pub fn play(&mut self) -> Result<(), EngineError> {
        if self.current_entry().is_some() {
            self.preview = None;
        }
        match self.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused => {
                let hz = self.current_entry().map(|e| e.hz);
                if let Some(hz) = hz {
                    self.tone.play(hz);
                }
                self.clock.start();
                self.set_state(PlaybackState::Playing);
                tracing::info!(
                    "Resumed at #{} +{}s",
                    self.progress.current_index,
                    self.progress.elapsed_in_entry
                );
                Ok(())
            }
            PlaybackState::Idle | PlaybackState::Completed => {
                let Some(entry) = self.current_entry().cloned() else {
                    tracing::error!("play() called with no sequence loaded");
                    return Err(EngineError::NoSequenceLoaded);
                };
                self.tone.play(entry.hz);
                self.clock.start();
                self.set_state(PlaybackState::Playing);
                self.events.push(SequencerEvent::FrequencyChanged {
                    progress: self.progress,
                    entry,
                });
                Ok(())
            }
        }
    }

    /// Pauses playback, keeping progress exactly as it is.
    ///
    /// # Errors
    ///
    /// Returns error if the sequencer is Idle or Completed.
    /// Pausing while already Paused is a no-op.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        match self.state {
            PlaybackState::Playing => {
                self.tone.stop();
                self.clock.halt();
                self.set_state(PlaybackState::Paused);
                tracing::info!(
                    "Paused at #{} +{}s",
                    self.progress.current_index,
                    self.progress.elapsed_in_entry
                );
                Ok(())
            }
            PlaybackState::Paused => Ok(()),
            state => Err(EngineError::InvalidTransition {
                operation: "pause",
                state,
            }),
        }
    }

    /// Stops from any state, resets progress, and unloads the sequence.
    pub fn stop(&mut self) {
        self.preview = None;
        self.tone.stop();
        self.clock.reset();
        self.progress = Progress::default();
        if self.sequence.take().is_some() {
            tracing::info!("Stopped and reset");
        }
        self.set_state(PlaybackState::Idle);
    }

    /// Feeds elapsed wall time to the tone generator and the clock, and
    /// handles every tick that fell due.
    ///
    /// # Returns
    ///
    /// Number of ticks handled while Playing. Ticks that fall due after the
    /// last entry ends are not handled and not counted.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.tone.advance(elapsed);
        if let Some(remaining) = self.preview.take() {
            if elapsed < remaining {
                self.preview = Some(remaining - elapsed);
            } else {
                tracing::debug!("Preview ended");
                self.tone.stop();
            }
        }
        let ticks = self.clock.advance(elapsed);
        let mut handled = 0;
        for _ in 0..ticks {
            if self.state != PlaybackState::Playing {
                break;
            }
            self.tick();
            handled += 1;
        }
        handled
    }

    /// Handles one clock tick. Ignored unless Playing.
    pub fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(sequence) = self.sequence.as_ref() else {
            return;
        };
        let seconds_per_entry = sequence.seconds_per_entry();
        let total_entries = sequence.len();

        self.progress.elapsed_in_entry += 1;
        self.events.push(SequencerEvent::Progress {
            progress: self.progress,
            seconds_per_entry,
            total_entries,
        });

        if self.progress.elapsed_in_entry < seconds_per_entry {
            return;
        }

        self.progress.current_index += 1;
        self.progress.elapsed_in_entry = 0;
        let next_entry = sequence.entry(self.progress.current_index).cloned();
        let preset_id = sequence.preset_id().to_string();

        match next_entry {
            Some(entry) => {
                self.tone.play(entry.hz);
                self.events.push(SequencerEvent::FrequencyChanged {
                    progress: self.progress,
                    entry,
                });
            }
            None => {
                self.clock.halt();
                self.tone.stop();
                self.progress = Progress::default();
                self.set_state(PlaybackState::Completed);
                tracing::info!("Sequence '{}' complete", preset_id);
                self.events.push(SequencerEvent::Finished { preset_id });
            }
        }
    }

    /// Hard-stops all audio, including tones still fading out.
    pub fn shutdown(&mut self) {
        self.preview = None;
        self.clock.halt();
        self.tone.shutdown();
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            tracing::debug!("{:?} -> {:?}", self.state, state);
            self.state = state;
            self.events.push(SequencerEvent::StateChanged(state));
        }
    }

    /// Takes all events produced since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<SequencerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    /// Entry at the current index, if a sequence is loaded.
    pub fn current_entry(&self) -> Option<&FrequencyEntry> {
        self.sequence
            .as_ref()
            .and_then(|s| s.entry(self.progress.current_index))
    }

    pub fn tone(&self) -> &ToneGenerator {
        &self.tone
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}
