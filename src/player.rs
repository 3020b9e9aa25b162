//! The engine instance owned by the application layer.
//!
//! [`Player`] wires the sequencer to the checkpoint store, the playlist
//! orchestrator, and any number of observers. It turns raw sequencer events
//! into [`PlaybackEvent`]s and decides when checkpoints are written or
//! cleared:
//!
//! - written on every frequency change, every `checkpoint_every_ticks`
//!   ticks, on pause, and on shutdown while a session is unfinished
//! - cleared on a fresh start, when a single session completes, and when
//!   a playlist completes
//!
//! Completing one playlist item does not clear the checkpoint and does not
//! emit [`PlaybackEvent::SessionCompleted`].

use crate::catalog::PresetSource;
use crate::checkpoint::{CheckpointStore, KeyValueStore, ResumeCheckpoint};
use crate::config::PlayerConfig;
use crate::engine::{
    EventBus, PlaybackEvent, PlaybackObserver, PlaybackState, ProgressReport, Sequencer,
    SequencerEvent, SubscriptionId, ToneBackend,
};
use crate::error::EngineError;
use crate::playlist::{PlaylistItem, PlaylistOrchestrator, PlaylistStep};
use crate::sequence::{FrequencyEntry, Progress, Sequence};
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A sequencer plus everything that reacts to it.
pub struct Player<S: KeyValueStore> {
    config: PlayerConfig,
    sequencer: Sequencer,
    checkpoints: CheckpointStore<S>,
    playlist: PlaylistOrchestrator,
    bus: EventBus,
    ticks_since_checkpoint: u32,
}

impl<S: KeyValueStore> Player<S> {
    /// Creates an idle player.
    ///
    /// # Arguments
    ///
    /// * `backend` - Audio output
    /// * `store` - Where resume checkpoints are kept
    /// * `config` - Timing and fade settings
    pub fn new(backend: Box<dyn ToneBackend>, store: S, config: PlayerConfig) -> Self {
        Self {
            sequencer: Sequencer::new(backend, &config),
            checkpoints: CheckpointStore::new(store),
            playlist: PlaylistOrchestrator::new(),
            bus: EventBus::new(),
            ticks_since_checkpoint: 0,
            config,
        }
    }

    // ========== SUBSCRIPTIONS ==========

    pub fn subscribe(&mut self, observer: impl PlaybackObserver + 'static) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn subscribe_channel(&mut self) -> (SubscriptionId, Receiver<PlaybackEvent>) {
        self.bus.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ========== TRANSPORT ==========

    /// Loads a sequence without starting it. Leaves playlist mode.
    ///
    /// # Errors
    ///
    /// See [`Sequencer::load`]. On error nothing changes.
    pub fn load(&mut self, sequence: Sequence, start: Progress) -> Result<(), EngineError> {
        let result = self.sequencer.load(sequence, start);
        if result.is_ok() {
            self.playlist.stop();
        }
        self.dispatch();
        result
    }

    /// Starts or resumes playback. During the pause between playlist items
    /// this starts the next item immediately.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSequenceLoaded`] if nothing is loaded
    pub fn play(&mut self) -> Result<(), EngineError> {
        if let Some(step) = self.playlist.skip_gap() {
            self.run_step(step);
            return Ok(());
        }
        let result = self.sequencer.play();
        self.dispatch();
        result
    }

    /// Pauses and writes a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns error if nothing is playing or paused
    pub fn pause(&mut self) -> Result<(), EngineError> {
        let was_playing = self.sequencer.state() == PlaybackState::Playing;
        self.sequencer.pause()?;
        if was_playing {
            self.save_checkpoint(self.sequencer.progress());
        }
        self.dispatch();
        Ok(())
    }

    /// Pauses if playing, otherwise plays.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSequenceLoaded`] if there is nothing to play
    pub fn toggle(&mut self) -> Result<(), EngineError> {
        if self.sequencer.state() == PlaybackState::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Stops, resets progress, and leaves playlist mode. The checkpoint is
    /// kept so the session can still be resumed.
    pub fn stop(&mut self) {
        self.playlist.stop();
        self.sequencer.stop();
        self.dispatch();
    }

    /// Plays one frequency on its own for a few seconds, outside any
    /// session. Writes no checkpoint and emits no events.
    ///
    /// # Errors
    ///
    /// Returns error if a session is Playing or Paused
    pub fn preview(&mut self, hz: f32) -> Result<(), EngineError> {
        self.sequencer.preview(hz)
    }

    /// Starts a sequence from its first entry, discarding any checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptySequence`] if no entry is enabled.
    /// Nothing changes in that case.
    pub fn start_fresh(&mut self, sequence: Sequence) -> Result<(), EngineError> {
        if sequence.is_empty() {
            tracing::error!("Cannot start '{}': no enabled frequencies", sequence.preset_id());
            return Err(EngineError::EmptySequence {
                preset_id: sequence.preset_id().to_string(),
            });
        }
        self.playlist.stop();
        self.sequencer.stop();
        self.checkpoints.clear();
        self.begin(sequence, Progress::default())
    }

    /// Returns the saved checkpoint, if any.
    pub fn saved_checkpoint(&self) -> Option<ResumeCheckpoint> {
        self.checkpoints.load()
    }

    /// Rebuilds the checkpointed preset's sequence and plays it from the
    /// saved position.
    ///
    /// The sequence is rebuilt from the preset as it is now, using the
    /// duration recorded in the checkpoint when there is one. If entries
    /// were enabled or disabled since the save, the recorded frequency
    /// decides which entry playback continues in.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The preset is no longer in the catalog
    /// - The preset has no enabled frequencies
    /// - The recorded frequency is no longer enabled
    /// - The saved index is past the end of the rebuilt sequence
    ///
    /// Nothing changes on error.
    pub fn resume<P: PresetSource>(
        &mut self,
        checkpoint: &ResumeCheckpoint,
        presets: &P,
    ) -> Result<(), EngineError> {
        let preset = presets
            .preset(&checkpoint.preset_id)
            .ok_or_else(|| EngineError::UnknownPreset(checkpoint.preset_id.clone()))?;
        let sequence = match checkpoint.seconds_per_entry {
            Some(seconds) => {
                Sequence::new(preset.id.clone(), preset.frequencies.clone(), seconds)
            }
            None => preset.to_sequence(),
        };
        if sequence.is_empty() {
            return Err(EngineError::EmptySequence {
                preset_id: preset.id.clone(),
            });
        }
        let mut start = checkpoint.progress();
        if let Some(hz) = checkpoint.hz {
            start.current_index = locate_entry(&sequence, start.current_index, hz)
                .ok_or_else(|| EngineError::CheckpointMismatch {
                    preset_id: preset.id.clone(),
                    hz,
                })?;
        }
        if start.current_index >= sequence.len() {
            return Err(EngineError::StartIndexOutOfRange {
                index: start.current_index,
                len: sequence.len(),
            });
        }

        tracing::info!(
            "Resuming '{}' at #{} +{}s",
            checkpoint.preset_id,
            start.current_index,
            start.elapsed_in_entry
        );
        self.playlist.stop();
        self.sequencer.stop();
        self.begin(sequence, start)
    }

    /// Writes a checkpoint for an unfinished session and silences all
    /// audio, including tones still fading. Call before exiting.
    pub fn shutdown(&mut self) {
        if matches!(
            self.sequencer.state(),
            PlaybackState::Playing | PlaybackState::Paused
        ) {
            self.save_checkpoint(self.sequencer.progress());
        }
        self.sequencer.shutdown();
        self.dispatch();
    }

    /// Feeds elapsed wall time to the engine and delivers resulting events.
    ///
    /// When an item's last tick lands inside `elapsed`, the rest of
    /// `elapsed` counts toward the pause before the next item.
    ///
    /// # Returns
    ///
    /// Number of ticks handled while playing
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.playlist.in_gap() {
            // The clock is halted between items; this only runs tone teardowns.
            self.sequencer.advance(elapsed);
            self.dispatch();
            if let Some(step) = self.playlist.advance(elapsed) {
                self.run_step(step);
            }
            return 0;
        }
        let ticks = self.sequencer.advance(elapsed);
        self.dispatch();
        if self.playlist.in_gap() {
            // Time past the item's last tick already counts toward the pause.
            let leftover = elapsed.saturating_sub(self.config.tick() * ticks);
            if !leftover.is_zero() {
                if let Some(step) = self.playlist.advance(leftover) {
                    self.run_step(step);
                }
            }
        }
        ticks
    }

    // ========== PLAYLIST ==========

    /// Appends a snapshot to the playlist and returns its position.
    pub fn enqueue(&mut self, item: PlaylistItem) -> usize {
        self.playlist.enqueue(item)
    }

    /// Removes a playlist item.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PlaylistIndexOutOfRange`] for a bad index
    pub fn remove(&mut self, index: usize) -> Result<PlaylistItem, EngineError> {
        self.playlist.remove(index)
    }

    /// Empties the playlist. A playing item finishes as a single session.
    pub fn clear_playlist(&mut self) {
        self.playlist.clear();
    }

    /// Plays the playlist from its first item.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyPlaylist`] if nothing is queued
    pub fn start_playlist(&mut self) -> Result<(), EngineError> {
        if self.playlist.is_empty() {
            tracing::error!("Cannot start an empty playlist");
            return Err(EngineError::EmptyPlaylist);
        }
        self.sequencer.stop();
        self.checkpoints.clear();
        let step = self.playlist.start()?;
        self.run_step(step);
        Ok(())
    }

    fn run_step(&mut self, step: PlaylistStep) {
        let mut step = Some(step);
        while let Some(current) = step.take() {
            match current {
                PlaylistStep::Play {
                    position,
                    len,
                    item,
                } => {
                    let preset_id = item.preset_id().to_string();
                    match self.begin(item.sequence, Progress::default()) {
                        Ok(()) => {
                            self.bus.publish(&PlaybackEvent::PlaylistItemStarted {
                                position,
                                len,
                                preset_id,
                            });
                        }
                        Err(e) => {
                            tracing::warn!("Skipping playlist item {}: {}", position, e);
                            self.playlist.item_finished(Duration::ZERO);
                            step = self.playlist.skip_gap();
                        }
                    }
                }
                PlaylistStep::Finished { len } => {
                    self.checkpoints.clear();
                    self.bus.publish(&PlaybackEvent::PlaylistCompleted { len });
                }
            }
        }
    }

    fn begin(&mut self, sequence: Sequence, start: Progress) -> Result<(), EngineError> {
        self.sequencer.load(sequence, start)?;
        self.sequencer.play()?;
        self.dispatch();
        Ok(())
    }

    // ========== EVENTS ==========

    fn save_checkpoint(&mut self, progress: Progress) {
        let Some(sequence) = self.sequencer.sequence() else {
            return;
        };
        self.checkpoints.save_position(sequence, progress);
        self.ticks_since_checkpoint = 0;
    }

    /// Delivers pending sequencer events in order, writing or clearing
    /// checkpoints as they pass.
    fn dispatch(&mut self) {
        for event in self.sequencer.take_events() {
            match event {
                SequencerEvent::Progress {
                    progress,
                    seconds_per_entry,
                    total_entries,
                } => {
                    self.ticks_since_checkpoint += 1;
                    let every = self.config.checkpoint_every_ticks;
                    // At elapsed == duration a frequency change or finish follows.
                    if every > 0
                        && self.ticks_since_checkpoint >= every
                        && progress.elapsed_in_entry < seconds_per_entry
                    {
                        self.save_checkpoint(progress);
                    }
                    let elapsed_total = progress.current_index as u64 * seconds_per_entry as u64
                        + progress.elapsed_in_entry as u64;
                    self.bus.publish(&PlaybackEvent::Progress(ProgressReport {
                        elapsed_in_entry: progress.elapsed_in_entry,
                        seconds_per_entry,
                        current_index: progress.current_index,
                        total_entries,
                        elapsed_total,
                    }));
                }
                SequencerEvent::FrequencyChanged { progress, entry } => {
                    self.save_checkpoint(progress);
                    let (preset_id, total) = self
                        .sequencer
                        .sequence()
                        .map(|s| (s.preset_id().to_string(), s.len()))
                        .unwrap_or_default();
                    self.bus.publish(&PlaybackEvent::FrequencyChanged {
                        preset_id,
                        index: progress.current_index,
                        total,
                        entry,
                    });
                }
                SequencerEvent::StateChanged(state) => {
                    self.bus.publish(&PlaybackEvent::StateChanged(state));
                }
                SequencerEvent::Finished { preset_id } => {
                    match self.playlist.item_finished(self.config.inter_item_pause()) {
                        Some(position) => {
                            self.bus
                                .publish(&PlaybackEvent::PlaylistItemFinished { position });
                        }
                        None => {
                            self.checkpoints.clear();
                            self.bus.publish(&PlaybackEvent::SessionCompleted { preset_id });
                        }
                    }
                }
            }
        }
    }

    // ========== ACCESSORS ==========

    pub fn state(&self) -> PlaybackState {
        self.sequencer.state()
    }

    pub fn progress(&self) -> Progress {
        self.sequencer.progress()
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequencer.sequence()
    }

    pub fn current_entry(&self) -> Option<&FrequencyEntry> {
        self.sequencer.current_entry()
    }

    /// Progress snapshot for display, if a sequence is loaded.
    pub fn progress_report(&self) -> Option<ProgressReport> {
        let sequence = self.sequencer.sequence()?;
        let progress = self.sequencer.progress();
        Some(ProgressReport {
            elapsed_in_entry: progress.elapsed_in_entry,
            seconds_per_entry: sequence.seconds_per_entry(),
            current_index: progress.current_index,
            total_entries: sequence.len(),
            elapsed_total: sequence.elapsed_total(progress),
        })
    }

    pub fn playlist(&self) -> &PlaylistOrchestrator {
        &self.playlist
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn checkpoints_mut(&mut self) -> &mut CheckpointStore<S> {
        &mut self.checkpoints
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
}

/// Index of the entry playing `hz`: `index` itself if it still matches,
/// otherwise the first entry with that frequency.
fn locate_entry(sequence: &Sequence, index: usize, hz: f32) -> Option<usize> {
    let plays_hz = |entry: &FrequencyEntry| (entry.hz - hz).abs() < 1e-3;
    if sequence.entry(index).is_some_and(|e| plays_hz(e)) {
        return Some(index);
    }
    sequence.entries().iter().position(|e| plays_hz(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::checkpoint::MemoryStore;
    use crate::engine::SilentBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sequence(id: &str, len: usize, seconds: u32) -> Sequence {
        let entries = (0..len)
            .map(|i| FrequencyEntry::new(100.0 * (i + 1) as f32, ""))
            .collect();
        Sequence::new(id, entries, seconds)
    }

    fn player() -> (Player<MemoryStore>, Rc<RefCell<Vec<PlaybackEvent>>>) {
        let config = PlayerConfig {
            checkpoint_every_ticks: 0,
            ..PlayerConfig::default()
        };
        let mut player = Player::new(Box::new(SilentBackend), MemoryStore::new(), config);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        player.subscribe(move |e: &PlaybackEvent| sink.borrow_mut().push(e.clone()));
        (player, log)
    }

    fn run(player: &mut Player<MemoryStore>, seconds: u32) {
        for _ in 0..seconds {
            player.advance(Duration::from_secs(1));
        }
    }

    #[test]
    fn test_frequency_change_writes_checkpoint() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 2, 3)).unwrap();
        let saved = player.saved_checkpoint().unwrap();
        assert_eq!((saved.current_index, saved.elapsed_in_entry), (0, 0));

        run(&mut player, 3);
        let saved = player.saved_checkpoint().unwrap();
        assert_eq!((saved.current_index, saved.elapsed_in_entry), (1, 0));
    }

    #[test]
    fn test_pause_writes_checkpoint() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 2, 10)).unwrap();
        run(&mut player, 4);
        player.pause().unwrap();
        assert_eq!(player.saved_checkpoint().unwrap().elapsed_in_entry, 4);
    }

    #[test]
    fn test_periodic_checkpoint() {
        let config = PlayerConfig {
            checkpoint_every_ticks: 2,
            ..PlayerConfig::default()
        };
        let mut player = Player::new(Box::new(SilentBackend), MemoryStore::new(), config);
        player.start_fresh(sequence("p1", 1, 10)).unwrap();
        run(&mut player, 5);
        assert_eq!(player.saved_checkpoint().unwrap().elapsed_in_entry, 4);
    }

    #[test]
    fn test_single_completion_clears_checkpoint() {
        let (mut player, log) = player();
        player.start_fresh(sequence("p1", 1, 2)).unwrap();
        run(&mut player, 2);
        assert!(player.saved_checkpoint().is_none());
        assert!(log.borrow().contains(&PlaybackEvent::SessionCompleted {
            preset_id: "p1".into()
        }));
    }

    #[test]
    fn test_start_fresh_rejects_empty_without_touching_state() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 2, 10)).unwrap();
        run(&mut player, 3);

        let err = player.start_fresh(sequence("p2", 0, 10)).unwrap_err();
        assert!(matches!(err, EngineError::EmptySequence { .. }));
        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(player.progress(), Progress::new(0, 3));
        assert!(player.saved_checkpoint().is_some());
    }

    #[test]
    fn test_start_fresh_replaces_running_session() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 2, 10)).unwrap();
        run(&mut player, 3);
        player.start_fresh(sequence("p2", 1, 10)).unwrap();
        assert_eq!(player.sequence().map(|s| s.preset_id()), Some("p2"));
        assert_eq!(player.progress(), Progress::default());
        assert_eq!(player.saved_checkpoint().unwrap().preset_id, "p2");
    }

    #[test]
    fn test_resume_uses_saved_duration() {
        let catalog = Catalog::built_in();
        let (mut player, _) = player();
        let checkpoint = ResumeCheckpoint {
            preset_id: "focus".into(),
            current_index: 1,
            elapsed_in_entry: 7,
            seconds_per_entry: Some(20),
            hz: None,
            saved_at: 0,
        };
        player.resume(&checkpoint, &catalog).unwrap();
        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(player.progress(), Progress::new(1, 7));
        assert_eq!(player.sequence().unwrap().seconds_per_entry(), 20);
    }

    #[test]
    fn test_resume_unknown_preset() {
        let (mut player, _) = player();
        let checkpoint = ResumeCheckpoint {
            preset_id: "gone".into(),
            current_index: 0,
            elapsed_in_entry: 0,
            seconds_per_entry: None,
            hz: None,
            saved_at: 0,
        };
        assert_eq!(
            player.resume(&checkpoint, &Catalog::built_in()),
            Err(EngineError::UnknownPreset("gone".into()))
        );
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_preview_stops_after_three_seconds() {
        let (mut player, events) = player();
        player.preview(432.0).unwrap();
        assert!(player.sequencer().tone().is_sounding());

        player.advance(Duration::from_millis(2900));
        assert!(player.sequencer().tone().is_sounding());
        player.advance(Duration::from_millis(100));
        assert!(!player.sequencer().tone().is_sounding());
        assert!(events.borrow().is_empty());
        assert!(player.saved_checkpoint().is_none());
    }

    #[test]
    fn test_preview_rejected_while_playing_or_paused() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 2, 10)).unwrap();
        assert!(player.preview(432.0).is_err());
        player.pause().unwrap();
        assert!(player.preview(432.0).is_err());
        assert_eq!(player.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_resume_follows_saved_frequency() {
        let catalog = Catalog::built_in();
        let (mut player, _) = player();
        // Saved while "Clarity" was disabled, so index 1 meant 852 Hz.
        let checkpoint = ResumeCheckpoint {
            preset_id: "focus".into(),
            current_index: 1,
            elapsed_in_entry: 12,
            seconds_per_entry: Some(60),
            hz: Some(852.0),
            saved_at: 0,
        };
        player.resume(&checkpoint, &catalog).unwrap();
        assert_eq!(player.progress(), Progress::new(2, 12));
        assert_eq!(player.current_entry().map(|e| e.hz), Some(852.0));
    }

    #[test]
    fn test_resume_rejects_vanished_frequency() {
        let mut catalog = Catalog::built_in();
        let focus = catalog.presets.iter_mut().find(|p| p.id == "focus").unwrap();
        focus.set_enabled(2, false);
        let (mut player, _) = player();
        let checkpoint = ResumeCheckpoint {
            preset_id: "focus".into(),
            current_index: 2,
            elapsed_in_entry: 0,
            seconds_per_entry: Some(60),
            hz: Some(852.0),
            saved_at: 0,
        };
        assert_eq!(
            player.resume(&checkpoint, &catalog),
            Err(EngineError::CheckpointMismatch {
                preset_id: "focus".into(),
                hz: 852.0,
            })
        );
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_frequency_change_records_hz() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 2, 2)).unwrap();
        run(&mut player, 2);
        assert_eq!(player.saved_checkpoint().unwrap().hz, Some(200.0));
    }

    #[test]
    fn test_stop_keeps_checkpoint() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 2, 10)).unwrap();
        run(&mut player, 3);
        player.stop();
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(player.saved_checkpoint().is_some());
    }

    #[test]
    fn test_shutdown_saves_position() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 2, 10)).unwrap();
        run(&mut player, 6);
        player.shutdown();
        assert_eq!(player.saved_checkpoint().unwrap().elapsed_in_entry, 6);
        assert!(!player.sequencer().tone().is_sounding());
    }

    #[test]
    fn test_play_during_gap_starts_next_item() {
        let (mut player, log) = player();
        player.enqueue(PlaylistItem::new("a", sequence("a", 1, 1)));
        player.enqueue(PlaylistItem::new("b", sequence("b", 1, 5)));
        player.start_playlist().unwrap();
        run(&mut player, 1);
        assert!(player.playlist().in_gap());

        player.play().unwrap();
        assert!(!player.playlist().in_gap());
        assert_eq!(player.sequence().map(|s| s.preset_id()), Some("b"));
        assert!(log.borrow().contains(&PlaybackEvent::PlaylistItemStarted {
            position: 1,
            len: 2,
            preset_id: "b".into()
        }));
    }

    #[test]
    fn test_clear_playlist_finishes_as_single_session() {
        let (mut player, log) = player();
        player.enqueue(PlaylistItem::new("a", sequence("a", 1, 2)));
        player.enqueue(PlaylistItem::new("b", sequence("b", 1, 2)));
        player.start_playlist().unwrap();
        player.clear_playlist();
        run(&mut player, 2);

        let log = log.borrow();
        assert!(log.contains(&PlaybackEvent::SessionCompleted {
            preset_id: "a".into()
        }));
        assert!(!log
            .iter()
            .any(|e| matches!(e, PlaybackEvent::PlaylistItemFinished { .. })));
    }

    #[test]
    fn test_unplayable_playlist_item_is_skipped() {
        let (mut player, log) = player();
        player.enqueue(PlaylistItem::new("empty", sequence("empty", 0, 1)));
        player.enqueue(PlaylistItem::new("b", sequence("b", 1, 1)));
        player.start_playlist().unwrap();
        assert_eq!(player.sequence().map(|s| s.preset_id()), Some("b"));
        assert!(log.borrow().contains(&PlaybackEvent::PlaylistItemStarted {
            position: 1,
            len: 2,
            preset_id: "b".into()
        }));
    }

    #[test]
    fn test_progress_report_totals() {
        let (mut player, _) = player();
        player.start_fresh(sequence("p1", 3, 10)).unwrap();
        run(&mut player, 12);
        let report = player.progress_report().unwrap();
        assert_eq!(report.current_index, 1);
        assert_eq!(report.elapsed_in_entry, 2);
        assert_eq!(report.elapsed_total, 12);
    }
}
