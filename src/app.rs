//! Application state and event handling.
//!
//! This module defines the application state that sits between the
//! [`Player`], the preset catalog, and the TUI.

use crate::catalog::{Catalog, PresetSource};
use crate::checkpoint::{KeyValueStore, ResumeCheckpoint};
use crate::engine::{PlaybackEvent, PlaybackState};
use crate::error::EngineError;
use crate::player::Player;
use crate::playlist::{PlaylistItem, PlaylistQueue};
use crate::sequence::{format_time, Preset, MAX_MINUTES_PER_ENTRY, MIN_MINUTES_PER_ENTRY};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// How long a status message stays on screen.
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// The player type used by the application.
pub type AppPlayer = Player<Box<dyn KeyValueStore>>;

/// Which panel receives Up/Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Presets,
    Frequencies,
}

/// Main application state.
pub struct App {
    /// Presets available for playback.
    pub catalog: Catalog,
    /// The playback engine.
    pub player: AppPlayer,
    /// Engine events, drained once per frame.
    events: Receiver<PlaybackEvent>,
    /// Index into `catalog.presets`.
    pub selected_preset: usize,
    /// Index into the selected preset's frequencies.
    pub selected_frequency: usize,
    pub focused_panel: FocusedPanel,
    /// Status message with timestamp (for auto-clear).
    pub status_message: Option<(String, Instant)>,
    /// Checkpoint offered for resume at startup.
    pub resume_offer: Option<ResumeCheckpoint>,
    pub show_help: bool,
    pub help_scroll: u16,
    /// Where the playlist queue is autosaved.
    playlist_path: PathBuf,
}

impl App {
    /// Creates the application around a ready player.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Presets to list
    /// * `player` - Engine instance owned by the app
    /// * `playlist_path` - Autosave location for the playlist queue
    pub fn new(catalog: Catalog, mut player: AppPlayer, playlist_path: PathBuf) -> Self {
        let (_, events) = player.subscribe_channel();
        Self {
            catalog,
            player,
            events,
            selected_preset: 0,
            selected_frequency: 0,
            focused_panel: FocusedPanel::Presets,
            status_message: None,
            resume_offer: None,
            show_help: false,
            help_scroll: 0,
            playlist_path,
        }
    }

    /// Sets a status message to display.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Clears expired status messages.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }

    /// Advances the engine by the frame time and reacts to its events.
    pub fn update(&mut self, elapsed: Duration) {
        self.player.advance(elapsed);
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::SessionCompleted { preset_id } => {
                let name = self.preset_name(&preset_id);
                self.set_status(format!("Session complete: {}", name));
            }
            PlaybackEvent::PlaylistItemFinished { position } => {
                let pause = self.player.config().inter_item_pause().as_secs();
                self.set_status(format!(
                    "Item {} finished, next in {}s",
                    position + 1,
                    pause
                ));
            }
            PlaybackEvent::PlaylistItemStarted {
                position,
                len,
                preset_id,
            } => {
                let name = self.preset_name(&preset_id);
                self.set_status(format!("Playlist {}/{}: {}", position + 1, len, name));
            }
            PlaybackEvent::PlaylistCompleted { len } => {
                self.set_status(format!("Playlist complete ({} items)", len));
            }
            PlaybackEvent::Progress(_)
            | PlaybackEvent::FrequencyChanged { .. }
            | PlaybackEvent::StateChanged(_) => {}
        }
    }

    // ========== SELECTION ==========

    pub fn selected(&self) -> Option<&Preset> {
        self.catalog.get(self.selected_preset)
    }

    fn selected_mut(&mut self) -> Option<&mut Preset> {
        self.catalog.presets.get_mut(self.selected_preset)
    }

    /// Moves the cursor in the focused list, wrapping at both ends.
    pub fn move_selection(&mut self, delta: i32) {
        let (index, len) = match self.focused_panel {
            FocusedPanel::Presets => (&mut self.selected_preset, self.catalog.len()),
            FocusedPanel::Frequencies => {
                let len = self
                    .catalog
                    .get(self.selected_preset)
                    .map_or(0, |p| p.frequencies.len());
                (&mut self.selected_frequency, len)
            }
        };
        if len == 0 {
            return;
        }
        *index = (*index as i64 + delta as i64).rem_euclid(len as i64) as usize;
        if self.focused_panel == FocusedPanel::Presets {
            self.selected_frequency = 0;
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Presets => FocusedPanel::Frequencies,
            FocusedPanel::Frequencies => FocusedPanel::Presets,
        };
    }

    /// Enables or disables the highlighted frequency of the selected preset.
    /// Sessions already playing or queued are not affected.
    pub fn toggle_frequency(&mut self) {
        let index = self.selected_frequency;
        let Some(preset) = self.selected_mut() else {
            return;
        };
        let Some(enabled) = preset.frequencies.get(index).map(|f| !f.enabled) else {
            return;
        };
        preset.set_enabled(index, enabled);
        let label = preset.frequencies[index].label();
        self.set_status(format!(
            "{} {}",
            label,
            if enabled { "enabled" } else { "disabled" }
        ));
    }

    /// Changes the selected preset's minutes per entry, within 1 to 60.
    pub fn adjust_minutes(&mut self, delta: i32) {
        let Some(preset) = self.selected_mut() else {
            return;
        };
        let minutes = (preset.clamped_minutes() as i64 + delta as i64).clamp(
            MIN_MINUTES_PER_ENTRY as i64,
            MAX_MINUTES_PER_ENTRY as i64,
        ) as u32;
        preset.minutes_per_entry = minutes;
        self.set_status(format!("{} min per frequency", minutes));
    }

    /// Sounds the highlighted frequency briefly when nothing is playing.
    pub fn preview_selected(&mut self) {
        let Some(entry) = self
            .selected()
            .and_then(|p| p.frequencies.get(self.selected_frequency))
        else {
            return;
        };
        let (hz, label) = (entry.hz, entry.label());
        match self.player.preview(hz) {
            Ok(()) => self.set_status(format!("Previewing {}", label)),
            Err(_) => self.set_status("Stop playback to preview"),
        }
    }

    // ========== TRANSPORT ==========

    /// Space: pause or resume, or start the selection if nothing is loaded.
    pub fn toggle_playback(&mut self) {
        match self.player.toggle() {
            Ok(()) => {}
            Err(EngineError::NoSequenceLoaded) => self.start_selected(),
            Err(e) => self.set_status(format!("Error: {}", e)),
        }
    }

    /// Starts the selected preset from the beginning.
    pub fn start_selected(&mut self) {
        let Some(preset) = self.selected() else {
            return;
        };
        let name = preset.name.clone();
        let sequence = preset.to_sequence();
        let total = format_time(sequence.total_seconds());
        self.resume_offer = None;
        match self.player.start_fresh(sequence) {
            Ok(()) => self.set_status(format!("Playing {} ({})", name, total)),
            Err(e) => self.set_status(format!("Cannot play: {}", e)),
        }
    }

    pub fn stop(&mut self) {
        if self.player.state() != PlaybackState::Idle || self.player.playlist().in_gap() {
            self.player.stop();
            self.set_status("Stopped");
        }
    }

    // ========== RESUME ==========

    /// Offers the saved checkpoint for resume if its preset still exists.
    pub fn offer_resume(&mut self) {
        self.resume_offer = self
            .player
            .saved_checkpoint()
            .filter(|c| self.catalog.preset(&c.preset_id).is_some());
    }

    /// Resumes the offered checkpoint.
    pub fn accept_resume(&mut self) {
        let Some(checkpoint) = self.resume_offer.take() else {
            return;
        };
        match self.player.resume(&checkpoint, &self.catalog) {
            Ok(()) => {
                let name = self.preset_name(&checkpoint.preset_id);
                self.set_status(format!(
                    "Resumed {} at {}",
                    name,
                    format_time(checkpoint.elapsed_in_entry as u64)
                ));
            }
            Err(e) => self.set_status(format!("Cannot resume: {}", e)),
        }
    }

    pub fn dismiss_resume(&mut self) {
        self.resume_offer = None;
    }

    // ========== PLAYLIST ==========

    /// Queues a snapshot of the selected preset.
    pub fn enqueue_selected(&mut self) {
        let Some(preset) = self.selected() else {
            return;
        };
        match PlaylistItem::from_preset(preset, preset.clamped_minutes()) {
            Ok(item) => {
                let name = item.name.clone();
                let position = self.player.enqueue(item);
                self.set_status(format!("Queued {} at #{}", name, position + 1));
                self.save_playlist();
            }
            Err(e) => self.set_status(format!("Cannot queue: {}", e)),
        }
    }

    pub fn remove_last_queued(&mut self) {
        let len = self.player.playlist().len();
        if len == 0 {
            return;
        }
        if let Ok(item) = self.player.remove(len - 1) {
            self.set_status(format!("Removed {}", item.name));
            self.save_playlist();
        }
    }

    pub fn clear_playlist(&mut self) {
        self.player.clear_playlist();
        self.set_status("Playlist cleared");
        self.save_playlist();
    }

    pub fn start_playlist(&mut self) {
        self.resume_offer = None;
        if let Err(e) = self.player.start_playlist() {
            self.set_status(format!("Cannot start playlist: {}", e));
        }
    }

    /// Writes the playlist queue to its autosave file.
    pub fn save_playlist(&self) {
        if let Err(e) = self.player.playlist().queue().save_to_binary(&self.playlist_path) {
            tracing::warn!("Failed to save playlist: {}", e);
        }
    }

    /// Attempts to restore the playlist queue saved by a previous run.
    /// Missing or unreadable files leave the queue empty.
    pub fn try_load_playlist(&mut self) {
        if !self.playlist_path.exists() {
            return;
        }
        match PlaylistQueue::load_from_binary(&self.playlist_path) {
            Ok(queue) => {
                let count = queue.len();
                for item in queue.items() {
                    self.player.enqueue(item.clone());
                }
                if count > 0 {
                    self.set_status(format!("Restored playlist ({} items)", count));
                }
                tracing::info!("Loaded playlist from {:?}", self.playlist_path);
            }
            Err(e) => {
                tracing::warn!("Failed to load playlist: {}", e);
            }
        }
    }

    /// Saves state and silences audio before exit.
    pub fn shutdown(&mut self) {
        self.player.shutdown();
        self.save_playlist();
    }

    // ========== DISPLAY HELPERS ==========

    /// Display name for a preset id, falling back to the id itself.
    pub fn preset_name(&self, preset_id: &str) -> String {
        self.catalog
            .preset(preset_id)
            .map_or_else(|| preset_id.to_string(), |p| p.name.clone())
    }

    /// Name of the preset currently loaded in the player.
    pub fn now_playing_name(&self) -> Option<String> {
        self.player
            .sequence()
            .map(|s| self.preset_name(s.preset_id()))
    }
}
