//! toneseq - Frequency sequence playback with resume and playlists.
//!
//! This library provides the playback engine behind the `toneseq` terminal
//! player: a tick-driven sequencer that plays each enabled frequency of a
//! preset in turn, fades tones in and out, writes resume checkpoints, and
//! chains presets into playlists.
//!
//! ```no_run
//! use std::time::Duration;
//! use toneseq::checkpoint::MemoryStore;
//! use toneseq::engine::SilentBackend;
//! use toneseq::{Catalog, Player, PlayerConfig};
//!
//! let catalog = Catalog::built_in();
//! let mut player = Player::new(
//!     Box::new(SilentBackend),
//!     MemoryStore::new(),
//!     PlayerConfig::default(),
//! );
//! let (_, events) = player.subscribe_channel();
//! player.start_fresh(catalog.presets[0].to_sequence()).unwrap();
//! player.advance(Duration::from_secs(1));
//! for event in events.try_iter() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod app;
pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod error;
pub mod player;
pub mod playlist;
pub mod sequence;
pub mod ui;

// Re-export commonly used types
pub use catalog::{Catalog, PresetSource};
pub use config::PlayerConfig;
pub use engine::{PlaybackEvent, PlaybackState};
pub use error::{EngineError, StoreError, ToneError};
pub use player::Player;
pub use playlist::{PlaylistItem, PlaylistOrchestrator};
pub use sequence::{FrequencyEntry, Preset, Progress, Sequence};
