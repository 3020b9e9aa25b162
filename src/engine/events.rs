//! Playback events and their delivery to observers.
//!
//! Any number of observers can subscribe, either as a callback object
//! implementing [`PlaybackObserver`] or as an mpsc channel. Events are
//! delivered in the exact order the transitions happened.

use super::PlaybackState;
use crate::sequence::FrequencyEntry;
use std::sync::mpsc::{self, Receiver, Sender};

/// Snapshot sent once per tick while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    /// Ticks spent in the current entry, after this tick.
    pub elapsed_in_entry: u32,
    /// Ticks each entry plays.
    pub seconds_per_entry: u32,
    /// Index of the entry the tick belonged to.
    pub current_index: usize,
    /// Number of entries in the sequence.
    pub total_entries: usize,
    /// Ticks since the start of the sequence.
    pub elapsed_total: u64,
}

impl ProgressReport {
    /// Fraction of the current entry that has played, 0.0 to 1.0.
    pub fn entry_ratio(&self) -> f64 {
        if self.seconds_per_entry == 0 {
            return 0.0;
        }
        (self.elapsed_in_entry as f64 / self.seconds_per_entry as f64).clamp(0.0, 1.0)
    }

    /// Fraction of the whole sequence that has played, 0.0 to 1.0.
    pub fn total_ratio(&self) -> f64 {
        let total = self.total_entries as u64 * self.seconds_per_entry as u64;
        if total == 0 {
            return 0.0;
        }
        (self.elapsed_total as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// Everything an observer can be told about playback.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// One tick of playback.
    Progress(ProgressReport),
    /// A new entry started sounding.
    FrequencyChanged {
        preset_id: String,
        index: usize,
        total: usize,
        entry: FrequencyEntry,
    },
    /// The sequencer moved to a new state.
    StateChanged(PlaybackState),
    /// A single sequence (not part of a playlist) played to the end.
    SessionCompleted { preset_id: String },
    /// A playlist item was loaded and started.
    PlaylistItemStarted {
        position: usize,
        len: usize,
        preset_id: String,
    },
    /// A playlist item finished; the next one follows after a pause.
    PlaylistItemFinished { position: usize },
    /// The last playlist item finished.
    PlaylistCompleted { len: usize },
}

/// Receives playback events.
pub trait PlaybackObserver {
    fn on_event(&mut self, event: &PlaybackEvent);
}

impl<F> PlaybackObserver for F
where
    F: FnMut(&PlaybackEvent),
{
    fn on_event(&mut self, event: &PlaybackEvent) {
        self(event)
    }
}

/// Observer that writes every event except progress ticks to the log.
#[derive(Debug, Default)]
pub struct LogObserver;

impl PlaybackObserver for LogObserver {
    fn on_event(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::Progress(report) => {
                tracing::trace!(
                    "Tick {}/{} in entry {}",
                    report.elapsed_in_entry,
                    report.seconds_per_entry,
                    report.current_index
                );
            }
            PlaybackEvent::FrequencyChanged {
                preset_id,
                index,
                total,
                entry,
            } => {
                tracing::info!(
                    "[{}] {}/{}: {} {}",
                    preset_id,
                    index + 1,
                    total,
                    entry.label(),
                    entry.purpose
                );
            }
            other => tracing::info!("{:?}", other),
        }
    }
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Subscriber {
    Observer(Box<dyn PlaybackObserver>),
    Channel(Sender<PlaybackEvent>),
}

/// Fan-out of playback events to all subscribers.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    /// Adds a callback observer.
    pub fn subscribe(&mut self, observer: impl PlaybackObserver + 'static) -> SubscriptionId {
        let id = self.next_id();
        self.subscribers
            .push((id, Subscriber::Observer(Box::new(observer))));
        id
    }

    /// Adds a channel subscriber and returns its receiving end.
    /// The subscription ends by itself once the receiver is dropped.
    pub fn subscribe_channel(&mut self) -> (SubscriptionId, Receiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id();
        self.subscribers.push((id, Subscriber::Channel(tx)));
        (id, rx)
    }

    /// Removes a subscriber.
    ///
    /// # Returns
    ///
    /// false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Delivers one event to every subscriber, in subscription order.
    pub fn publish(&mut self, event: &PlaybackEvent) {
        self.subscribers.retain_mut(|(_, subscriber)| match subscriber {
            Subscriber::Observer(observer) => {
                observer.on_event(event);
                true
            }
            Subscriber::Channel(tx) => tx.send(event.clone()).is_ok(),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
