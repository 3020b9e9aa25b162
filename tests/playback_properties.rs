//! End-to-end playback properties.
//!
//! Every test drives a `Player` with explicit one-second steps, so timing
//! is exact and no audio device is needed.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use toneseq::checkpoint::{KeyValueStore, MemoryStore};
use toneseq::engine::{SilentBackend, ToneBackend, Voice};
use toneseq::{
    EngineError, FrequencyEntry, PlaybackEvent, PlaybackState, Player, PlayerConfig,
    PlaylistItem, Progress, Sequence, ToneError,
};

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
enum ToneCall {
    Start(usize, f32),
    Release(usize),
    HardStop(usize),
}

type CallLog = Rc<RefCell<Vec<ToneCall>>>;

struct RecordingVoice {
    id: usize,
    log: CallLog,
}

impl Voice for RecordingVoice {
    fn release(&mut self, _fade_out: Duration) -> Result<(), ToneError> {
        self.log.borrow_mut().push(ToneCall::Release(self.id));
        Ok(())
    }

    fn hard_stop(&mut self) {
        self.log.borrow_mut().push(ToneCall::HardStop(self.id));
    }
}

#[derive(Default)]
struct RecordingBackend {
    next_id: usize,
    log: CallLog,
}

impl ToneBackend for RecordingBackend {
    fn start_voice(
        &mut self,
        frequency: f32,
        _fade_in: Duration,
        _peak_gain: f32,
    ) -> Result<Box<dyn Voice>, ToneError> {
        let id = self.next_id;
        self.next_id += 1;
        self.log.borrow_mut().push(ToneCall::Start(id, frequency));
        Ok(Box::new(RecordingVoice {
            id,
            log: self.log.clone(),
        }))
    }
}

struct DeadBackend;

impl ToneBackend for DeadBackend {
    fn start_voice(&mut self, _: f32, _: Duration, _: f32) -> Result<Box<dyn Voice>, ToneError> {
        Err(ToneError::Unavailable("no device".into()))
    }
}

fn sequence(id: &str, entries: usize, seconds: u32) -> Sequence {
    let entries = (0..entries)
        .map(|i| FrequencyEntry::new(100.0 * (i + 1) as f32, format!("step {}", i + 1)))
        .collect();
    Sequence::new(id, entries, seconds)
}

fn player_with<S: KeyValueStore>(
    backend: Box<dyn ToneBackend>,
    store: S,
) -> (Player<S>, Receiver<PlaybackEvent>) {
    let mut player = Player::new(backend, store, PlayerConfig::default());
    let (_, events) = player.subscribe_channel();
    (player, events)
}

fn silent_player() -> (Player<MemoryStore>, Receiver<PlaybackEvent>) {
    player_with(Box::new(SilentBackend), MemoryStore::new())
}

fn count<F: Fn(&PlaybackEvent) -> bool>(events: &[PlaybackEvent], predicate: F) -> usize {
    events.iter().filter(|e| predicate(e)).count()
}

fn is_progress(e: &PlaybackEvent) -> bool {
    matches!(e, PlaybackEvent::Progress(_))
}

fn is_frequency_change(e: &PlaybackEvent) -> bool {
    matches!(e, PlaybackEvent::FrequencyChanged { .. })
}

#[test]
fn test_natural_completion_takes_n_times_d_ticks() {
    for (entries, seconds) in [(1, 1), (3, 4), (5, 2), (2, 60)] {
        let (mut player, events) = silent_player();
        player.start_fresh(sequence("p", entries, seconds)).unwrap();

        let mut steps = 0;
        while player.state() == PlaybackState::Playing {
            player.advance(SECOND);
            steps += 1;
            assert!(steps <= entries * seconds as usize, "ran past N x D");
        }

        let events: Vec<_> = events.try_iter().collect();
        assert_eq!(steps, entries * seconds as usize);
        assert_eq!(count(&events, is_progress), entries * seconds as usize);
        assert_eq!(count(&events, is_frequency_change), entries);
        assert_eq!(
            count(&events, |e| matches!(e, PlaybackEvent::SessionCompleted { .. })),
            1
        );
        assert_eq!(player.state(), PlaybackState::Completed);
    }
}

#[test]
fn test_pause_twice_is_idempotent() {
    let log = CallLog::default();
    let backend = RecordingBackend {
        next_id: 0,
        log: log.clone(),
    };
    let (mut player, events) = player_with(Box::new(backend), MemoryStore::new());
    player.start_fresh(sequence("p", 2, 10)).unwrap();
    player.advance(SECOND * 3);

    player.pause().unwrap();
    events.try_iter().count();
    let calls_after_first = log.borrow().len();

    player.pause().unwrap();
    assert_eq!(player.state(), PlaybackState::Paused);
    assert_eq!(events.try_iter().count(), 0);
    assert_eq!(log.borrow().len(), calls_after_first);
    assert_eq!(
        log.borrow()
            .iter()
            .filter(|c| matches!(c, ToneCall::Release(_)))
            .count(),
        1
    );
}

#[test]
fn test_resume_continues_from_saved_elapsed() {
    let (mut player, events) = silent_player();
    player.load(sequence("p", 3, 10), Progress::new(1, 5)).unwrap();
    player.play().unwrap();
    player.advance(SECOND);

    let events: Vec<_> = events.try_iter().collect();
    let first_progress = events.iter().find_map(|e| match e {
        PlaybackEvent::Progress(report) => Some(*report),
        _ => None,
    });
    let report = first_progress.unwrap();
    assert_eq!(report.current_index, 1);
    assert_eq!(report.elapsed_in_entry, 6);

    let changes: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::FrequencyChanged { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![1]);
}

#[test]
fn test_resume_from_pause_keeps_elapsed() {
    let (mut player, events) = silent_player();
    player.start_fresh(sequence("p", 2, 10)).unwrap();
    player.advance(SECOND * 4);
    player.pause().unwrap();
    player.advance(SECOND * 30);
    events.try_iter().count();

    player.play().unwrap();
    player.advance(SECOND);
    let events: Vec<_> = events.try_iter().collect();
    assert_eq!(count(&events, is_frequency_change), 0);
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::Progress(r) if r.elapsed_in_entry == 5
    )));
}

#[test]
fn test_boundary_tick_advances_index() {
    let (mut player, events) = silent_player();
    player.load(sequence("p", 2, 5), Progress::new(0, 4)).unwrap();
    player.play().unwrap();
    events.try_iter().count();

    player.advance(SECOND);
    let events: Vec<_> = events.try_iter().collect();
    assert_eq!(player.progress(), Progress::new(1, 0));
    assert_eq!(count(&events, is_progress), 1);
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::FrequencyChanged { index: 1, .. }
    )));
}

#[test]
fn test_empty_sequence_is_rejected() {
    let (mut player, events) = silent_player();
    let err = player.load(sequence("p", 0, 5), Progress::default()).unwrap_err();
    assert_eq!(
        err,
        EngineError::EmptySequence {
            preset_id: "p".into()
        }
    );
    assert_eq!(player.state(), PlaybackState::Idle);
    assert_eq!(player.play(), Err(EngineError::NoSequenceLoaded));
    assert_eq!(events.try_iter().count(), 0);
}

#[test]
fn test_all_disabled_preset_is_rejected() {
    let mut entries = vec![FrequencyEntry::new(432.0, "a"), FrequencyEntry::new(528.0, "b")];
    for entry in &mut entries {
        entry.enabled = false;
    }
    let (mut player, _) = silent_player();
    assert!(matches!(
        player.start_fresh(Sequence::new("off", entries, 10)),
        Err(EngineError::EmptySequence { .. })
    ));
    assert_eq!(player.state(), PlaybackState::Idle);
}

#[test]
fn test_playlist_chains_items_with_pause() {
    let (mut player, events) = silent_player();
    player.enqueue(PlaylistItem::new("first", sequence("a", 1, 3)));
    player.enqueue(PlaylistItem::new("second", sequence("b", 1, 4)));
    player.start_playlist().unwrap();

    let mut timeline: Vec<(u32, PlaybackEvent)> =
        events.try_iter().map(|e| (0, e)).collect();
    for t in 1..=15 {
        player.advance(SECOND);
        timeline.extend(events.try_iter().map(|e| (t, e)));
    }
    let events: Vec<PlaybackEvent> = timeline.iter().map(|(_, e)| e.clone()).collect();

    assert_eq!(count(&events, is_frequency_change), 2);
    assert_eq!(count(&events, is_progress), 7);
    assert_eq!(
        count(&events, |e| matches!(e, PlaybackEvent::PlaylistCompleted { len: 2 })),
        1
    );
    assert_eq!(
        count(&events, |e| matches!(e, PlaybackEvent::SessionCompleted { .. })),
        0
    );

    let second_started = timeline
        .iter()
        .filter(|(_, e)| matches!(e, PlaybackEvent::PlaylistItemStarted { position: 1, .. }))
        .map(|(t, _)| *t)
        .collect::<Vec<_>>();
    // Item 0 finishes on the third tick, then the 2 s pause runs.
    assert_eq!(second_started, vec![5]);

    let completed_at = timeline
        .iter()
        .find(|(_, e)| matches!(e, PlaybackEvent::PlaylistCompleted { .. }))
        .map(|(t, _)| *t);
    assert_eq!(completed_at, Some(11));
    assert_eq!(player.playlist().len(), 2);
    assert!(player.saved_checkpoint().is_none());
}

#[test]
fn test_pause_checkpoint_matches_position() {
    let (mut player, _) = silent_player();
    player.start_fresh(sequence("p", 3, 10)).unwrap();
    player.advance(SECOND * 12);
    player.pause().unwrap();

    let checkpoint = player.saved_checkpoint().unwrap();
    assert_eq!(checkpoint.preset_id, "p");
    assert_eq!(checkpoint.progress(), Progress::new(1, 2));
    assert_eq!(checkpoint.seconds_per_entry, Some(10));
}

#[test]
fn test_stop_keeps_checkpoint_and_completion_clears_it() {
    let (mut player, _) = silent_player();
    player.start_fresh(sequence("p", 2, 2)).unwrap();
    player.advance(SECOND * 3);
    player.stop();
    assert_eq!(player.saved_checkpoint().unwrap().progress(), Progress::new(1, 0));

    player.start_fresh(sequence("p", 2, 2)).unwrap();
    player.advance(SECOND * 4);
    assert_eq!(player.state(), PlaybackState::Completed);
    assert!(player.saved_checkpoint().is_none());
}

#[test]
fn test_playlist_item_completion_keeps_checkpoint() {
    let (mut player, events) = silent_player();
    player.enqueue(PlaylistItem::new("first", sequence("a", 1, 3)));
    player.enqueue(PlaylistItem::new("second", sequence("b", 1, 4)));
    player.start_playlist().unwrap();
    for _ in 0..3 {
        player.advance(SECOND);
    }

    assert!(player.playlist().in_gap());
    assert!(player.saved_checkpoint().is_some());
    let events: Vec<_> = events.try_iter().collect();
    assert_eq!(
        count(&events, |e| matches!(e, PlaybackEvent::PlaylistItemFinished { position: 0 })),
        1
    );
    assert_eq!(
        count(&events, |e| matches!(e, PlaybackEvent::SessionCompleted { .. })),
        0
    );
}

#[test]
fn test_long_step_carries_into_playlist_pause() {
    let (mut player, events) = silent_player();
    player.enqueue(PlaylistItem::new("first", sequence("a", 1, 2)));
    player.enqueue(PlaylistItem::new("second", sequence("b", 1, 5)));
    player.start_playlist().unwrap();

    // Two ticks finish the first item; the other two seconds cover the pause.
    assert_eq!(player.advance(SECOND * 4), 2);

    let events: Vec<_> = events.try_iter().collect();
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::PlaylistItemStarted { position: 1, .. }
    )));
    assert!(!player.playlist().in_gap());
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.sequence().map(|s| s.preset_id()), Some("b"));
    assert_eq!(player.progress(), Progress::new(0, 0));
}

#[test]
fn test_empty_playlist_cannot_start() {
    let (mut player, _) = silent_player();
    assert_eq!(player.start_playlist(), Err(EngineError::EmptyPlaylist));
    assert_eq!(player.state(), PlaybackState::Idle);
}

#[test]
fn test_checkpoint_failure_does_not_halt_playback() {
    let (mut player, events) = player_with(Box::new(SilentBackend), MemoryStore::unavailable());
    player.start_fresh(sequence("p", 2, 3)).unwrap();
    for _ in 0..6 {
        player.advance(SECOND);
    }
    let events: Vec<_> = events.try_iter().collect();
    assert_eq!(count(&events, is_progress), 6);
    assert_eq!(player.state(), PlaybackState::Completed);
    assert!(player.saved_checkpoint().is_none());
}

#[test]
fn test_audio_failure_keeps_timing() {
    let (mut player, events) = player_with(Box::new(DeadBackend), MemoryStore::new());
    player.start_fresh(sequence("p", 2, 3)).unwrap();
    assert_eq!(player.state(), PlaybackState::Playing);
    for _ in 0..6 {
        player.advance(SECOND);
    }
    let events: Vec<_> = events.try_iter().collect();
    assert_eq!(count(&events, is_progress), 6);
    assert_eq!(count(&events, is_frequency_change), 2);
    assert_eq!(player.state(), PlaybackState::Completed);
}

#[test]
fn test_stale_teardown_spares_replacement_tone() {
    let log = CallLog::default();
    let backend = RecordingBackend {
        next_id: 0,
        log: log.clone(),
    };
    let (mut player, _) = player_with(Box::new(backend), MemoryStore::new());
    player.start_fresh(sequence("p", 1, 60)).unwrap();
    player.stop();
    player.start_fresh(sequence("p", 1, 60)).unwrap();

    player.advance(Duration::from_millis(600));

    let calls = log.borrow();
    assert!(calls.contains(&ToneCall::HardStop(0)));
    assert!(!calls.contains(&ToneCall::HardStop(1)));
    assert!(!calls.contains(&ToneCall::Release(1)));
    assert!(player.sequencer().tone().is_sounding());
}

#[test]
fn test_frequency_change_crossfades_tones() {
    let log = CallLog::default();
    let backend = RecordingBackend {
        next_id: 0,
        log: log.clone(),
    };
    let (mut player, _) = player_with(Box::new(backend), MemoryStore::new());
    player.start_fresh(sequence("p", 2, 1)).unwrap();
    player.advance(SECOND);

    let calls = log.borrow();
    assert_eq!(
        &calls[..3],
        &[
            ToneCall::Start(0, 100.0),
            ToneCall::Release(0),
            ToneCall::Start(1, 200.0)
        ]
    );
}

#[test]
fn test_observers_see_identical_order() {
    let (mut player, channel) = silent_player();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    player.subscribe(move |e: &PlaybackEvent| sink.borrow_mut().push(e.clone()));

    player.start_fresh(sequence("p", 2, 2)).unwrap();
    for _ in 0..4 {
        player.advance(SECOND);
    }
    let from_channel: Vec<_> = channel.try_iter().collect();
    assert_eq!(*seen.borrow(), from_channel);
    assert!(matches!(
        from_channel.last(),
        Some(PlaybackEvent::SessionCompleted { .. })
    ));
}
