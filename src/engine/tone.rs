//! Single-voice tone generation with deferred, generation-keyed teardown.
//!
//! Starting a tone always releases the previous one first. The released
//! voice keeps decaying on its own until its teardown delay elapses, then
//! it is hard-stopped. Each teardown owns the voice it was created for and
//! carries that voice's generation, so a late teardown can never touch a
//! tone that replaced it.

use crate::config::PlayerConfig;
use crate::error::ToneError;
use std::time::Duration;

/// A sounding tone handed out by a [`ToneBackend`].
pub trait Voice {
    /// Begins the exponential fade-out. The voice keeps producing its
    /// decaying signal until [`Voice::hard_stop`] is called.
    fn release(&mut self, fade_out: Duration) -> Result<(), ToneError>;

    /// Cuts the signal path immediately.
    fn hard_stop(&mut self);
}

/// Something that can open new voices, e.g. an audio device.
pub trait ToneBackend {
    /// Opens a voice at `frequency` that fades in linearly to `peak_gain`.
    fn start_voice(
        &mut self,
        frequency: f32,
        fade_in: Duration,
        peak_gain: f32,
    ) -> Result<Box<dyn Voice>, ToneError>;
}

/// Fade timings and gain applied by a [`ToneGenerator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    pub fade_in: Duration,
    pub fade_out: Duration,
    pub teardown_delay: Duration,
    pub peak_gain: f32,
}

impl From<&PlayerConfig> for FadeSettings {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            fade_in: config.fade_in(),
            fade_out: config.fade_out(),
            teardown_delay: config.teardown_delay(),
            peak_gain: config.peak_gain,
        }
    }
}

struct ActiveVoice {
    generation: u64,
    frequency: f32,
    voice: Box<dyn Voice>,
}

struct PendingTeardown {
    generation: u64,
    remaining: Duration,
    voice: Box<dyn Voice>,
}

/// Plays at most one rising or holding tone at a time.
pub struct ToneGenerator {
    backend: Box<dyn ToneBackend>,
    settings: FadeSettings,
    active: Option<ActiveVoice>,
    pending: Vec<PendingTeardown>,
    next_generation: u64,
}

impl ToneGenerator {
    pub fn new(backend: Box<dyn ToneBackend>, settings: FadeSettings) -> Self {
        Self {
            backend,
            settings,
            active: None,
            pending: Vec::new(),
            next_generation: 1,
        }
    }

    /// Fades out the current tone (if any) and starts a new one.
    ///
    /// If the backend cannot open a voice the failure is logged and the
    /// generator is left silent; callers keep their timing regardless.
    pub fn play(&mut self, frequency: f32) {
        self.release_active();

        let generation = self.next_generation;
        self.next_generation += 1;

        match self.backend.start_voice(
            frequency,
            self.settings.fade_in,
            self.settings.peak_gain,
        ) {
            Ok(voice) => {
                tracing::debug!("Tone #{} started at {} Hz", generation, frequency);
                self.active = Some(ActiveVoice {
                    generation,
                    frequency,
                    voice,
                });
            }
            Err(e) => {
                tracing::warn!("Could not start tone at {} Hz: {}", frequency, e);
            }
        }
    }

    /// Fades out the current tone, leaving no active tone.
    pub fn stop(&mut self) {
        self.release_active();
    }

    fn release_active(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        match active.voice.release(self.settings.fade_out) {
            Ok(()) => {
                self.pending.push(PendingTeardown {
                    generation: active.generation,
                    remaining: self.settings.teardown_delay,
                    voice: active.voice,
                });
            }
            Err(e) => {
                tracing::warn!(
                    "Fade-out for tone #{} failed ({}), stopping hard",
                    active.generation,
                    e
                );
                active.voice.hard_stop();
            }
        }
    }

    /// Advances deferred teardowns by `elapsed`, stopping voices whose
    /// fade-out window has passed.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.pending.is_empty() {
            return;
        }
        let active_generation = self.active.as_ref().map(|a| a.generation);
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut teardown in self.pending.drain(..) {
            teardown.remaining = teardown.remaining.saturating_sub(elapsed);
            if !teardown.remaining.is_zero() {
                still_pending.push(teardown);
                continue;
            }
            if Some(teardown.generation) == active_generation {
                // Generations are unique, so this only happens if bookkeeping broke.
                tracing::error!("Teardown for active tone #{} ignored", teardown.generation);
                continue;
            }
            tracing::debug!("Tone #{} torn down", teardown.generation);
            teardown.voice.hard_stop();
        }
        self.pending = still_pending;
    }

    /// Hard-stops everything, including voices still fading out.
    pub fn shutdown(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.voice.hard_stop();
        }
        for mut teardown in self.pending.drain(..) {
            teardown.voice.hard_stop();
        }
    }

    /// Frequency of the tone currently rising or holding.
    pub fn current_frequency(&self) -> Option<f32> {
        self.active.as_ref().map(|a| a.frequency)
    }

    /// Generation of the tone currently rising or holding.
    pub fn current_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.generation)
    }

    pub fn is_sounding(&self) -> bool {
        self.active.is_some()
    }

    /// Number of released voices still waiting for teardown.
    pub fn pending_teardowns(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for ToneGenerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Start(f32),
        Release(f32),
        HardStop(f32),
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    struct FakeVoice {
        frequency: f32,
        log: Log,
        fail_release: bool,
    }

    impl Voice for FakeVoice {
        fn release(&mut self, _fade_out: Duration) -> Result<(), ToneError> {
            if self.fail_release {
                return Err(ToneError::Schedule("no scheduler".into()));
            }
            self.log.borrow_mut().push(Call::Release(self.frequency));
            Ok(())
        }

        fn hard_stop(&mut self) {
            self.log.borrow_mut().push(Call::HardStop(self.frequency));
        }
    }

    struct FakeBackend {
        log: Log,
        fail_release: bool,
        unavailable: bool,
    }

    impl ToneBackend for FakeBackend {
        fn start_voice(
            &mut self,
            frequency: f32,
            _fade_in: Duration,
            _peak_gain: f32,
        ) -> Result<Box<dyn Voice>, ToneError> {
            if self.unavailable {
                return Err(ToneError::Unavailable("no device".into()));
            }
            self.log.borrow_mut().push(Call::Start(frequency));
            Ok(Box::new(FakeVoice {
                frequency,
                log: Rc::clone(&self.log),
                fail_release: self.fail_release,
            }))
        }
    }

    fn generator(fail_release: bool, unavailable: bool) -> (ToneGenerator, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let backend = FakeBackend {
            log: Rc::clone(&log),
            fail_release,
            unavailable,
        };
        let generator =
            ToneGenerator::new(Box::new(backend), FadeSettings::from(&PlayerConfig::default()));
        (generator, log)
    }

    #[test]
    fn test_new_tone_releases_old_one_first() {
        let (mut tone, log) = generator(false, false);
        tone.play(100.0);
        tone.play(200.0);
        assert_eq!(
            *log.borrow(),
            vec![Call::Start(100.0), Call::Release(100.0), Call::Start(200.0)]
        );
        assert_eq!(tone.current_frequency(), Some(200.0));
        assert_eq!(tone.pending_teardowns(), 1);
    }

    #[test]
    fn test_teardown_waits_for_delay() {
        let (mut tone, log) = generator(false, false);
        tone.play(100.0);
        tone.stop();
        tone.advance(Duration::from_millis(500));
        assert!(!log.borrow().contains(&Call::HardStop(100.0)));
        tone.advance(Duration::from_millis(50));
        assert!(log.borrow().contains(&Call::HardStop(100.0)));
        assert_eq!(tone.pending_teardowns(), 0);
        assert!(!tone.is_sounding());
    }

    #[test]
    fn test_late_teardown_does_not_touch_replacement() {
        let (mut tone, log) = generator(false, false);
        tone.play(100.0);
        tone.stop();
        tone.play(200.0);
        tone.advance(Duration::from_secs(1));
        assert!(log.borrow().contains(&Call::HardStop(100.0)));
        assert!(!log.borrow().contains(&Call::HardStop(200.0)));
        assert_eq!(tone.current_frequency(), Some(200.0));
    }

    #[test]
    fn test_failed_fade_falls_back_to_hard_stop() {
        let (mut tone, log) = generator(true, false);
        tone.play(100.0);
        tone.stop();
        assert_eq!(*log.borrow(), vec![Call::Start(100.0), Call::HardStop(100.0)]);
        assert_eq!(tone.pending_teardowns(), 0);
    }

    #[test]
    fn test_unavailable_backend_stays_silent() {
        let (mut tone, log) = generator(false, true);
        tone.play(100.0);
        assert!(!tone.is_sounding());
        tone.stop();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_generations_increase() {
        let (mut tone, _log) = generator(false, false);
        tone.play(100.0);
        let first = tone.current_generation().unwrap();
        tone.play(100.0);
        assert!(tone.current_generation().unwrap() > first);
    }

    #[test]
    fn test_shutdown_stops_fading_voices() {
        let (mut tone, log) = generator(false, false);
        tone.play(100.0);
        tone.play(200.0);
        tone.shutdown();
        let log = log.borrow();
        assert!(log.contains(&Call::HardStop(100.0)));
        assert!(log.contains(&Call::HardStop(200.0)));
    }
}
