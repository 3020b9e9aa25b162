//! Sine synthesis and fade envelopes.
//!
//! Tones rise linearly from silence to the peak gain, hold, and on release
//! decay exponentially towards a small floor before going silent. An
//! exponential ramp cannot reach zero, so the floor is where the voice ends.

use std::f32::consts::TAU;
use std::time::Duration;

/// Phase-accumulating sine oscillator.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    phase: f32,
    phase_increment: f32,
}

impl SineOscillator {
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: frequency / sample_rate.max(1) as f32,
        }
    }

    /// Returns the next sample in -1.0..=1.0.
    pub fn next_sample(&mut self) -> f32 {
        let sample = (self.phase * TAU).sin();
        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        sample
    }
}

/// Phase of a [`FadeEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    /// Linear ramp from 0 to the peak gain.
    Rising,
    /// Holding at the peak gain.
    Holding,
    /// Exponential decay towards the floor.
    Falling,
    /// Finished; gain is 0 from here on.
    Silent,
}

/// Per-sample gain envelope with a linear fade-in and exponential fade-out.
#[derive(Debug, Clone)]
pub struct FadeEnvelope {
    sample_rate: f32,
    peak: f32,
    floor: f32,
    phase: FadePhase,
    gain: f32,
    rise_step: f32,
    rise_remaining: u64,
    fall_factor: f32,
    fall_remaining: u64,
}

impl FadeEnvelope {
    /// Creates an envelope that starts rising immediately.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Samples per second
    /// * `peak` - Gain reached at the end of the fade-in
    /// * `floor` - Gain at which the fade-out ends
    /// * `fade_in` - Length of the linear fade-in
    pub fn new(sample_rate: u32, peak: f32, floor: f32, fade_in: Duration) -> Self {
        let sample_rate = sample_rate.max(1) as f32;
        let rise_samples = (fade_in.as_secs_f32() * sample_rate).round() as u64;
        let (phase, gain, rise_step) = if rise_samples == 0 {
            (FadePhase::Holding, peak, 0.0)
        } else {
            (FadePhase::Rising, 0.0, peak / rise_samples as f32)
        };
        Self {
            sample_rate,
            peak,
            floor: floor.max(f32::MIN_POSITIVE),
            phase,
            gain,
            rise_step,
            rise_remaining: rise_samples,
            fall_factor: 1.0,
            fall_remaining: 0,
        }
    }

    /// Starts the exponential fade-out from whatever gain is current.
    ///
    /// Releasing an already falling or silent envelope changes nothing.
    pub fn release(&mut self, fade_out: Duration) {
        if matches!(self.phase, FadePhase::Falling | FadePhase::Silent) {
            return;
        }
        let samples = (fade_out.as_secs_f32() * self.sample_rate).round() as u64;
        if samples == 0 || self.gain <= self.floor {
            self.phase = FadePhase::Silent;
            self.gain = 0.0;
            return;
        }
        // gain * factor^samples == floor
        self.fall_factor = (self.floor / self.gain).powf(1.0 / samples as f32);
        self.fall_remaining = samples;
        self.phase = FadePhase::Falling;
    }

    /// Advances one sample and returns the gain to apply to it.
    pub fn next_gain(&mut self) -> f32 {
        match self.phase {
            FadePhase::Rising => {
                self.gain += self.rise_step;
                self.rise_remaining = self.rise_remaining.saturating_sub(1);
                if self.rise_remaining == 0 || self.gain >= self.peak {
                    self.gain = self.peak;
                    self.phase = FadePhase::Holding;
                }
            }
            FadePhase::Holding => {}
            FadePhase::Falling => {
                self.gain *= self.fall_factor;
                self.fall_remaining = self.fall_remaining.saturating_sub(1);
                if self.fall_remaining == 0 {
                    self.gain = 0.0;
                    self.phase = FadePhase::Silent;
                }
            }
            FadePhase::Silent => {}
        }
        self.gain
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_silent(&self) -> bool {
        self.phase == FadePhase::Silent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    #[test]
    fn test_fade_in_is_linear_to_peak() {
        let mut env = FadeEnvelope::new(RATE, 0.5, 0.001, Duration::from_secs(1));
        assert_eq!(env.phase(), FadePhase::Rising);
        for _ in 0..500 {
            env.next_gain();
        }
        assert!((env.gain() - 0.25).abs() < 0.001);
        for _ in 0..500 {
            env.next_gain();
        }
        assert_eq!(env.phase(), FadePhase::Holding);
        assert!((env.gain() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fade_out_reaches_silence_in_window() {
        let mut env = FadeEnvelope::new(RATE, 0.5, 0.001, Duration::ZERO);
        assert_eq!(env.phase(), FadePhase::Holding);
        env.release(Duration::from_millis(500));
        let mut previous = env.gain();
        for _ in 0..499 {
            let gain = env.next_gain();
            assert!(gain < previous);
            previous = gain;
        }
        assert!(!env.is_silent());
        assert!(previous < 0.0011);
        env.next_gain();
        assert!(env.is_silent());
        assert_eq!(env.next_gain(), 0.0);
    }

    #[test]
    fn test_release_during_fade_in_starts_from_current_gain() {
        let mut env = FadeEnvelope::new(RATE, 0.5, 0.001, Duration::from_secs(1));
        for _ in 0..200 {
            env.next_gain();
        }
        let before = env.gain();
        env.release(Duration::from_millis(100));
        let first = env.next_gain();
        assert!(first < before);
        assert_eq!(env.phase(), FadePhase::Falling);
    }

    #[test]
    fn test_release_twice_keeps_original_ramp() {
        let mut env = FadeEnvelope::new(RATE, 0.5, 0.001, Duration::ZERO);
        env.release(Duration::from_millis(100));
        for _ in 0..50 {
            env.next_gain();
        }
        env.release(Duration::from_secs(10));
        for _ in 0..50 {
            env.next_gain();
        }
        assert!(env.is_silent());
    }

    #[test]
    fn test_oscillator_stays_in_range() {
        let mut osc = SineOscillator::new(440.0, 44100);
        for _ in 0..44100 {
            let s = osc.next_sample();
            assert!((-1.0..=1.0).contains(&s));
        }
    }
}
