//! Audio output backends for the tone generator.
//!
//! [`RodioBackend`] plays each voice through its own rodio [`Sink`], so a
//! fading voice and the voice replacing it are separate signal paths.
//! [`SilentBackend`] keeps all timing but produces no sound; it is used
//! when no device is available or audio is turned off.

use super::dsp::{FadeEnvelope, SineOscillator};
use super::tone::{ToneBackend, Voice};
use crate::config::PlayerConfig;
use crate::error::ToneError;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Release request shared between a voice handle and its audio source.
/// Uses atomics because the source runs on the output thread.
#[derive(Default)]
struct ToneControl {
    release_requested: AtomicBool,
    fade_out_ms: AtomicU64,
}

/// Mono sine source with a fade envelope.
/// Ends once its fade-out has decayed to silence.
struct SineTone {
    oscillator: SineOscillator,
    envelope: FadeEnvelope,
    control: Arc<ToneControl>,
    released: bool,
    sample_rate: u32,
}

impl Iterator for SineTone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if !self.released && self.control.release_requested.load(Ordering::Acquire) {
            let fade_out = Duration::from_millis(self.control.fade_out_ms.load(Ordering::Acquire));
            self.envelope.release(fade_out);
            self.released = true;
        }

        let gain = self.envelope.next_gain();
        if self.released && self.envelope.is_silent() {
            return None;
        }
        Some(self.oscillator.next_sample() * gain)
    }
}

impl Source for SineTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// A voice playing through its own sink.
struct RodioVoice {
    sink: Sink,
    control: Arc<ToneControl>,
}

impl Voice for RodioVoice {
    fn release(&mut self, fade_out: Duration) -> Result<(), ToneError> {
        if self.sink.empty() {
            return Err(ToneError::Schedule("voice already finished".into()));
        }
        self.control
            .fade_out_ms
            .store(fade_out.as_millis() as u64, Ordering::Release);
        self.control.release_requested.store(true, Ordering::Release);
        Ok(())
    }

    fn hard_stop(&mut self) {
        self.sink.stop();
    }
}

/// Tone backend writing to the default output device.
pub struct RodioBackend {
    /// Audio output stream (must be kept alive).
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sample_rate: u32,
    fade_floor: f32,
}

impl RodioBackend {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns [`ToneError::Unavailable`] if no device can be opened
    pub fn new(config: &PlayerConfig) -> Result<Self, ToneError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| ToneError::Unavailable(e.to_string()))?;
        tracing::info!("Audio output opened at {} Hz", config.sample_rate);
        Ok(Self {
            _stream: stream,
            handle,
            sample_rate: config.sample_rate,
            fade_floor: config.fade_floor,
        })
    }
}

impl ToneBackend for RodioBackend {
    fn start_voice(
        &mut self,
        frequency: f32,
        fade_in: Duration,
        peak_gain: f32,
    ) -> Result<Box<dyn Voice>, ToneError> {
        let sink = Sink::try_new(&self.handle).map_err(|e| ToneError::Unavailable(e.to_string()))?;
        let control = Arc::new(ToneControl::default());
        sink.append(SineTone {
            oscillator: SineOscillator::new(frequency, self.sample_rate),
            envelope: FadeEnvelope::new(self.sample_rate, peak_gain, self.fade_floor, fade_in),
            control: Arc::clone(&control),
            released: false,
            sample_rate: self.sample_rate,
        });
        Ok(Box::new(RodioVoice { sink, control }))
    }
}

/// Voice that produces nothing.
struct SilentVoice;

impl Voice for SilentVoice {
    fn release(&mut self, _fade_out: Duration) -> Result<(), ToneError> {
        Ok(())
    }

    fn hard_stop(&mut self) {}
}

/// Backend that keeps voice bookkeeping but never touches an audio device.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl ToneBackend for SilentBackend {
    fn start_voice(
        &mut self,
        frequency: f32,
        _fade_in: Duration,
        _peak_gain: f32,
    ) -> Result<Box<dyn Voice>, ToneError> {
        tracing::trace!("Silent voice at {} Hz", frequency);
        Ok(Box::new(SilentVoice))
    }
}
