//! Offline rendering of a sequence to a WAV file.
//!
//! Uses the same envelope as live playback: each entry fades in when it
//! starts while the previous entry decays underneath it.

use super::dsp::{FadeEnvelope, SineOscillator};
use crate::config::PlayerConfig;
use crate::sequence::Sequence;
use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Samples rendered between progress callbacks.
const RENDER_BUFFER_SIZE: usize = 4096;

struct RenderVoice {
    oscillator: SineOscillator,
    envelope: FadeEnvelope,
}

impl RenderVoice {
    fn new(hz: f32, config: &PlayerConfig) -> Self {
        Self {
            oscillator: SineOscillator::new(hz, config.sample_rate),
            envelope: FadeEnvelope::new(
                config.sample_rate,
                config.peak_gain,
                config.fade_floor,
                config.fade_in(),
            ),
        }
    }

    fn next_sample(&mut self) -> f32 {
        let gain = self.envelope.next_gain();
        self.oscillator.next_sample() * gain
    }
}

/// Exports a sequence to a mono 16-bit WAV file.
///
/// # Arguments
///
/// * `sequence` - The sequence to render
/// * `config` - Sample rate, gains, and fade timings
/// * `output_path` - Path for the output WAV file
/// * `progress_callback` - Optional callback for progress updates (0.0 to 1.0)
///
/// # Errors
///
/// Returns error if the sequence is empty or the file cannot be written
pub fn export_to_wav<P, F>(
    sequence: &Sequence,
    config: &PlayerConfig,
    output_path: P,
    mut progress_callback: Option<F>,
) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(f32),
{
    if sequence.is_empty() {
        anyhow::bail!("Sequence '{}' has no enabled frequencies", sequence.preset_id());
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(output_path.as_ref(), spec).with_context(|| {
        format!(
            "Failed to create output WAV file: {}",
            output_path.as_ref().display()
        )
    })?;

    let samples_per_entry = sequence.seconds_per_entry() as usize * config.sample_rate as usize;
    let tail_samples = (config.fade_out().as_secs_f32() * config.sample_rate as f32) as usize;
    let total_samples = samples_per_entry * sequence.len() + tail_samples;

    let mut current: Option<RenderVoice> = None;
    let mut fading: Option<RenderVoice> = None;
    let mut written = 0usize;

    while written < total_samples {
        let chunk = (total_samples - written).min(RENDER_BUFFER_SIZE);
        for offset in 0..chunk {
            let sample_index = written + offset;
            if sample_index % samples_per_entry == 0 {
                if let Some(mut old) = current.take() {
                    old.envelope.release(config.fade_out());
                    fading = Some(old);
                }
                if let Some(entry) = sequence.entry(sample_index / samples_per_entry) {
                    current = Some(RenderVoice::new(entry.hz, config));
                }
            }

            let mut mixed = 0.0;
            if let Some(voice) = current.as_mut() {
                mixed += voice.next_sample();
            }
            if let Some(voice) = fading.as_mut() {
                mixed += voice.next_sample();
                if voice.envelope.is_silent() {
                    fading = None;
                }
            }

            let value = (mixed * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer.write_sample(value)?;
        }
        written += chunk;

        if let Some(ref mut callback) = progress_callback {
            callback(written as f32 / total_samples as f32);
        }
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    tracing::info!(
        "Exported '{}' ({} samples) to {}",
        sequence.preset_id(),
        total_samples,
        output_path.as_ref().display()
    );

    Ok(())
}
