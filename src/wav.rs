use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader};

use crate::audio::SAMPLE_RATE;

/// Read a mono 16 kHz WAV file into `f32` samples in `[-1, 1]`.
///
/// Only the format the rest of the crate works in is accepted; anything else should
/// go through the ffmpeg-backed source instead of being resampled here.
pub fn read_mono_16k(audio_path: &Path) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(audio_path)
        .with_context(|| format!("failed to open wav file {}", audio_path.display()))?;

    let spec = reader.spec();
    if spec.channels != 1 {
        anyhow::bail!("expected mono WAV, got {} channels", spec.channels);
    }

    if spec.sample_rate != SAMPLE_RATE {
        anyhow::bail!(
            "expected {SAMPLE_RATE} Hz, got {} – decode through FfmpegSource for other rates",
            spec.sample_rate
        );
    }

    let samples = match spec.sample_format {
        SampleFormat::Int => {
            let mut samples = Vec::new();
            for s in reader.samples::<i16>() {
                let v = s? as f32 / i16::MAX as f32;
                samples.push(v);
            }
            samples
        }
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
    };

    Ok(samples)
}
