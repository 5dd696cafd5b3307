use tracing::debug;
use voice_activity_detector::VoiceActivityDetector;

use crate::audio::{AudioSource, SAMPLE_RATE};
use crate::detector::SpeechDetector;
use crate::error::{Error, Result};
use crate::timefmt::format_timestamp;
use crate::timestamps::{TimeSpan, adjust_timestamps, multiply_timestamps};

/// Largest audio window loaded per model invocation (seconds).
///
/// One hour of 16 kHz mono `f32` is ~230 MB; this is the only place peak detection
/// memory is bounded, so honor it even for models that would accept longer input.
pub const VAD_MAX_PROCESSING_CHUNK: f64 = 3600.0;

/// Default speech probability threshold.
pub const SPEECH_THRESHOLD: f32 = 0.3;

/// Samples fed to the Silero model per prediction (the model's 16 kHz frame size).
const MODEL_CHUNK_SIZE: usize = 512;

/// A neural voice-activity model over one bounded buffer.
///
/// Returns **sample-indexed** speech spans; the driving detector converts them to
/// seconds and rebases them into the global timeline.
pub trait VoiceActivityModel {
    fn speech_spans(
        &mut self,
        samples_16k_mono: &[f32],
        threshold: f32,
    ) -> Result<Vec<TimeSpan>>;
}

/// The Silero VAD model, run through ONNX Runtime.
///
/// Model state carries across calls (the network is recurrent), which is what we
/// want when a long file is fed chunk by chunk.
pub struct SileroModel {
    vad: VoiceActivityDetector,
}

impl SileroModel {
    pub fn new() -> Result<Self> {
        let vad = VoiceActivityDetector::builder()
            .sample_rate(SAMPLE_RATE as i64)
            .chunk_size(MODEL_CHUNK_SIZE)
            .build()
            .map_err(Error::detector)?;

        Ok(Self { vad })
    }
}

impl VoiceActivityModel for SileroModel {
    fn speech_spans(
        &mut self,
        samples_16k_mono: &[f32],
        threshold: f32,
    ) -> Result<Vec<TimeSpan>> {
        let mut spans = Vec::new();
        let mut speech_start: Option<usize> = None;
        let mut offset = 0_usize;

        // The model scores fixed-size frames; a frame at or above the threshold is
        // speech. Consecutive speech frames collapse into one span.
        for chunk in samples_16k_mono.chunks(MODEL_CHUNK_SIZE) {
            let probability = self.vad.predict(chunk.iter().copied());

            if probability >= threshold {
                if speech_start.is_none() {
                    speech_start = Some(offset);
                }
            } else if let Some(start) = speech_start.take() {
                spans.push(TimeSpan::new(start as f64, offset as f64));
            }

            offset += chunk.len();
        }

        if let Some(start) = speech_start {
            spans.push(TimeSpan::new(start as f64, samples_16k_mono.len() as f64));
        }

        Ok(spans)
    }
}

/// Bounded-memory driver over a [`VoiceActivityModel`].
///
/// Long audio is probed once, then processed in windows of at most
/// [`VAD_MAX_PROCESSING_CHUNK`] seconds: each window is decoded, scored by the
/// model, converted from sample indices to seconds, rebased into global time, and
/// concatenated onto the running result.
pub struct SileroDetector<M> {
    model: M,
    threshold: f32,
    max_chunk_seconds: f64,
}

impl SileroDetector<SileroModel> {
    /// A detector backed by the bundled Silero model.
    pub fn new() -> Result<Self> {
        Ok(Self::with_model(SileroModel::new()?))
    }
}

impl<M: VoiceActivityModel> SileroDetector<M> {
    pub fn with_model(model: M) -> Self {
        Self {
            model,
            threshold: SPEECH_THRESHOLD,
            max_chunk_seconds: VAD_MAX_PROCESSING_CHUNK,
        }
    }

    /// Override the speech probability threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Override the per-invocation window bound. Mainly useful in tests.
    pub fn with_max_chunk_seconds(mut self, seconds: f64) -> Self {
        self.max_chunk_seconds = seconds;
        self
    }
}

impl<M: VoiceActivityModel> SpeechDetector for SileroDetector<M> {
    fn detect(&mut self, audio: &dyn AudioSource) -> Result<Vec<TimeSpan>> {
        let total_duration = audio.duration()?;
        let mut result = Vec::new();
        let mut chunk_start = 0.0_f64;

        while chunk_start < total_duration {
            let chunk_duration = (total_duration - chunk_start).min(self.max_chunk_seconds);

            debug!(
                from = %format_timestamp(chunk_start),
                to = %format_timestamp(chunk_start + chunk_duration),
                "processing VAD chunk"
            );

            let samples = audio.load(Some(chunk_start), Some(chunk_duration))?;
            let sample_spans = self.model.speech_spans(&samples, self.threshold)?;
            let second_spans = multiply_timestamps(&sample_spans, 1.0 / SAMPLE_RATE as f64);
            let rebased =
                adjust_timestamps(&second_spans, chunk_start, Some(chunk_start + chunk_duration));

            result.extend(rebased);
            chunk_start += chunk_duration;
        }

        Ok(result)
    }
}
