//! Speech detection.
//!
//! A detector proposes the intervals of an audio source worth transcribing. The
//! orchestrator treats the returned list as raw material: it need not be sorted,
//! padded, or merged; normalization happens downstream in [`crate::timestamps`].

mod periodic;
mod silero;

pub use periodic::PeriodicDetector;
pub use silero::{
    SPEECH_THRESHOLD, SileroDetector, SileroModel, VAD_MAX_PROCESSING_CHUNK, VoiceActivityModel,
};

use crate::Result;
use crate::audio::AudioSource;
use crate::timestamps::TimeSpan;

/// Produces speech intervals, in global seconds, for a whole audio source.
///
/// Implementations own any chunked internal processing; callers consume the
/// returned list as a whole. Failures should be wrapped with
/// [`crate::Error::detector`].
pub trait SpeechDetector {
    fn detect(&mut self, audio: &dyn AudioSource) -> Result<Vec<TimeSpan>>;
}
