use crate::Result;
use crate::segments::Transcription;

/// The transcription callback driven by [`crate::vadscribe::Vadscribe`].
///
/// An implementation turns one bounded window of mono 16 kHz `f32` samples, plus an
/// optional textual conditioning prompt, into text, a detected language, and
/// segments timed **local to the supplied buffer** (`0 ≤ t ≤ buffer length`). The
/// orchestrator rebases those times into the global timeline.
///
/// Implementations may be CPU- or GPU-bound and long-running; calls are strictly
/// sequential because each window's prompt depends on the previous windows'
/// results. Failures should be wrapped with [`crate::Error::transcriber`] and abort
/// the in-flight transcription; the orchestrator never retries.
pub trait Transcriber {
    fn transcribe(
        &mut self,
        samples_16k_mono: &[f32],
        prompt: Option<&str>,
    ) -> Result<Transcription>;
}
