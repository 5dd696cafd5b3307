use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::timestamps::Timestamped;

/// A single transcribed segment in seconds.
///
/// Times are local to the buffer the transcriber saw until the orchestrator rebases
/// them into global time. Fields the transcriber returns beyond the known set are
/// preserved verbatim in `extra` so results round-trip through serde untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Segment {
    pub start: f64,
    pub end: f64,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Probability that the segment contains no speech. Absent means 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_speech_prob: Option<f64>,

    /// Seconds of the segment's tail lying in synthetic non-speech space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_amount: Option<f64>,

    /// Transcriber fields we don't model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            ..Self::default()
        }
    }

    /// `no_speech_prob` with the absent-means-zero reading applied.
    pub fn no_speech_prob_or_zero(&self) -> f64 {
        self.no_speech_prob.unwrap_or(0.0)
    }

    /// `expand_amount` with the absent-means-zero reading applied.
    pub fn expand_amount_or_zero(&self) -> f64 {
        self.expand_amount.unwrap_or(0.0)
    }
}

impl Timestamped for Segment {
    fn start(&self) -> f64 {
        self.start
    }

    fn end(&self) -> f64 {
        self.end
    }

    fn with_times(&self, start: f64, end: f64) -> Self {
        let mut copy = self.clone();
        copy.start = start;
        copy.end = end;
        copy
    }
}

/// The result of a transcription pass.
///
/// Returned both by [`crate::transcriber::Transcriber`] implementations for a single
/// window (where `language` is the window's detected language) and by the
/// orchestrator for a whole file (where `language` is the vote winner across
/// windows, or empty when nothing was transcribed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<Segment>,
    pub language: String,
}
