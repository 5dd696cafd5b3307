use std::str::FromStr;

use crate::error::Error;

/// Start detected spans this many seconds early by default.
pub const SEGMENT_PADDING_LEFT: f64 = 1.0;

/// End detected spans this many seconds late by default.
pub const SEGMENT_PADDING_RIGHT: f64 = 1.0;

/// Merge spans separated by up to this much silence by default.
pub const MAX_SILENT_PERIOD: f64 = 10.0;

/// Do not grow merged processing windows past this length by default.
pub const MAX_MERGE_SIZE: f64 = 150.0;

/// Prompt carry-over is disabled by default.
pub const MAX_PROMPT_WINDOW: f64 = 0.0;

/// What to do with the non-speech stretches between detected spans.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of the gap policy across
///   library and frontend code.
/// - Using an enum avoids stringly-typed conditionals and keeps the dispatch an
///   exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonSpeechStrategy {
    /// Ignore non-speech stretches entirely.
    #[default]
    Skip,

    /// Turn non-speech stretches into their own synthetic spans, absorbing small
    /// ones into the preceding speech span.
    CreateSegment,

    /// Stretch each speech span forward over the following non-speech, so the
    /// audio between spans is transcribed as part of the preceding span.
    ExpandSegment,
}

impl FromStr for NonSpeechStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "create_segment" => Ok(Self::CreateSegment),
            "expand_segment" => Ok(Self::ExpandSegment),
            other => Err(Error::InvalidStrategy(other.to_owned())),
        }
    }
}

/// Options that control how a transcription is orchestrated.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// Frontends map user input into this type so the library stays reusable outside
/// any particular surface.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Seconds of padding before each detected span. `None` disables left padding.
    ///
    /// Padding never crosses the previous padded span and never goes below 0.
    pub segment_padding_left: Option<f64>,

    /// Seconds of padding after each detected span. `None` disables right padding.
    ///
    /// Padding never crosses the next detected span.
    pub segment_padding_right: Option<f64>,

    /// Merge spans whose gap is at most this many seconds. `None` disables merging
    /// entirely (spans are transcribed exactly as detected and padded).
    pub max_silent_period: Option<f64>,

    /// Stop growing a merged window once it is longer than this. `None` removes the
    /// size cap. Also bounds gap absorption under
    /// [`NonSpeechStrategy::CreateSegment`].
    pub max_merge_size: Option<f64>,

    /// Policy for the non-speech stretches between detected spans.
    pub non_speech_strategy: NonSpeechStrategy,

    /// How many seconds of previously transcribed speech to carry into the next
    /// window as a textual prompt. `0` disables the prompt window.
    pub max_prompt_window: f64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            segment_padding_left: Some(SEGMENT_PADDING_LEFT),
            segment_padding_right: Some(SEGMENT_PADDING_RIGHT),
            max_silent_period: Some(MAX_SILENT_PERIOD),
            max_merge_size: Some(MAX_MERGE_SIZE),
            non_speech_strategy: NonSpeechStrategy::default(),
            max_prompt_window: MAX_PROMPT_WINDOW,
        }
    }
}
