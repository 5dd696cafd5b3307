//! High-level orchestration: detection → interval algebra → transcription.
//!
//! Provides the single ergonomic entry point (`Vadscribe`) that wires a speech
//! detector, the timestamp transforms, and a caller-supplied transcriber into one
//! `transcribe` call per audio source.
//!
//! The intent is:
//! - Construct once with a detector (often expensive to build) and options.
//! - Reuse across many inputs; each call is self-contained.
//! - Keep the lower-level pieces (timestamp algebra, detectors, audio sources)
//!   testable in their own modules.
//!
//! Execution is strictly sequential on purpose: the textual prompt carried into
//! window *k* is assembled from the completed results of windows *< k*, so windows
//! cannot be transcribed in parallel without changing observable prompts.

use std::collections::VecDeque;

use tracing::debug;

use crate::audio::AudioSource;
use crate::detector::SpeechDetector;
use crate::error::Result;
use crate::opts::{NonSpeechStrategy, Opts};
use crate::segments::{Segment, Transcription};
use crate::timefmt::format_timestamp;
use crate::timestamps::{
    adjust_timestamps, expand_gaps, fill_gaps, merge_timestamps, pad_timestamps,
    validate_timestamps,
};
use crate::transcriber::Transcriber;

/// Skip detected spans shorter than this (seconds); the transcriber is never
/// invoked for them.
pub const MIN_SEGMENT_DURATION: f64 = 1.0;

/// Merge spans closer together than this (seconds) even when the regular size cap
/// has been reached, up to the force cap.
pub const MIN_FORCE_MERGE_GAP: f64 = 0.5;

/// The force-merge size cap is the regular size cap times this.
pub const FORCE_MERGE_SEGMENT_MULTIPLIER: f64 = 1.5;

/// Segments with a higher no-speech probability never enter the prompt window.
pub const PROMPT_NO_SPEECH_PROB: f64 = 0.1;

/// The main orchestration entry point.
///
/// `Vadscribe` owns the long-lived pieces:
/// - a [`SpeechDetector`] (which may hold a loaded neural model)
/// - the normalization [`Opts`]
///
/// Typical usage:
/// - Construct once.
/// - Call [`Vadscribe::transcribe`] many times with different sources and
///   transcribers.
pub struct Vadscribe<D> {
    detector: D,
    opts: Opts,
}

impl<D: SpeechDetector> Vadscribe<D> {
    pub fn new(detector: D, opts: Opts) -> Self {
        Self { detector, opts }
    }

    /// Access the configured detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Access the configured detector mutably.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Transcribe an audio source through the configured detector and the supplied
    /// transcriber.
    ///
    /// The detector's raw intervals are padded, merged under the regular and force
    /// regimes, and run through the configured non-speech strategy; each surviving
    /// window is decoded, transcribed with the current prompt, and its segments
    /// rebased into global time. Languages are aggregated by vote (first seen wins
    /// ties). An empty detection yields an empty result with `language == ""`
    /// without invoking the transcriber.
    ///
    /// Any collaborator failure aborts the call; no partial result is returned.
    pub fn transcribe<T: Transcriber>(
        &mut self,
        audio: &dyn AudioSource,
        transcriber: &mut T,
    ) -> Result<Transcription> {
        let mut raw = self.detector.detect(audio)?;

        // Detectors may return intervals in any order; padding and merging walk the
        // list in array order and require it start-sorted. The sort is stable so
        // equal starts keep their detector order.
        raw.sort_by(|a, b| a.start.total_cmp(&b.start));

        let padded = pad_timestamps(
            &raw,
            self.opts.segment_padding_left,
            self.opts.segment_padding_right,
        );
        let max_force_merge_size = self
            .opts
            .max_merge_size
            .map(|size| size * FORCE_MERGE_SEGMENT_MULTIPLIER);
        let mut merged = merge_timestamps(
            &padded,
            self.opts.max_silent_period,
            self.opts.max_merge_size,
            Some(MIN_FORCE_MERGE_GAP),
            max_force_merge_size,
        );

        debug!(spans = ?merged, "normalized timestamps");

        if self.opts.non_speech_strategy != NonSpeechStrategy::Skip {
            let total_duration = audio.duration()?;

            merged = match self.opts.non_speech_strategy {
                NonSpeechStrategy::Skip => merged,
                NonSpeechStrategy::CreateSegment => {
                    fill_gaps(&merged, Some(total_duration), self.opts.max_merge_size)
                }
                NonSpeechStrategy::ExpandSegment => expand_gaps(&merged, Some(total_duration)),
            };

            debug!(spans = ?merged, "transcribing non-speech");
        }

        validate_timestamps(&merged)?;

        let mut result = Transcription::default();
        let mut language_votes: Vec<(String, usize)> = Vec::new();
        let mut prompt_window: VecDeque<Segment> = VecDeque::new();

        for span in &merged {
            let span_duration = span.end - span.start;

            if span_duration < MIN_SEGMENT_DURATION {
                continue;
            }

            let samples = audio.load(Some(span.start), Some(span_duration))?;

            let prompt = if prompt_window.is_empty() {
                None
            } else {
                let texts: Vec<&str> = prompt_window.iter().map(|s| s.text.as_str()).collect();
                Some(texts.join(" "))
            };

            debug!(
                from = %format_timestamp(span.start),
                to = %format_timestamp(span.end),
                duration = span_duration,
                expanded = span.expand_amount,
                prompt = prompt.as_deref().unwrap_or(""),
                "transcribing window"
            );

            let window = transcriber.transcribe(&samples, prompt.as_deref())?;

            let mut rebased = adjust_timestamps(&window.segments, span.start, Some(span_duration));

            // Mark how much of each sub-segment's tail lies past the originally
            // detected speech, inside the window's synthetic expansion.
            if span.expand_amount > 0.0 {
                let speech_end = span.start + span_duration - span.expand_amount;

                for segment in &mut rebased {
                    if segment.end > speech_end {
                        segment.expand_amount = Some(segment.end - speech_end);
                    }
                }
            }

            result.text.push_str(&window.text);
            result.segments.extend(rebased.iter().cloned());

            record_vote(&mut language_votes, &window.language);

            self.update_prompt_window(&mut prompt_window, &rebased, span.end);
        }

        if let Some(language) = winning_language(&language_votes) {
            result.language = language.to_owned();
        }

        Ok(result)
    }

    /// Admit this window's segments into the prompt FIFO, then evict from the front
    /// everything whose real speech content has slipped out of the trailing window.
    ///
    /// Time a segment spent in synthetic expansion is discounted, so padding never
    /// keeps a segment alive longer than its actual speech would.
    fn update_prompt_window(
        &self,
        window: &mut VecDeque<Segment>,
        rebased: &[Segment],
        span_end: f64,
    ) {
        if self.opts.max_prompt_window <= 0.0 {
            return;
        }

        for segment in rebased {
            if segment.no_speech_prob_or_zero() <= PROMPT_NO_SPEECH_PROB {
                window.push_back(segment.clone());
            }
        }

        while let Some(front) = window.front() {
            let real_end = front.end - front.expand_amount_or_zero();

            if real_end < span_end - self.opts.max_prompt_window {
                window.pop_front();
            } else {
                break;
            }
        }
    }
}

fn record_vote(votes: &mut Vec<(String, usize)>, language: &str) {
    if let Some(entry) = votes.iter_mut().find(|(l, _)| l == language) {
        entry.1 += 1;
    } else {
        votes.push((language.to_owned(), 1));
    }
}

/// Argmax over the votes; earlier-seen languages win ties (insertion order is
/// preserved by the vote list, and only strictly greater counts displace the
/// current winner).
fn winning_language(votes: &[(String, usize)]) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;

    for (language, count) in votes {
        if best.is_none_or(|(_, c)| *count > c) {
            best = Some((language, *count));
        }
    }

    best.map(|(language, _)| language)
}
