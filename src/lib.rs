//! `vadscribe` is voice-activity-driven transcription orchestration.
//!
//! This crate decides *which intervals of a long audio file to transcribe*, *in
//! what order*, *with what carried-over textual context*, and *how to stitch the
//! per-window results back into one global transcription*. It provides:
//! - Pure interval algebra over detected speech timestamps (pad, merge, gap
//!   strategies, rebasing)
//! - Pluggable speech detectors (periodic, Silero-backed) over a pluggable audio
//!   source (ffmpeg subprocess or in-memory)
//! - A sequential orchestrator maintaining a sliding textual prompt window and a
//!   per-file language vote
//!
//! Speech-to-text itself stays behind the [`transcriber::Transcriber`] callback;
//! the library is transcriber-agnostic by design.

// Audio probing and window decoding.
pub mod audio;
pub mod wav;

// Speech detection (trait + periodic and Silero-backed implementations).
pub mod detector;

// Pure interval algebra and timestamp formatting.
pub mod timefmt;
pub mod timestamps;

// Segment/result data structures and the transcriber seam.
pub mod segments;
pub mod transcriber;

// Orchestration and its configuration.
pub mod opts;
pub mod vadscribe;

// Logging configuration and control.
pub mod logging;

mod error;

pub use error::{Error, Result};
