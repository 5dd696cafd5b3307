//! Audio probing and window decoding.
//!
//! Responsibilities:
//! - Report a source's total duration
//! - Materialize a `[start, start + duration]` window as mono 16 kHz `f32`
//!
//! Two implementations are provided:
//! - [`FfmpegSource`] shells out to `ffprobe`/`ffmpeg` per call, so any container the
//!   decoder handles works and nothing is held in memory between windows
//! - [`MemorySource`] serves windows out of an in-memory buffer (WAV ingestion, tests)

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::wav;

/// The sample rate every window is decoded to (Hz), mono.
pub const SAMPLE_RATE: u32 = 16_000;

/// A source of decodable audio.
///
/// Detectors and the orchestrator only ever see this seam; where the samples come
/// from (a media file behind ffmpeg, a WAV loaded up front, a synthetic test buffer)
/// is the implementation's business.
pub trait AudioSource {
    /// Total duration in seconds.
    fn duration(&self) -> Result<f64>;

    /// Decode a window into mono [`SAMPLE_RATE`] `f32` samples in `[-1, 1]`.
    ///
    /// `start` and `duration` are in seconds; `None` means "from the beginning" and
    /// "to the end" respectively.
    fn load(&self, start: Option<f64>, duration: Option<f64>) -> Result<Vec<f32>>;
}

/// An audio file decoded on demand by the ffmpeg CLI.
///
/// Every [`AudioSource::load`] call spawns one decoder subprocess with the window
/// expressed as input-side `-ss`/`-t` options, which keeps peak memory bounded by
/// the window size regardless of file length. Decoder failures surface as
/// [`Error::AudioLoad`] carrying the subprocess stderr verbatim.
#[derive(Debug, Clone)]
pub struct FfmpegSource {
    path: PathBuf,
}

impl FfmpegSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioSource for FfmpegSource {
    fn duration(&self) -> Result<f64> {
        let output = Command::new("ffprobe")
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg(&self.path)
            .output()?;

        if !output.status.success() {
            return Err(Error::AudioLoad {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        parse_probed_duration(&output.stdout)
    }

    fn load(&self, start: Option<f64>, duration: Option<f64>) -> Result<Vec<f32>> {
        let output = Command::new("ffmpeg")
            .args(decode_args(&self.path, start, duration))
            .output()?;

        if !output.status.success() {
            return Err(Error::AudioLoad {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(pcm_s16le_to_f32(&output.stdout))
    }
}

/// Argument list for one decode window.
///
/// `-ss`/`-t` are input options (before `-i`) so ffmpeg seeks instead of decoding
/// and discarding the prefix. Output is signed 16-bit little-endian PCM, downmixed
/// to mono and resampled to [`SAMPLE_RATE`], on stdout.
fn decode_args(path: &Path, start: Option<f64>, duration: Option<f64>) -> Vec<String> {
    let mut args: Vec<String> = vec!["-nostdin".into(), "-threads".into(), "0".into()];

    if let Some(start) = start {
        args.push("-ss".into());
        args.push(start.to_string());
    }
    if let Some(duration) = duration {
        args.push("-t".into());
        args.push(duration.to_string());
    }

    args.push("-i".into());
    args.push(path.to_string_lossy().into_owned());

    args.extend(
        [
            "-f",
            "s16le",
            "-acodec",
            "pcm_s16le",
            "-ac",
            "1",
            "-ar",
            "16000",
            "-",
        ]
        .iter()
        .map(|s| (*s).to_owned()),
    );

    args
}

/// Pull `format.duration` out of `ffprobe -print_format json -show_format` output.
fn parse_probed_duration(stdout: &[u8]) -> Result<f64> {
    let probed: Value = serde_json::from_slice(stdout)?;

    let duration = probed
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .ok_or_else(|| Error::msg("ffprobe output had no format.duration"))?;

    duration
        .parse::<f64>()
        .map_err(|_| Error::msg(format!("ffprobe returned unparseable duration '{duration}'")))
}

/// Convert raw s16le PCM bytes to `f32` samples in `[-1, 1]`.
///
/// A trailing odd byte (truncated decoder output) is dropped.
fn pcm_s16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32_768.0)
        .collect()
}

/// Audio held fully in memory at [`SAMPLE_RATE`], mono.
///
/// Windows are served by slicing, with out-of-range requests clamped to the buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<f32>,
}

impl MemorySource {
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Load a mono 16 kHz WAV file fully into memory.
    pub fn from_wav_file(path: impl AsRef<Path>) -> Result<Self> {
        let samples = wav::read_mono_16k(path.as_ref())?;
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl AudioSource for MemorySource {
    fn duration(&self) -> Result<f64> {
        Ok(self.samples.len() as f64 / SAMPLE_RATE as f64)
    }

    fn load(&self, start: Option<f64>, duration: Option<f64>) -> Result<Vec<f32>> {
        let rate = SAMPLE_RATE as f64;

        let first = start.map_or(0, |s| (s * rate).round() as usize);
        let first = first.min(self.samples.len());

        let last = duration.map_or(self.samples.len(), |d| {
            first + (d * rate).round() as usize
        });
        let last = last.min(self.samples.len());

        Ok(self.samples[first..last].to_vec())
    }
}
