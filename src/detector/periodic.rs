use crate::Result;
use crate::audio::AudioSource;
use crate::detector::SpeechDetector;
use crate::timestamps::TimeSpan;
use crate::vadscribe::MIN_SEGMENT_DURATION;

/// A trivial detector that marks every N seconds as speech.
///
/// Useful when no real VAD is available or wanted: the whole file is transcribed in
/// fixed-length windows. A final window shorter than the minimum segment duration
/// is skipped.
pub struct PeriodicDetector {
    periodic_duration: f64,
}

impl PeriodicDetector {
    pub fn new(periodic_duration: f64) -> Self {
        Self { periodic_duration }
    }
}

impl SpeechDetector for PeriodicDetector {
    fn detect(&mut self, audio: &dyn AudioSource) -> Result<Vec<TimeSpan>> {
        let duration = audio.duration()?;
        let mut result = Vec::new();
        let mut start = 0.0_f64;

        while start < duration {
            let end = (start + self.periodic_duration).min(duration);

            if end - start >= MIN_SEGMENT_DURATION {
                result.push(TimeSpan::new(start, end));
            }

            start = end;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{MemorySource, SAMPLE_RATE};

    fn source_with_seconds(seconds: f64) -> MemorySource {
        MemorySource::from_samples(vec![0.0; (seconds * SAMPLE_RATE as f64) as usize])
    }

    #[test]
    fn emits_fixed_length_spans_covering_the_file() -> anyhow::Result<()> {
        let mut detector = PeriodicDetector::new(5.0);
        let spans = detector.detect(&source_with_seconds(12.0))?;

        let got: Vec<(f64, f64)> = spans.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(got, vec![(0.0, 5.0), (5.0, 10.0), (10.0, 12.0)]);
        Ok(())
    }

    #[test]
    fn skips_a_final_span_shorter_than_one_second() -> anyhow::Result<()> {
        let mut detector = PeriodicDetector::new(5.0);
        let spans = detector.detect(&source_with_seconds(10.5))?;

        let got: Vec<(f64, f64)> = spans.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(got, vec![(0.0, 5.0), (5.0, 10.0)]);
        Ok(())
    }

    #[test]
    fn empty_audio_yields_no_spans() -> anyhow::Result<()> {
        let mut detector = PeriodicDetector::new(5.0);
        assert!(detector.detect(&source_with_seconds(0.0))?.is_empty());
        Ok(())
    }
}
