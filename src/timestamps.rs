//! Interval algebra over detected speech timestamps.
//!
//! Everything in this module is a pure transformation over lists of [`TimeSpan`]s:
//! - scale sample-indexed detector output into seconds (`multiply_timestamps`)
//! - rebase local times into global times (`adjust_timestamps`)
//! - pad detected spans without crossing their neighbors (`pad_timestamps`)
//! - merge nearby spans under a regular and a force regime (`merge_timestamps`)
//! - expand or fill the non-speech gaps between spans (`expand_gaps`, `fill_gaps`,
//!   `include_gaps`)
//!
//! Input lists are never mutated; every transform returns a fresh list. After the
//! pad → merge → gap-strategy sequence the output is sorted by start and
//! non-overlapping, which [`crate::vadscribe`] verifies before transcribing.

use crate::error::{Error, Result};

/// A half-open time interval in fractional seconds.
///
/// `expand_amount` records how many seconds of the tail are synthetic padding added
/// by a gap transform rather than detected speech; `gap` marks spans that are entirely
/// synthetic non-speech. Both default to "not expanded, not a gap".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
    pub gap: bool,
    pub expand_amount: f64,
}

impl TimeSpan {
    /// A detected speech span.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            gap: false,
            expand_amount: 0.0,
        }
    }

    /// A synthetic non-speech span.
    pub fn gap(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            gap: true,
            expand_amount: 0.0,
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Anything with rewritable start/end times in seconds.
///
/// Lets [`adjust_timestamps`] rebase both detector spans and transcriber segments
/// while preserving every other field of the entry.
pub trait Timestamped: Clone {
    fn start(&self) -> f64;
    fn end(&self) -> f64;

    /// A copy of `self` with the endpoints rewritten and all other fields preserved.
    fn with_times(&self, start: f64, end: f64) -> Self;
}

impl Timestamped for TimeSpan {
    fn start(&self) -> f64 {
        self.start
    }

    fn end(&self) -> f64 {
        self.end
    }

    fn with_times(&self, start: f64, end: f64) -> Self {
        Self { start, end, ..*self }
    }
}

/// Scale every span by `factor`.
///
/// Used to convert sample-indexed detector output into seconds
/// (`factor = 1 / sampling_rate`). Returns bare spans; detector output carries no
/// attributes worth preserving.
pub fn multiply_timestamps(spans: &[TimeSpan], factor: f64) -> Vec<TimeSpan> {
    spans
        .iter()
        .map(|span| TimeSpan::new(span.start * factor, span.end * factor))
        .collect()
}

/// Shift every entry by `adjust_seconds`, optionally bounded by `max_source_time`.
///
/// When `max_source_time` is set, entries starting past it are dropped and ends are
/// clamped to it before the shift. Each surviving entry is copied with only its
/// endpoints rewritten, so segment text, probabilities, and expand amounts pass
/// through untouched.
pub fn adjust_timestamps<T: Timestamped>(
    items: &[T],
    adjust_seconds: f64,
    max_source_time: Option<f64>,
) -> Vec<T> {
    let mut result = Vec::with_capacity(items.len());

    for item in items {
        let start = item.start();
        let mut end = item.end();

        if let Some(max) = max_source_time {
            if start > max {
                continue;
            }
            end = end.min(max);
        }

        result.push(item.with_times(start + adjust_seconds, end + adjust_seconds));
    }

    result
}

/// Pad each span left and right without crossing its neighbors.
///
/// The left pad never reaches below 0 or into the *padded* previous span; the right
/// pad never reaches into the *raw* next span. A `None` pad disables that side.
/// Both pads zero is a no-op (zero pads can never cross a neighbor, so returning
/// the input unchanged is observationally equivalent to clamping).
pub fn pad_timestamps(
    spans: &[TimeSpan],
    padding_left: Option<f64>,
    padding_right: Option<f64>,
) -> Vec<TimeSpan> {
    if padding_left.unwrap_or(0.0) == 0.0 && padding_right.unwrap_or(0.0) == 0.0 {
        return spans.to_vec();
    }

    let mut result: Vec<TimeSpan> = Vec::with_capacity(spans.len());

    for (i, span) in spans.iter().enumerate() {
        let mut start = span.start;
        let mut end = span.end;

        if let Some(pad) = padding_left {
            let floor = result.last().map_or(0.0, |prev| prev.end);
            start = (start - pad).max(floor);
        }

        if let Some(pad) = padding_right {
            end += pad;

            // Do not pad past the next raw span.
            if let Some(next) = spans.get(i + 1) {
                end = end.min(next.start);
            }
        }

        result.push(TimeSpan::new(start, end));
    }

    result
}

/// Merge nearby spans into larger processing windows.
///
/// A running span absorbs the next span's end under either regime:
/// - *regular*: the gap is at most `max_merge_gap` and the running span is no longer
///   than `max_merge_size` (when set);
/// - *force*: the gap is at most `min_force_merge_gap` and the running span is no
///   longer than `max_force_merge_size` (when set), tried only after the regular
///   regime declines.
///
/// The gap may be negative on overlap, which still merges. `max_merge_gap = None`
/// disables merging entirely and returns the input unchanged.
pub fn merge_timestamps(
    spans: &[TimeSpan],
    max_merge_gap: Option<f64>,
    max_merge_size: Option<f64>,
    min_force_merge_gap: Option<f64>,
    max_force_merge_size: Option<f64>,
) -> Vec<TimeSpan> {
    let Some(max_merge_gap) = max_merge_gap else {
        return spans.to_vec();
    };

    let mut result = Vec::with_capacity(spans.len());
    let mut current: Option<TimeSpan> = None;

    for &span in spans {
        let Some(mut running) = current else {
            current = Some(span);
            continue;
        };

        let distance = span.start - running.end;
        let size = running.end - running.start;

        let regular = distance <= max_merge_gap && max_merge_size.is_none_or(|max| size <= max);
        let force = !regular
            && min_force_merge_gap.is_some_and(|min| distance <= min)
            && max_force_merge_size.is_none_or(|max| size <= max);

        if regular || force {
            running.end = span.end;
            current = Some(running);
        } else {
            result.push(running);
            current = Some(span);
        }
    }

    if let Some(running) = current {
        result.push(running);
    }

    result
}

/// Stretch each span's end forward to the start of the next span.
///
/// Prepends a synthetic gap covering `[0, first.start)` when the list doesn't start
/// at zero, and accounts every stretched second in `expand_amount`. When
/// `total_duration` is set and the final span ends early, its end is raised to the
/// total duration; that terminal stretch is *not* counted as expansion (there is no
/// later speech to debit it against).
pub fn expand_gaps(spans: &[TimeSpan], total_duration: Option<f64>) -> Vec<TimeSpan> {
    let mut result = Vec::with_capacity(spans.len() + 1);

    let Some(first) = spans.first() else {
        return result;
    };

    if first.start > 0.0 {
        result.push(TimeSpan::gap(0.0, first.start));
    }

    for pair in spans.windows(2) {
        let (mut current, next) = (pair[0], pair[1]);
        let delta = next.start - current.end;

        if delta >= 0.0 {
            current.expand_amount += delta;
            current.end = next.start;
        }

        result.push(current);
    }

    result.push(spans[spans.len() - 1]);

    if let Some(total) = total_duration
        && let Some(&last) = result.last()
        && last.end < total
    {
        let idx = result.len() - 1;
        result[idx].end = total;
    }

    result
}

/// Fill the gaps between spans, absorbing small ones into the preceding span.
///
/// A gap no longer than `max_expand_size` is absorbed into the span before it
/// (accounted in `expand_amount`); larger gaps become explicit synthetic spans.
/// With `max_expand_size = None` nothing is absorbed and every gap is explicit.
/// Leading (before the first span) and trailing (after the last, up to
/// `total_duration`) gaps are handled the same way.
pub fn fill_gaps(
    spans: &[TimeSpan],
    total_duration: Option<f64>,
    max_expand_size: Option<f64>,
) -> Vec<TimeSpan> {
    let mut result = Vec::with_capacity(spans.len() * 2);

    let Some(first) = spans.first() else {
        return result;
    };

    if first.start > 0.0 {
        result.push(TimeSpan::gap(0.0, first.start));
    }

    for pair in spans.windows(2) {
        let (mut current, next) = (pair[0], pair[1]);
        let delta = next.start - current.end;
        let absorbed = matches!(max_expand_size, Some(max) if delta <= max);

        if absorbed {
            current.expand_amount += delta;
            current.end = next.start;
        }

        result.push(current);

        if delta >= 0.0 && !absorbed {
            result.push(TimeSpan::gap(current.end, next.start));
        }
    }

    result.push(spans[spans.len() - 1]);

    if let Some(total) = total_duration
        && let Some(&last) = result.last()
    {
        let delta = total - last.end;

        if delta > 0.0 {
            if matches!(max_expand_size, Some(max) if delta <= max) {
                let idx = result.len() - 1;
                result[idx].expand_amount += delta;
                result[idx].end = total;
            } else {
                result.push(TimeSpan::gap(last.end, total));
            }
        }
    }

    result
}

/// Interleave explicit gap spans between spans, without absorbing anything.
///
/// A gap is emitted only when it is at least `min_gap_length` long (always, when
/// `None`). The trailing gap runs from the last span's *end* to `total_duration`.
pub fn include_gaps(
    spans: &[TimeSpan],
    min_gap_length: Option<f64>,
    total_duration: Option<f64>,
) -> Vec<TimeSpan> {
    let mut result = Vec::with_capacity(spans.len() * 2);
    let mut last_end = 0.0_f64;

    for &span in spans {
        let delta = span.start - last_end;

        if delta > 0.0 && min_gap_length.is_none_or(|min| delta >= min) {
            result.push(TimeSpan::gap(last_end, span.start));
        }

        last_end = span.end;
        result.push(span);
    }

    if let Some(total) = total_duration
        && last_end < total
    {
        let delta = total - last_end;

        if min_gap_length.is_none_or(|min| delta >= min) {
            result.push(TimeSpan::gap(last_end, total));
        }
    }

    result
}

/// Reject inverted or non-finite spans.
///
/// Run by the orchestrator after normalization; a failure here is a programmer
/// error in a detector or transform, not a recoverable condition.
pub fn validate_timestamps(spans: &[TimeSpan]) -> Result<()> {
    for span in spans {
        if !span.start.is_finite() || !span.end.is_finite() || span.start > span.end {
            return Err(Error::InvalidInterval {
                start: span.start,
                end: span.end,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(raw: &[(f64, f64)]) -> Vec<TimeSpan> {
        raw.iter().map(|&(s, e)| TimeSpan::new(s, e)).collect()
    }

    fn endpoints(spans: &[TimeSpan]) -> Vec<(f64, f64)> {
        spans.iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn multiply_scales_both_endpoints() {
        let input = spans(&[(16_000.0, 32_000.0), (48_000.0, 64_000.0)]);
        let scaled = multiply_timestamps(&input, 1.0 / 16_000.0);
        assert_eq!(endpoints(&scaled), vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn multiply_composes_linearly() {
        let input = spans(&[(1.0, 2.0), (5.0, 8.0)]);
        let twice = multiply_timestamps(&multiply_timestamps(&input, 2.0), 3.0);
        let once = multiply_timestamps(&input, 6.0);
        assert_eq!(twice, once);
    }

    #[test]
    fn adjust_shifts_and_preserves_attributes() {
        let mut span = TimeSpan::gap(1.0, 2.0);
        span.expand_amount = 0.5;

        let shifted = adjust_timestamps(&[span], 10.0, None);
        assert_eq!(shifted.len(), 1);
        assert_eq!(shifted[0].start, 11.0);
        assert_eq!(shifted[0].end, 12.0);
        assert!(shifted[0].gap);
        assert_eq!(shifted[0].expand_amount, 0.5);
    }

    #[test]
    fn adjust_drops_entries_past_max_source_time_and_clamps_ends() {
        let input = spans(&[(0.0, 4.0), (3.0, 7.0), (6.0, 8.0)]);
        let adjusted = adjust_timestamps(&input, 100.0, Some(5.0));
        assert_eq!(endpoints(&adjusted), vec![(100.0, 104.0), (103.0, 105.0)]);
    }

    #[test]
    fn adjust_composes_linearly_without_clamping() {
        let input = spans(&[(1.0, 2.0), (4.0, 9.0)]);
        let twice = adjust_timestamps(&adjust_timestamps(&input, 3.0, None), 4.0, None);
        let once = adjust_timestamps(&input, 7.0, None);
        assert_eq!(twice, once);
    }

    #[test]
    fn padding_is_clamped_by_neighbors() {
        let input = spans(&[(5.0, 6.0), (6.5, 7.0)]);
        let padded = pad_timestamps(&input, Some(2.0), Some(2.0));
        assert_eq!(endpoints(&padded), vec![(3.0, 6.5), (6.5, 9.0)]);
    }

    #[test]
    fn padding_never_goes_below_zero() {
        let input = spans(&[(0.5, 1.0)]);
        let padded = pad_timestamps(&input, Some(2.0), None);
        assert_eq!(endpoints(&padded), vec![(0.0, 1.0)]);
    }

    #[test]
    fn padding_with_both_sides_zero_returns_input_unchanged() {
        let input = spans(&[(5.0, 6.0), (6.5, 7.0)]);
        let padded = pad_timestamps(&input, Some(0.0), None);
        assert_eq!(padded, input);
    }

    #[test]
    fn one_sided_padding_leaves_the_other_side_alone() {
        let input = spans(&[(5.0, 6.0), (9.0, 10.0)]);
        let padded = pad_timestamps(&input, None, Some(1.0));
        assert_eq!(endpoints(&padded), vec![(5.0, 7.0), (9.0, 11.0)]);
    }

    #[test]
    fn merge_applies_regular_and_force_regimes() {
        // First gap (0.3) exceeds the regular gap and the running span (length 10)
        // exceeds the force size cap of 5 * 1.5 = 7.5, so no merge. Second gap (0.4)
        // force-merges because the running span is only 1.7 long.
        let input = spans(&[(0.0, 10.0), (10.3, 12.0), (12.4, 13.0)]);
        let merged = merge_timestamps(&input, Some(0.1), Some(5.0), Some(0.5), Some(7.5));
        assert_eq!(endpoints(&merged), vec![(0.0, 10.0), (10.3, 13.0)]);
    }

    #[test]
    fn merge_is_idempotent() {
        let input = spans(&[(0.0, 1.0), (1.5, 3.0), (20.0, 21.0), (21.2, 22.0)]);
        let once = merge_timestamps(&input, Some(1.0), Some(10.0), Some(0.5), Some(15.0));
        let twice = merge_timestamps(&once, Some(1.0), Some(10.0), Some(0.5), Some(15.0));
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_without_gap_limit_returns_input_unchanged() {
        let input = spans(&[(0.0, 1.0), (5.0, 6.0)]);
        let merged = merge_timestamps(&input, None, Some(1.0), Some(0.5), None);
        assert_eq!(merged, input);
    }

    #[test]
    fn merge_joins_overlapping_spans() {
        let input = spans(&[(0.0, 5.0), (4.0, 6.0)]);
        let merged = merge_timestamps(&input, Some(1.0), None, Some(0.5), None);
        assert_eq!(endpoints(&merged), vec![(0.0, 6.0)]);
    }

    #[test]
    fn expand_gaps_stretches_into_following_silence() {
        let input = spans(&[(1.0, 2.0), (3.0, 4.0)]);
        let expanded = expand_gaps(&input, Some(10.0));

        assert_eq!(
            endpoints(&expanded),
            vec![(0.0, 1.0), (1.0, 3.0), (3.0, 10.0)]
        );
        assert!(expanded[0].gap);
        assert_eq!(expanded[1].expand_amount, 1.0);
        // The terminal stretch to the total duration is not counted as expansion.
        assert_eq!(expanded[2].expand_amount, 0.0);
    }

    #[test]
    fn expand_gaps_of_empty_list_is_empty() {
        assert!(expand_gaps(&[], Some(10.0)).is_empty());
    }

    #[test]
    fn expand_gaps_single_span_reaches_total_duration() {
        let input = spans(&[(0.0, 2.0)]);
        let expanded = expand_gaps(&input, Some(5.0));
        assert_eq!(endpoints(&expanded), vec![(0.0, 5.0)]);
    }

    #[test]
    fn fill_gaps_absorbs_small_gaps_and_inserts_large_ones() {
        let input = spans(&[(1.0, 2.0), (3.0, 4.0), (10.0, 11.0)]);
        let filled = fill_gaps(&input, Some(12.0), Some(2.0));

        assert_eq!(
            endpoints(&filled),
            vec![(0.0, 1.0), (1.0, 3.0), (3.0, 4.0), (4.0, 10.0), (10.0, 12.0)]
        );
        assert!(filled[0].gap);
        assert_eq!(filled[1].expand_amount, 1.0);
        assert!(filled[3].gap);
        assert_eq!(filled[4].expand_amount, 1.0);
    }

    #[test]
    fn fill_gaps_without_absorption_inserts_every_gap() {
        let input = spans(&[(1.0, 2.0), (3.0, 4.0)]);
        let filled = fill_gaps(&input, Some(6.0), None);

        assert_eq!(
            endpoints(&filled),
            vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0), (3.0, 4.0), (4.0, 6.0)]
        );
        assert!(filled[0].gap);
        assert!(filled[2].gap);
        assert!(filled[4].gap);
    }

    #[test]
    fn fill_gaps_absorbs_trailing_gap_when_small_enough() {
        let input = spans(&[(0.0, 4.0)]);
        let filled = fill_gaps(&input, Some(5.0), Some(2.0));

        assert_eq!(endpoints(&filled), vec![(0.0, 5.0)]);
        assert_eq!(filled[0].expand_amount, 1.0);
    }

    #[test]
    fn include_gaps_respects_min_gap_length() {
        let input = spans(&[(1.0, 2.0), (2.5, 3.0), (8.0, 9.0)]);
        let with_gaps = include_gaps(&input, Some(1.0), Some(9.0));

        assert_eq!(
            endpoints(&with_gaps),
            vec![(0.0, 1.0), (1.0, 2.0), (2.5, 3.0), (3.0, 8.0), (8.0, 9.0)]
        );
    }

    #[test]
    fn include_gaps_trailing_gap_runs_from_last_end() {
        let input = spans(&[(1.0, 2.0)]);
        let with_gaps = include_gaps(&input, None, Some(10.0));

        assert_eq!(
            endpoints(&with_gaps),
            vec![(0.0, 1.0), (1.0, 2.0), (2.0, 10.0)]
        );
        assert!(with_gaps[2].gap);
    }

    #[test]
    fn validate_accepts_well_formed_and_rejects_inverted() {
        assert!(validate_timestamps(&spans(&[(0.0, 1.0), (1.0, 1.0)])).is_ok());

        let err = validate_timestamps(&spans(&[(2.0, 1.0)])).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::InvalidInterval { start, end } if start == 2.0 && end == 1.0
        ));
    }

    #[test]
    fn validate_rejects_nan() {
        assert!(validate_timestamps(&spans(&[(f64::NAN, 1.0)])).is_err());
    }
}
