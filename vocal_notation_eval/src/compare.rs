// Timeline agreement between an input (reference) and an output (generated)
// document.
//
// Both timelines are padded with `NO_PITCH` to the same length. Steps where
// neither side sings are ignored. Every other step lands in exactly one
// bucket: a match, a pitch the output added where the input is silent, a
// pitch the output dropped, or a pitch-class shift of 0..=11 semitones (0
// meaning same class, different octave). Freestyle steps match any pitch
// on the other side and never reach the shift histogram.

use crate::config::EvaluationConfig;
use crate::datapoints::{FREESTYLE, NO_PITCH, map_to_datapoints};
use crate::error::{EvalError, Result};
use serde::Serialize;
use vocal_notation::NotationDocument;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub steps: usize,
    pub input_pitched: usize,
    pub output_pitched: usize,
    pub matches: usize,
    pub input_match_ratio: f64,
    pub output_match_ratio: f64,
    /// Mismatch counts indexed by `|input mod 12 - output mod 12|`.
    pub pitch_shift_counts: [usize; 12],
    pub input_pitch_shift_ratios: [f64; 12],
    pub output_pitch_shift_ratios: [f64; 12],
    pub pitch_where_should_be_no_pitch: usize,
    /// Relative to the output's pitched steps.
    pub pitch_where_should_be_no_pitch_ratio: f64,
    pub no_pitch_where_should_be_pitch: usize,
    /// Relative to the input's pitched steps.
    pub no_pitch_where_should_be_pitch_ratio: f64,
}

fn pitched(data: &[i32]) -> usize {
    data.iter().filter(|&&p| p != NO_PITCH).count()
}

fn ratio(count: usize, total: usize) -> f64 {
    count as f64 / total as f64
}

pub fn compare_datapoints(input: &[i32], output: &[i32]) -> Result<ComparisonReport> {
    let steps = input.len().max(output.len());
    let at = |data: &[i32], i: usize| data.get(i).copied().unwrap_or(NO_PITCH);

    let input_pitched = pitched(input);
    if input_pitched == 0 {
        return Err(EvalError::NoPitchedDatapoints { side: "input" });
    }
    let output_pitched = pitched(output);
    if output_pitched == 0 {
        return Err(EvalError::NoPitchedDatapoints { side: "output" });
    }

    let mut matches = 0;
    let mut shifts = [0usize; 12];
    let mut added = 0;
    let mut dropped = 0;
    for i in 0..steps {
        let (a, b) = (at(input, i), at(output, i));
        if a == NO_PITCH && b == NO_PITCH {
            continue;
        }
        if a == NO_PITCH {
            added += 1;
        } else if b == NO_PITCH {
            dropped += 1;
        } else if a == b || a == FREESTYLE || b == FREESTYLE {
            // A freestyle step on either side accepts any sung pitch.
            matches += 1;
        } else {
            shifts[(a.rem_euclid(12) - b.rem_euclid(12)).unsigned_abs() as usize] += 1;
        }
    }

    Ok(ComparisonReport {
        steps,
        input_pitched,
        output_pitched,
        matches,
        input_match_ratio: ratio(matches, input_pitched),
        output_match_ratio: ratio(matches, output_pitched),
        pitch_shift_counts: shifts,
        input_pitch_shift_ratios: shifts.map(|n| ratio(n, input_pitched)),
        output_pitch_shift_ratios: shifts.map(|n| ratio(n, output_pitched)),
        pitch_where_should_be_no_pitch: added,
        pitch_where_should_be_no_pitch_ratio: ratio(added, output_pitched),
        no_pitch_where_should_be_pitch: dropped,
        no_pitch_where_should_be_pitch_ratio: ratio(dropped, input_pitched),
    })
}

pub fn compare_documents(
    input: &NotationDocument,
    output: &NotationDocument,
    config: &EvaluationConfig,
) -> Result<ComparisonReport> {
    config.validate()?;
    let report = compare_datapoints(
        &map_to_datapoints(input, config),
        &map_to_datapoints(output, config),
    )?;
    tracing::info!(
        matches = report.matches,
        input_match_ratio = report.input_match_ratio,
        output_match_ratio = report.output_match_ratio,
        "compared documents"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocal_notation::notation::parse;

    const N: i32 = NO_PITCH;

    #[test]
    fn test_buckets_every_pitched_step_once() {
        let input = [5, 5, 5, N, 7, 7, 19];
        let output = [5, 6, N, 4, 7, 10];
        let r = compare_datapoints(&input, &output).unwrap();

        assert_eq!(r.steps, 7);
        assert_eq!(r.matches, 2);
        assert_eq!(r.pitch_shift_counts[1], 1, "5 vs 6");
        assert_eq!(r.pitch_shift_counts[3], 1, "7 vs 10");
        assert_eq!(r.no_pitch_where_should_be_pitch, 2, "5 vs none and padded tail");
        assert_eq!(r.pitch_where_should_be_no_pitch, 1);
        assert_eq!(r.input_pitched, 6);
        assert_eq!(r.output_pitched, 5);
        assert_eq!(r.input_match_ratio, 2.0 / 6.0);
        assert_eq!(r.output_match_ratio, 2.0 / 5.0);
        assert_eq!(r.no_pitch_where_should_be_pitch_ratio, 2.0 / 6.0);
        assert_eq!(r.pitch_where_should_be_no_pitch_ratio, 1.0 / 5.0);
    }

    #[test]
    fn test_octave_shift_lands_in_bucket_zero() {
        let r = compare_datapoints(&[0, 0], &[12, -12]).unwrap();
        assert_eq!(r.matches, 0);
        assert_eq!(r.pitch_shift_counts[0], 2);
        assert_eq!(r.input_pitch_shift_ratios[0], 1.0);
    }

    #[test]
    fn test_freestyle_input_matches_any_output_pitch() {
        let r = compare_datapoints(&[FREESTYLE, FREESTYLE], &[3, N]).unwrap();
        assert_eq!(r.matches, 1);
        assert_eq!(r.no_pitch_where_should_be_pitch, 1);
    }

    #[test]
    fn test_swapping_sides_swaps_the_ratios() {
        let f = FREESTYLE;
        let a = [1, 1, 2, N, 3, 3, 3, N, 9, f, f, 5, 5, N];
        let b = [1, 4, N, 2, 3, 3, 15, N, 9, 4, N, f, f, f];
        let ab = compare_datapoints(&a, &b).unwrap();
        let ba = compare_datapoints(&b, &a).unwrap();

        assert_eq!(ab.matches, 7, "freestyle steps match on either side");
        assert_eq!(ab.matches, ba.matches);
        assert_eq!(ab.pitch_shift_counts, ba.pitch_shift_counts);
        assert_eq!(ab.input_match_ratio, ba.output_match_ratio);
        assert_eq!(ab.pitch_where_should_be_no_pitch, ba.no_pitch_where_should_be_pitch);
        assert_eq!(ab.no_pitch_where_should_be_pitch, ba.pitch_where_should_be_no_pitch);
    }

    #[test]
    fn test_freestyle_output_matches_and_stays_out_of_histogram() {
        let out = compare_datapoints(&[5, 5, 5], &[FREESTYLE; 3]).unwrap();
        let back = compare_datapoints(&[FREESTYLE; 3], &[5, 5, 5]).unwrap();
        assert_eq!(out.matches, 3);
        assert_eq!(out.pitch_shift_counts, [0; 12], "sentinel is not a pitch class");
        assert_eq!(out.matches, back.matches);
        assert_eq!(out.pitch_shift_counts, back.pitch_shift_counts);
    }

    #[test]
    fn test_empty_side_is_an_error() {
        let err = compare_datapoints(&[N, N], &[1]).unwrap_err();
        assert!(matches!(err, EvalError::NoPitchedDatapoints { side: "input" }), "got {err:?}");
        let err = compare_datapoints(&[1], &[]).unwrap_err();
        assert!(matches!(err, EvalError::NoPitchedDatapoints { side: "output" }), "got {err:?}");
    }

    #[test]
    fn test_identical_documents_match_fully() {
        let text = "#BPM:300\n#GAP:250\n: 0 4 5 a\n: 6 3 9 b\n- 10\n* 12 8 2 c\nE\n";
        let doc = parse(text).unwrap();
        let r = compare_documents(&doc, &doc, &EvaluationConfig::default()).unwrap();
        assert_eq!(r.input_match_ratio, 1.0);
        assert_eq!(r.output_match_ratio, 1.0);
        assert_eq!(r.pitch_shift_counts, [0; 12]);
    }

    #[test]
    fn test_transposed_document_shifts_by_interval() {
        let input = parse("#BPM:300\n#GAP:0\n: 0 4 5 a\n: 6 4 9 b\nE\n").unwrap();
        let output = parse("#BPM:300\n#GAP:0\n: 0 4 7 a\n: 6 4 11 b\nE\n").unwrap();
        let r = compare_documents(&input, &output, &EvaluationConfig::default()).unwrap();
        assert_eq!(r.matches, 0);
        assert_eq!(r.pitch_shift_counts[2], r.input_pitched, "whole line up a tone");
    }
}
