// Pitch scoring of a notation document against a measured pitch curve.
//
// Every scorable note line (non-empty lyric, not freestyle) is cut into
// fixed steps (0.09 s by default; the last step ends exactly at the line
// end). Each step gets its own dominant note from the curve, the same way
// the writer picked the line's note in the first place. Two scores come out:
//
// - simple: a step matches when its pitch class equals the line's
//   (octave errors forgiven)
// - accurate: a step matches only on the exact note
//
// Matched steps earn points by line kind (normal/rap 1, golden 2). A line
// whose every step matched earns a share of the line bonus. Folding line
// outcomes into `Points` is pure; `Points::score` maps the totals onto the
// 10000-point scale the game displays.

use crate::config::ScoringConfig;
use crate::error::{NotationError, Result};
use crate::notation::{NotationDocument, NoteKind, NoteLine};
use crate::pitch::PitchCurve;
use crate::segment::SegmentBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Guards `floor(duration / step)` against `0.9 / 0.09 = 9.999...`.
const STEP_EPSILON: f64 = 1e-9;

/// Raw counters accumulated over all lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Points {
    pub notes: u32,
    pub golden_notes: u32,
    pub rap: u32,
    pub golden_rap: u32,
    pub line_bonus: f64,
    pub sampled_parts: u32,
}

/// What one line contributed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOutcome {
    pub kind: NoteKind,
    pub sampled_parts: u32,
    pub matched_parts: u32,
    pub line_bonus_share: f64,
}

impl Points {
    pub fn accumulate(mut self, outcome: &LineOutcome) -> Points {
        let earned = outcome.matched_parts * outcome.kind.weight();
        match outcome.kind {
            NoteKind::Normal => self.notes += earned,
            NoteKind::Golden => self.golden_notes += earned,
            NoteKind::Rap => self.rap += earned,
            NoteKind::RapGolden => self.golden_rap += earned,
            NoteKind::Freestyle => return self,
        }
        self.sampled_parts += outcome.sampled_parts;
        if outcome.sampled_parts > 0 && outcome.matched_parts >= outcome.sampled_parts {
            self.line_bonus += outcome.line_bonus_share;
        }
        self
    }

    pub fn score(&self, max_song_score: u32, line_bonus_budget: u32) -> Score {
        let max_score = if self.line_bonus == 0.0 {
            max_song_score
        } else {
            max_song_score.saturating_sub(line_bonus_budget)
        };
        let notes = if self.sampled_parts == 0 {
            0
        } else {
            (max_score as f64 * (self.notes + self.rap) as f64 / self.sampled_parts as f64).round()
                as u32
        };
        let golden = self.golden_notes + self.golden_rap;
        let line_bonus = self.line_bonus.round() as u32;
        Score {
            max_score,
            notes,
            golden,
            line_bonus,
            total: notes + line_bonus + golden,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub max_score: u32,
    pub notes: u32,
    pub golden: u32,
    pub line_bonus: u32,
    pub total: u32,
}

impl Score {
    /// Text appended to a document's `#COMMENT:` value.
    pub fn comment_suffix(&self) -> String {
        format!(" | Score: {self}")
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total: {}, notes: {} line: {}, golden: {}",
            self.total, self.notes, self.line_bonus, self.golden
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub simple: Score,
    pub accurate: Score,
    pub simple_points: Points,
    pub accurate_points: Points,
}

/// Number of scoring steps in a line: `max(1, floor(duration / step))`.
pub fn step_count(duration: f64, step: f64) -> u32 {
    ((duration / step + STEP_EPSILON).floor().max(1.0)) as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCalculator {
    config: ScoringConfig,
    builder: SegmentBuilder,
}

impl ScoreCalculator {
    pub fn new(config: &ScoringConfig, builder: SegmentBuilder) -> Self {
        ScoreCalculator {
            config: config.clone(),
            builder,
        }
    }

    pub fn score(&self, doc: &NotationDocument, curve: &PitchCurve) -> Result<ScoreCard> {
        if doc.lines.is_empty() {
            return Err(NotationError::EmptyDocument);
        }
        if curve.is_empty() {
            return Err(NotationError::EmptyPitchCurve);
        }
        let share = self.config.line_bonus_budget as f64 / doc.lines.len() as f64;

        let outcomes = doc
            .lines
            .iter()
            .filter(|line| line.kind != NoteKind::Freestyle && !line.lyric.trim().is_empty())
            .map(|line| self.evaluate_line(line, curve, share))
            .collect::<Result<Vec<_>>>()?;

        let simple_points = outcomes
            .iter()
            .fold(Points::default(), |points, (simple, _)| points.accumulate(simple));
        let accurate_points = outcomes
            .iter()
            .fold(Points::default(), |points, (_, accurate)| points.accumulate(accurate));

        let max = self.config.max_song_score;
        let budget = self.config.line_bonus_budget;
        let card = ScoreCard {
            simple: simple_points.score(max, budget),
            accurate: accurate_points.score(max, budget),
            simple_points,
            accurate_points,
        };
        tracing::debug!(
            scored_lines = outcomes.len(),
            simple = card.simple.total,
            accurate = card.accurate.total,
            "scored document"
        );
        Ok(card)
    }

    /// (simple, accurate) outcomes for one line.
    fn evaluate_line(
        &self,
        line: &NoteLine,
        curve: &PitchCurve,
        share: f64,
    ) -> Result<(LineOutcome, LineOutcome)> {
        let step = self.config.step_seconds;
        let parts = step_count(line.duration_seconds(), step);
        let expected = line.note();

        let mut class_matches = 0;
        let mut exact_matches = 0;
        for part in 0..parts {
            let start = line.start_time + step * part as f64;
            let end = if part + 1 == parts {
                line.end_time
            } else {
                (start + step).min(line.end_time)
            };
            let sung = self.builder.dominant_note(curve, start, end)?;
            if sung.matches_class(expected) {
                class_matches += 1;
            }
            if sung == expected {
                exact_matches += 1;
            }
        }

        let outcome = |matched_parts| LineOutcome {
            kind: line.kind,
            sampled_parts: parts,
            matched_parts,
            line_bonus_share: share,
        };
        Ok((outcome(class_matches), outcome(exact_matches)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Note;
    use crate::notation::parse;
    use crate::pitch::PitchSample;

    /// One sample every 10 ms for `steps` scoring steps of 9 samples each;
    /// `midi_for_step` picks the sung note per step.
    fn stepped_curve(steps: usize, midi_for_step: impl Fn(usize) -> i32) -> PitchCurve {
        let samples = (0..=steps * 9)
            .map(|k| {
                let step = (k / 9).min(steps - 1);
                PitchSample::new(k as f64 * 0.01, Note::from_midi(midi_for_step(step)).frequency(), 0.9)
            })
            .collect();
        PitchCurve::new(samples).unwrap()
    }

    fn calculator() -> ScoreCalculator {
        ScoreCalculator::new(&ScoringConfig::default(), SegmentBuilder::default())
    }

    // 300 notation BPM: one beat is 0.05 s, so 18 beats = 0.9 s = 10 steps.
    const ONE_LINE: &str = "#BPM:300\n#GAP:0\n: 0 18 0 la\nE\n";

    #[test]
    fn test_octave_errors_count_for_simple_only() {
        let doc = parse(ONE_LINE).unwrap();
        let curve = stepped_curve(10, |step| match step {
            0..=5 => 48,
            6 | 7 => 60,
            _ => 50,
        });
        let card = calculator().score(&doc, &curve).unwrap();

        assert_eq!(card.simple_points.notes, 8, "six exact plus two octave steps");
        assert_eq!(card.accurate_points.notes, 6);
        assert_eq!(card.simple_points.sampled_parts, 10);
        assert_eq!(card.simple_points.line_bonus, 0.0, "not every step matched");
        assert_eq!(card.simple.max_score, 10_000);
        assert_eq!(card.simple.notes, 8_000);
        assert_eq!(card.accurate.notes, 6_000);
        assert_eq!(card.simple.total, 8_000);
    }

    #[test]
    fn test_perfect_line_earns_bonus() {
        let doc = parse(ONE_LINE).unwrap();
        let curve = stepped_curve(10, |_| 60);
        let card = calculator().score(&doc, &curve).unwrap();

        assert_eq!(card.simple_points.line_bonus, 1_000.0);
        assert_eq!(card.simple.max_score, 9_000);
        assert_eq!(card.simple.notes, 9_000);
        assert_eq!(card.simple.total, 10_000);
        assert_eq!(card.accurate.total, 0, "wrong octave everywhere");
    }

    #[test]
    fn test_golden_points_not_divided() {
        let doc = parse("#BPM:300\n#GAP:0\n* 0 18 0 gold\nE\n").unwrap();
        let curve = stepped_curve(10, |_| 48);
        let card = calculator().score(&doc, &curve).unwrap();
        assert_eq!(card.accurate_points.golden_notes, 20);
        assert_eq!(card.accurate.golden, 20);
        assert_eq!(card.accurate.notes, 0, "golden steps add parts but no note points");
        assert_eq!(card.accurate.line_bonus, 1_000);
        assert_eq!(card.accurate.total, 1_020);
    }

    #[test]
    fn test_freestyle_and_empty_lyrics_skipped() {
        let doc = parse("#BPM:300\n#GAP:0\n: 0 18 0 la\nF 18 18 0 free\n: 36 18 0 \nE\n").unwrap();
        let curve = stepped_curve(30, |_| 48);
        let card = calculator().score(&doc, &curve).unwrap();
        assert_eq!(card.accurate_points.sampled_parts, 10, "only the first line is scored");
        // Bonus share is budget / all three lines.
        assert!((card.accurate_points.line_bonus - 1_000.0 / 3.0).abs() < 1e-9);
        assert_eq!(card.accurate.line_bonus, 333);
        assert_eq!(card.accurate.notes, 9_000);
    }

    fn calculator_with_step(step_seconds: f64) -> ScoreCalculator {
        let config = ScoringConfig {
            step_seconds,
            ..ScoringConfig::default()
        };
        ScoreCalculator::new(&config, SegmentBuilder::default())
    }

    /// One sample every 10 ms up to 1 s, note chosen by time.
    fn timed_curve(midi_at: impl Fn(f64) -> i32) -> PitchCurve {
        let samples = (0..=100)
            .map(|k| {
                let t = k as f64 * 0.01;
                PitchSample::new(t, Note::from_midi(midi_at(t)).frequency(), 0.9)
            })
            .collect();
        PitchCurve::new(samples).unwrap()
    }

    #[test]
    fn test_step_size_sets_sampled_parts() {
        let doc = parse(ONE_LINE).unwrap();
        let curve = timed_curve(|_| 48);
        for (step, parts) in [(0.01, 90), (0.05, 18), (0.09, 10), (0.3, 3)] {
            let card = calculator_with_step(step).score(&doc, &curve).unwrap();
            assert_eq!(card.accurate_points.sampled_parts, parts, "step {step}");
            assert_eq!(card.accurate_points.notes, parts, "step {step}: every part matches");
            assert_eq!(card.accurate_points.line_bonus, 1_000.0, "step {step}");
            assert_eq!(card.accurate.total, 10_000, "step {step}");
        }
    }

    #[test]
    fn test_last_step_stretches_to_line_end() {
        // 0.9 s at 0.2 s steps: four parts, the last one covering 0.6..0.9.
        // Over 0.6..0.8 alone the wrong note wins (12 of 20 samples); over
        // the full 0.6..0.9 the written note wins (18 of 30).
        let doc = parse(ONE_LINE).unwrap();
        let curve = timed_curve(|t| if (0.595..0.715).contains(&t) { 50 } else { 48 });
        let card = calculator_with_step(0.2).score(&doc, &curve).unwrap();
        assert_eq!(card.accurate_points.sampled_parts, 4);
        assert_eq!(card.accurate_points.notes, 4, "last part judged on its full span");
        assert_eq!(card.accurate_points.line_bonus, 1_000.0);
    }

    #[test]
    fn test_short_line_has_one_step() {
        assert_eq!(step_count(0.02, 0.09), 1);
        assert_eq!(step_count(0.9, 0.09), 10);
        assert_eq!(step_count(0.27, 0.09), 3);
        assert_eq!(step_count(0.0, 0.09), 1);
    }

    #[test]
    fn test_empty_document_is_error() {
        let doc = parse("#BPM:300\nE\n").unwrap();
        let err = calculator().score(&doc, &stepped_curve(1, |_| 48)).unwrap_err();
        assert!(matches!(err, NotationError::EmptyDocument), "got {err:?}");
    }

    #[test]
    fn test_accumulate_is_a_pure_fold() {
        let outcome = LineOutcome {
            kind: NoteKind::Rap,
            sampled_parts: 4,
            matched_parts: 4,
            line_bonus_share: 250.0,
        };
        let once = Points::default().accumulate(&outcome);
        let twice = once.accumulate(&outcome);
        assert_eq!(once.rap, 4);
        assert_eq!(twice.rap, 8);
        assert_eq!(twice.line_bonus, 500.0);
        assert_eq!(twice.sampled_parts, 8);
        let skipped = once.accumulate(&LineOutcome {
            kind: NoteKind::Freestyle,
            ..outcome
        });
        assert_eq!(skipped, once);
    }

    #[test]
    fn test_comment_suffix_format() {
        let score = Score {
            max_score: 9_000,
            notes: 7_000,
            golden: 12,
            line_bonus: 400,
            total: 7_412,
        };
        assert_eq!(
            score.comment_suffix(),
            " | Score: total: 7412, notes: 7000 line: 400, golden: 12"
        );
    }
}
