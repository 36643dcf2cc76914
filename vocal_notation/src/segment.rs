// Dominant-note extraction: one note per time interval of a pitch curve.
//
// The same routine serves two callers. The writer asks for the note of each
// word span; the score calculator asks for the note of every fixed scoring
// step inside a note line. Both go through `SegmentBuilder::dominant_note`,
// which is what makes `write -> parse -> score` agree with itself.
//
// Voting: take the samples nearest the interval (see `PitchCurve::window`),
// keep the confident ones (or the single most confident sample if none
// qualifies), map each voiced frequency to its nearest note, and pick the
// most frequent note. Ties go to the note seen first.

use crate::config::SegmentConfig;
use crate::error::{NotationError, Result};
use crate::note::Note;
use crate::pitch::{PitchCurve, PitchSample};
use crate::transcript::{SpanKind, WordSpan};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A timed, pitched, lyric-carrying piece of the melody in absolute seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSegment {
    pub note: Note,
    pub start: f64,
    pub end: f64,
    pub lyric: String,
    #[serde(default)]
    pub kind: SpanKind,
    #[serde(default = "default_true")]
    pub is_word_end: bool,
}

impl NoteSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBuilder {
    confidence_threshold: f64,
}

impl Default for SegmentBuilder {
    fn default() -> Self {
        SegmentBuilder::new(&SegmentConfig::default())
    }
}

impl SegmentBuilder {
    pub fn new(config: &SegmentConfig) -> Self {
        SegmentBuilder {
            confidence_threshold: config.confidence_threshold,
        }
    }

    /// Most common note over `[start, end]`.
    pub fn dominant_note(&self, curve: &PitchCurve, start: f64, end: f64) -> Result<Note> {
        let window = curve.window(start, end);
        if window.is_empty() {
            return Err(NotationError::EmptyPitchCurve);
        }

        let confident: Vec<&PitchSample> = window
            .iter()
            .filter(|s| s.confidence > self.confidence_threshold)
            .collect();
        let voters = if confident.is_empty() {
            vec![most_confident(window)]
        } else {
            confident
        };

        // First-seen order matters for ties, so a small Vec beats a map here.
        let mut tally: Vec<(Note, usize)> = Vec::new();
        for sample in voters {
            let Some(note) = Note::from_frequency(sample.frequency) else {
                continue;
            };
            match tally.iter_mut().find(|(n, _)| *n == note) {
                Some((_, count)) => *count += 1,
                None => tally.push((note, 1)),
            }
        }

        let mut best: Option<(Note, usize)> = None;
        for (note, count) in tally {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((note, count));
            }
        }
        Ok(best.map_or(Note::LOWEST, |(note, _)| note))
    }

    /// Segment for one span: its dominant note, times, and lyric.
    pub fn build_segment(
        &self,
        curve: &PitchCurve,
        start: f64,
        end: f64,
        lyric: impl Into<String>,
    ) -> Result<NoteSegment> {
        Ok(NoteSegment {
            note: self.dominant_note(curve, start, end)?,
            start,
            end,
            lyric: lyric.into(),
            kind: SpanKind::Word,
            is_word_end: true,
        })
    }

    /// One segment per span, carrying the span's lyric and word structure.
    pub fn build_segments(&self, curve: &PitchCurve, spans: &[WordSpan]) -> Result<Vec<NoteSegment>> {
        if curve.is_empty() {
            return Err(NotationError::EmptyPitchCurve);
        }
        let segments = spans
            .iter()
            .map(|span| {
                let mut segment = self.build_segment(curve, span.start, span.end, span.lyric())?;
                segment.kind = span.kind;
                segment.is_word_end = span.is_word_end;
                Ok(segment)
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(segments = segments.len(), "built note segments");
        Ok(segments)
    }
}

/// Highest confidence in the window; the earliest on ties.
fn most_confident(window: &[PitchSample]) -> &PitchSample {
    let mut best = &window[0];
    for sample in &window[1..] {
        if sample.confidence > best.confidence {
            best = sample;
        }
    }
    best
}
