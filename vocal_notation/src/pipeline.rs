// Stage wiring: transcript + pitch curve -> notation, and back to a score.
//
// Conversion order:
//   1. resegment word spans against silence
//   2. optionally split long spans into sixteenth-note pieces
//   3. pick a dominant note per span
//   4. optionally merge redundant `~` continuations
//   5. quantize and render the notation document
//
// Scoring always goes through the text form (render -> parse -> score), so
// a score computed right after conversion equals the score of the same file
// read back later.

use crate::config::NotationConfig;
use crate::error::Result;
use crate::notation::{
    NotationWriter, SongMetadata, WrittenNotation, append_score_comment, parse, repitch,
};
use crate::pitch::PitchCurve;
use crate::resegment::resegment;
use crate::scoring::{ScoreCalculator, ScoreCard};
use crate::segment::{NoteSegment, SegmentBuilder};
use crate::syllables::{merge_sub_segments, split_into_sub_segments};
use crate::transcript::{SilenceInterval, WordSpan};
use serde::Serialize;

/// Everything one conversion needs, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ConversionInput<'a> {
    pub pitch_curve: &'a PitchCurve,
    pub words: &'a [WordSpan],
    pub silences: &'a [SilenceInterval],
    pub real_bpm: f64,
    pub metadata: &'a SongMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    /// Spans after resegmentation and sub-segmentation.
    pub spans: Vec<WordSpan>,
    /// Segments as written (after merging).
    pub segments: Vec<NoteSegment>,
    pub notation: WrittenNotation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub card: ScoreCard,
    /// The scored text with the simple score appended to its comment.
    pub annotated_text: String,
}

#[derive(Debug, Clone)]
pub struct NotationPipeline {
    config: NotationConfig,
}

impl NotationPipeline {
    pub fn new(config: NotationConfig) -> Result<Self> {
        config.validate()?;
        Ok(NotationPipeline { config })
    }

    pub fn config(&self) -> &NotationConfig {
        &self.config
    }

    fn builder(&self) -> SegmentBuilder {
        SegmentBuilder::new(&self.config.segment)
    }

    pub fn convert(&self, input: &ConversionInput<'_>) -> Result<ConversionOutput> {
        let mut spans = resegment(input.words, input.silences, &self.config.resegment)?;
        if self.config.syllables.split {
            spans = split_into_sub_segments(&spans, input.real_bpm)?;
        }

        let mut segments = self.builder().build_segments(input.pitch_curve, &spans)?;
        if self.config.syllables.merge {
            segments = merge_sub_segments(&segments, input.real_bpm)?;
        }

        let notation =
            NotationWriter::new(&self.config).write(&segments, input.real_bpm, input.metadata)?;
        tracing::info!(
            words = input.words.len(),
            spans = spans.len(),
            notes = segments.len(),
            "converted transcript to notation"
        );
        Ok(ConversionOutput {
            spans,
            segments,
            notation,
        })
    }

    /// Parse `text`, score it against `curve`, and annotate it.
    pub fn score_document(&self, text: &str, curve: &PitchCurve) -> Result<ScoreReport> {
        let doc = parse(text)?;
        let card = ScoreCalculator::new(&self.config.scoring, self.builder()).score(&doc, curve)?;
        tracing::info!(
            simple = card.simple.total,
            accurate = card.accurate.total,
            "scored notation"
        );
        Ok(ScoreReport {
            annotated_text: append_score_comment(text, &card.simple),
            card,
        })
    }

    pub fn convert_and_score(&self, input: &ConversionInput<'_>) -> Result<(ConversionOutput, ScoreReport)> {
        let output = self.convert(input)?;
        let report = self.score_document(&output.notation.text, input.pitch_curve)?;
        Ok((output, report))
    }

    /// Re-derive every note's pitch of an existing document from `curve`,
    /// keeping its timing and all other text as it is.
    pub fn repitch_document(&self, text: &str, curve: &PitchCurve) -> Result<String> {
        let doc = parse(text)?;
        let builder = self.builder();
        let pitches = doc
            .lines
            .iter()
            .map(|line| {
                builder
                    .dominant_note(curve, line.start_time, line.end_time)
                    .map(|note| note.notation_pitch())
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(lines = pitches.len(), "repitched document");
        repitch(text, &pitches)
    }
}
