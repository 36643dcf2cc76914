// Transcript timing: word spans, pause markers, and silence intervals.
//
// A `WordSpan` is one timed piece of sung text. Spans created by cutting a
// word apart (at a silence, or into sixteenth-note syllables) are
// `SpanKind::Pause` spans: they hold no lyric of their own and render as the
// `~` continuation marker followed by whatever separator the word carried.
// Keeping the marker out of `text` means nothing downstream ever has to
// pattern-match lyric strings to tell a held syllable from a sung word.

use crate::error::{NotationError, Result};
use serde::{Deserialize, Serialize};

/// Lyric shown for a held continuation of the previous syllable.
pub const PAUSE_MARKER: &str = "~";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    #[default]
    Word,
    Pause,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSpan {
    pub start: f64,
    pub end: f64,
    /// For `Word` spans the sung text including any trailing separator; for
    /// `Pause` spans only the trailing separator (usually empty or `" "`).
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
    /// Last piece of a word (the separator follows it).
    #[serde(default = "default_true")]
    pub is_word_end: bool,
    /// Continuation piece of a word that was cut apart.
    #[serde(default)]
    pub is_hyphen_part: bool,
    #[serde(default)]
    pub kind: SpanKind,
}

impl WordSpan {
    /// A whole word that ends a word (not a hyphenated syllable).
    pub fn word(text: impl Into<String>, start: f64, end: f64, confidence: f64) -> Self {
        WordSpan {
            start,
            end,
            text: text.into(),
            confidence,
            is_word_end: true,
            is_hyphen_part: false,
            kind: SpanKind::Word,
        }
    }

    /// A `~` continuation carrying only `separator` as its text.
    pub fn pause(start: f64, end: f64, separator: &str, is_word_end: bool) -> Self {
        WordSpan {
            start,
            end,
            text: separator.to_string(),
            confidence: 0.0,
            is_word_end,
            is_hyphen_part: true,
            kind: SpanKind::Pause,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_pause(&self) -> bool {
        self.kind == SpanKind::Pause
    }

    /// Text as it appears in a note line.
    pub fn lyric(&self) -> String {
        match self.kind {
            SpanKind::Word => self.text.clone(),
            SpanKind::Pause => format!("{PAUSE_MARKER}{}", self.text),
        }
    }

    /// Text without its trailing separator, and the separator itself
    /// normalised to at most one space.
    pub fn split_separator(&self) -> (&str, &'static str) {
        let body = self.text.trim_end();
        let separator = if body.len() < self.text.len() { " " } else { "" };
        (body, separator)
    }

    /// Cut this span into consecutive `pieces` (start, end pairs).
    ///
    /// The first piece keeps the span's kind and its text minus the
    /// separator; later pieces are pause continuations; the last piece gets
    /// the separator and the span's word-end flag. A single piece is the span
    /// itself with new bounds.
    pub fn fragment(&self, pieces: &[(f64, f64)]) -> Vec<WordSpan> {
        if let [(start, end)] = pieces {
            let mut whole = self.clone();
            whole.start = *start;
            whole.end = *end;
            return vec![whole];
        }
        let (body, separator) = self.split_separator();
        let last = pieces.len().saturating_sub(1);
        pieces
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| {
                let is_last = i == last;
                let mut span = if i == 0 {
                    let mut first = self.clone();
                    first.text = body.to_string();
                    first
                } else {
                    WordSpan::pause(start, end, "", false)
                };
                span.start = start;
                span.end = end;
                span.is_word_end = is_last && self.is_word_end;
                if is_last {
                    span.text.push_str(separator);
                }
                span
            })
            .collect()
    }
}

/// A detected stretch without voice, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceInterval {
    pub start: f64,
    pub end: f64,
}

impl SilenceInterval {
    pub fn new(start: f64, end: f64) -> Self {
        SilenceInterval { start, end }
    }
}

/// Silences must be sorted by start time; the resegmenter stops scanning at
/// the first silence past a word.
pub fn check_silences_sorted(silences: &[SilenceInterval]) -> Result<()> {
    match silences.windows(2).position(|pair| pair[1].start < pair[0].start) {
        Some(index) => Err(NotationError::UnsortedInput {
            what: "silence intervals",
            index: index + 1,
        }),
        None => Ok(()),
    }
}
