// In-memory notation document: header, typed note lines, line breaks.
//
// Every `NoteLine` carries both its beat coordinates (what the file says)
// and its absolute start/end time in seconds (what the scorer and the
// evaluator need). Times are derived from the header's BPM and gap once,
// when the line is created, and never recomputed from a changed header.

use super::header::{DEFAULT_COMMENT, Header};
use crate::note::Note;
use crate::scoring::Score;
use serde::{Deserialize, Serialize};

/// Note line type, from its leading tag character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Normal,
    Golden,
    Rap,
    RapGolden,
    Freestyle,
}

impl NoteKind {
    pub const ALL: [NoteKind; 5] = [
        NoteKind::Normal,
        NoteKind::Golden,
        NoteKind::Rap,
        NoteKind::RapGolden,
        NoteKind::Freestyle,
    ];

    pub fn tag(self) -> char {
        match self {
            NoteKind::Normal => ':',
            NoteKind::Golden => '*',
            NoteKind::Rap => 'R',
            NoteKind::RapGolden => 'G',
            NoteKind::Freestyle => 'F',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        NoteKind::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Points per matched scoring step. Freestyle is never scored.
    pub fn weight(self) -> u32 {
        match self {
            NoteKind::Normal | NoteKind::Rap => 1,
            NoteKind::Golden | NoteKind::RapGolden => 2,
            NoteKind::Freestyle => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteLine {
    pub kind: NoteKind,
    pub start_beat: i64,
    pub duration_beats: i64,
    /// Semitones relative to MIDI 48.
    pub pitch: i32,
    pub lyric: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl NoteLine {
    /// Build a line and derive its absolute times from `header`.
    pub fn timed(
        header: &Header,
        kind: NoteKind,
        start_beat: i64,
        duration_beats: i64,
        pitch: i32,
        lyric: impl Into<String>,
    ) -> Self {
        let start_time = header.beat_to_seconds(start_beat as f64);
        let end_time = header.beat_to_seconds((start_beat + duration_beats) as f64);
        NoteLine {
            kind,
            start_beat,
            duration_beats,
            pitch,
            lyric: lyric.into(),
            start_time,
            end_time,
        }
    }

    pub fn end_beat(&self) -> i64 {
        self.start_beat + self.duration_beats
    }

    pub fn note(&self) -> Note {
        Note::from_notation_pitch(self.pitch)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// A `- <beat>` line: the phrase ends after `after_line_index`, and the next
/// phrase is shown from `show_at_beat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreak {
    pub after_line_index: usize,
    pub show_at_beat: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotationDocument {
    pub header: Header,
    pub lines: Vec<NoteLine>,
    /// Sorted by `after_line_index`, at most one per line.
    pub line_breaks: Vec<LineBreak>,
}

impl NotationDocument {
    pub fn break_after(&self, line_index: usize) -> Option<&LineBreak> {
        self.line_breaks
            .iter()
            .find(|b| b.after_line_index == line_index)
    }

    pub fn pitches(&self) -> Vec<i32> {
        self.lines.iter().map(|l| l.pitch).collect()
    }

    /// Phrases as index ranges into `lines`, split at line breaks.
    pub fn phrases(&self) -> Vec<std::ops::Range<usize>> {
        let mut phrases = Vec::new();
        let mut start = 0;
        for b in &self.line_breaks {
            let end = (b.after_line_index + 1).min(self.lines.len());
            if end > start {
                phrases.push(start..end);
                start = end;
            }
        }
        if start < self.lines.len() {
            phrases.push(start..self.lines.len());
        }
        phrases
    }

    /// Append the score summary to the comment, creating one if needed.
    pub fn append_score_comment(&mut self, score: &Score) {
        let comment = self
            .header
            .comment
            .get_or_insert_with(|| DEFAULT_COMMENT.to_string());
        comment.push_str(&score.comment_suffix());
    }
}
