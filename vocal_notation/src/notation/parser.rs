// Text -> notation document.
//
// Line grammar:
//   #KEY:value                         header (unknown keys ignored)
//   <T> <start> <duration> <pitch> <lyric>
//                                      note, T one of `: * R G F`
//   - <beat> [<beat>]                  line break after the previous note
//   E                                  end of song; the rest is ignored
// Blank lines are skipped. Anything else in the body is a `MalformedLine`.
//
// The lyric is everything after the single space that follows the pitch,
// so leading and trailing spaces inside it survive a round trip. Absolute
// times are computed per line from the header's BPM and gap, which must
// therefore precede the first note.

use super::document::{LineBreak, NotationDocument, NoteKind, NoteLine};
use super::header::Header;
use super::version::{FormatVersion, HeaderField};
use crate::error::{NotationError, Result};
use std::ops::Range;
use std::path::Path;

pub fn parse(text: &str) -> Result<NotationDocument> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut doc = NotationDocument {
        header: Header {
            version: FormatVersion::V0_3_0,
            ..Header::default()
        },
        ..NotationDocument::default()
    };
    let mut tempo_checked = false;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }

        if let Some(header_line) = line.strip_prefix('#') {
            if let Some((key, value)) = header_line.split_once(':')
                && let Some(field) = HeaderField::from_key(key)
            {
                doc.header.set(field, value.trim_end(), line_number)?;
            }
            continue;
        }

        if line.trim_end() == "E" {
            break;
        }

        if !tempo_checked {
            let bpm = doc.header.bpm;
            if !(bpm.is_finite() && bpm > 0.0) {
                return Err(NotationError::InvalidTempo { bpm });
            }
            tempo_checked = true;
        }

        if let Some(rest) = line.strip_prefix('-') {
            let show_at_beat = rest
                .split_whitespace()
                .next()
                .and_then(|t| t.parse::<i64>().ok())
                .ok_or_else(|| NotationError::malformed_line(line_number, line))?;
            let after_line_index = doc
                .lines
                .len()
                .checked_sub(1)
                .ok_or_else(|| NotationError::malformed_line(line_number, line))?;
            doc.line_breaks.push(LineBreak {
                after_line_index,
                show_at_beat,
            });
            continue;
        }

        let note = parse_note_line(&doc.header, line)
            .ok_or_else(|| NotationError::malformed_line(line_number, line))?;
        doc.lines.push(note);
    }

    tracing::debug!(
        lines = doc.lines.len(),
        line_breaks = doc.line_breaks.len(),
        bpm = doc.header.bpm,
        gap_ms = doc.header.gap_ms,
        "parsed notation document"
    );
    Ok(doc)
}

fn parse_note_line(header: &Header, line: &str) -> Option<NoteLine> {
    let fields = note_fields(line)?;
    Some(NoteLine::timed(
        header,
        fields.kind,
        fields.start_beat,
        fields.duration_beats,
        fields.pitch,
        fields.lyric,
    ))
}

/// The fields of one note line, with the byte range of its pitch token so
/// the rewrites can replace it in place.
pub(super) struct NoteFields<'a> {
    pub kind: NoteKind,
    pub start_beat: i64,
    pub duration_beats: i64,
    pub pitch: i32,
    pub pitch_range: Range<usize>,
    pub lyric: &'a str,
}

/// Tokenize a note line (without its line ending). `None` for anything the
/// parser would reject as a note line.
pub(super) fn note_fields(line: &str) -> Option<NoteFields<'_>> {
    let mut chars = line.chars();
    let kind = NoteKind::from_tag(chars.next()?)?;
    let rest = chars.as_str().strip_prefix(' ')?;

    let (start, rest) = next_token(rest)?;
    let (duration, rest) = next_token(rest)?;
    let (pitch, rest) = next_token(rest)?;
    let pitch_end = line.len() - rest.len();

    Some(NoteFields {
        kind,
        start_beat: start.parse().ok()?,
        duration_beats: duration.parse().ok()?,
        pitch: pitch.parse().ok()?,
        pitch_range: pitch_end - pitch.len()..pitch_end,
        lyric: rest.strip_prefix(' ').unwrap_or(rest),
    })
}

/// Split off the next space-delimited token; the remainder keeps the
/// delimiter.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start_matches(' ');
    let end = s.find(' ').unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some(s.split_at(end))
}

pub fn read_notation_file(path: &Path) -> Result<NotationDocument> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| NotationError::io("reading notation file", e))?;
    parse(&text)
}
