// Sixteenth-note sub-segmentation of long spans, and re-merging afterwards.
//
// A long sung word often moves through several notes. Before pitch
// extraction each span longer than a sixteenth note is cut into a
// sixteenth-length head plus sixteenth-length `~` continuations (and a
// shorter remainder), so every piece gets its own dominant note. After
// extraction, continuations that add nothing (too short to sing, or the same
// note as the piece before) are folded back into their predecessor.

use crate::error::Result;
use crate::segment::NoteSegment;
use crate::tempo::{sixteenth_note_seconds, thirty_second_note_seconds};
use crate::transcript::{SpanKind, WordSpan};

/// Remainders shorter than this are not worth a note of their own.
const MIN_REMAINDER_SECONDS: f64 = 0.01;

/// Cut every span longer than a sixteenth note into a sixteenth-long head
/// followed by sixteenth-long `~` pieces and a final remainder (dropped when
/// under 10 ms). The separator and word-end flag move to the last piece.
pub fn split_into_sub_segments(spans: &[WordSpan], real_bpm: f64) -> Result<Vec<WordSpan>> {
    let sixteenth = sixteenth_note_seconds(real_bpm)?;

    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        if span.duration() <= sixteenth {
            out.push(span.clone());
            continue;
        }
        let head_end = span.start + sixteenth;
        let remainder = span.end - head_end;
        let full = (remainder / sixteenth).floor() as usize;
        let partial = remainder - full as f64 * sixteenth;

        let mut pieces = Vec::with_capacity(full + 2);
        pieces.push((span.start, head_end));
        for i in 0..full {
            let start = head_end + i as f64 * sixteenth;
            pieces.push((start, start + sixteenth));
        }
        if partial >= MIN_REMAINDER_SECONDS {
            let start = head_end + full as f64 * sixteenth;
            pieces.push((start, start + partial));
        }

        let mut fragments = span.fragment(&pieces);
        if fragments.len() > 1 {
            fragments[0].is_hyphen_part = true;
        }
        out.extend(fragments);
    }
    tracing::debug!(input = spans.len(), output = out.len(), "split spans into sixteenths");
    Ok(out)
}

/// Fold redundant `~` continuations back into the segment before them.
///
/// A continuation merges when it is shorter than a thirty-second note or
/// carries the same note as its predecessor, unless a breath pause longer
/// than a sixteenth note separates the two. The merged segment takes the
/// continuation's end time, separator, and word-end flag.
pub fn merge_sub_segments(segments: &[NoteSegment], real_bpm: f64) -> Result<Vec<NoteSegment>> {
    let thirty_second = thirty_second_note_seconds(real_bpm)?;
    let sixteenth = sixteenth_note_seconds(real_bpm)?;

    let mut out: Vec<NoteSegment> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| &segments[p]);
        let mergeable = segment.kind == SpanKind::Pause
            && previous.is_some_and(|prev| {
                let short = segment.duration() < thirty_second;
                let same_note = segment.note == prev.note;
                let breath = segment.start - prev.end > sixteenth;
                (short || same_note) && !breath
            });

        match out.last_mut() {
            Some(last) if mergeable => {
                last.end = segment.end;
                if segment.lyric.ends_with(' ') && !last.lyric.ends_with(' ') {
                    last.lyric.push(' ');
                }
                if segment.is_word_end {
                    last.is_word_end = true;
                }
            }
            _ => out.push(segment.clone()),
        }
    }
    tracing::debug!(input = segments.len(), output = out.len(), "merged sub-segments");
    Ok(out)
}
