// Cutting word spans against detected silence.
//
// Transcribers stretch word timings across breaths and rests. Given the
// sorted silence intervals from a voice-activity detector, each word is
// trimmed or cut so no span covers silence:
//
// - silence covering the whole word: the word is discarded
// - silence inside the word: the word is cut; the left part keeps the text,
//   the rest continues as pause fragments (`~`)
// - silence over the word's start or end: that edge is moved to the silence
//
// Fragments of a cut word shorter than `min_fragment_seconds` are dropped;
// the nearest surviving fragment takes over the dropped one's role (word
// text or word end). Dropped fragments are not stretched over the gap, which
// keeps the pass idempotent: running it on its own output changes nothing.

use crate::config::ResegmentConfig;
use crate::error::Result;
use crate::transcript::{SilenceInterval, WordSpan, check_silences_sorted};

/// Apply every silence to every span. Output spans stay in input order.
pub fn resegment(
    spans: &[WordSpan],
    silences: &[SilenceInterval],
    config: &ResegmentConfig,
) -> Result<Vec<WordSpan>> {
    check_silences_sorted(silences)?;

    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        let pieces = cut_span(span.start, span.end, silences);
        if pieces.is_empty() {
            tracing::warn!(
                word = %span.text.trim_end(),
                start = span.start,
                end = span.end,
                "word lies entirely in silence, discarded"
            );
            continue;
        }
        let pieces = drop_short_fragments(span, pieces, config.min_fragment_seconds);
        if pieces.len() > 1 {
            tracing::debug!(
                word = %span.text.trim_end(),
                fragments = pieces.len(),
                "word split at silence"
            );
        }
        out.extend(span.fragment(&pieces));
    }
    tracing::debug!(input = spans.len(), output = out.len(), "resegmented spans");
    Ok(out)
}

/// The parts of `[start, end]` not covered by silence. Empty when a silence
/// swallows the whole interval.
fn cut_span(mut start: f64, mut end: f64, silences: &[SilenceInterval]) -> Vec<(f64, f64)> {
    let mut pieces = Vec::new();
    let mut open = true;

    for silence in silences {
        if silence.start > end {
            break;
        }
        if silence.end < start {
            continue;
        }
        if silence.start <= start && silence.end >= end {
            // Covers what is left. For an untouched word that is the whole
            // word; for a continuation it is just the tail.
            open = false;
            break;
        }
        if silence.start >= start && silence.end <= end {
            pieces.push((start, silence.start));
            start = silence.end;
        } else if silence.start < start {
            start = silence.end;
        } else {
            end = silence.start;
        }
    }

    if open && end > start {
        pieces.push((start, end));
    } else if open && pieces.is_empty() {
        // Zero-length word nobody cut; leave it for the caller as-is.
        pieces.push((start, end));
    }
    pieces
}

fn drop_short_fragments(
    span: &WordSpan,
    pieces: Vec<(f64, f64)>,
    min_seconds: f64,
) -> Vec<(f64, f64)> {
    if pieces.len() < 2 {
        return pieces;
    }
    let mut longest = pieces[0];
    for &piece in &pieces[1..] {
        if piece.1 - piece.0 > longest.1 - longest.0 {
            longest = piece;
        }
    }
    let kept: Vec<(f64, f64)> = pieces
        .iter()
        .copied()
        .filter(|(s, e)| e - s >= min_seconds)
        .collect();
    if kept.len() < pieces.len() {
        tracing::warn!(
            word = %span.text.trim_end(),
            dropped = pieces.len() - kept.len(),
            min_seconds,
            "suppressed short fragments of split word"
        );
    }
    if kept.is_empty() { vec![longest] } else { kept }
}
