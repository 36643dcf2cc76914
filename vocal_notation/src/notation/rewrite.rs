// Token-preserving rewrites of notation text.
//
// Both rewrites work on the input bytes instead of re-rendering a parsed
// document, so hand-edited files keep their spacing, unknown header keys,
// line endings, and anything after `E`. Note lines are recognized with the
// parser's own tokenizer, so a line is rewritten exactly when `parse` would
// read it as a note.

use crate::error::{NotationError, Result};
use crate::scoring::Score;

use super::header::DEFAULT_COMMENT;
use super::parser::note_fields;

/// Byte ranges of the pitch tokens of every note line before `E`.
fn note_pitch_ranges(text: &str) -> Vec<std::ops::Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim_end() == "E" {
            break;
        }
        if let Some(fields) = note_fields(content) {
            ranges.push(offset + fields.pitch_range.start..offset + fields.pitch_range.end);
        }
        offset += line.len();
    }
    ranges
}

/// Replace the pitch of every note line, in order, leaving every other byte
/// untouched. Fails without changing anything when the counts differ.
pub fn repitch(text: &str, pitches: &[i32]) -> Result<String> {
    let ranges = note_pitch_ranges(text);
    if ranges.len() != pitches.len() {
        return Err(NotationError::PitchCountMismatch {
            expected: ranges.len(),
            found: pitches.len(),
        });
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (range, pitch) in ranges.iter().zip(pitches) {
        out.push_str(&text[cursor..range.start]);
        out.push_str(&pitch.to_string());
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Append the score summary to the `#COMMENT:` line, or insert a comment
/// line before the first body line when there is none.
pub fn append_score_comment(text: &str, score: &Score) -> String {
    let suffix = score.comment_suffix();
    let mut out = String::with_capacity(text.len() + suffix.len() + 32);
    let mut done = false;

    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let has_comment = lines.iter().any(|l| is_comment_line(l));

    for line in lines {
        let content = line.trim_end_matches(['\n', '\r']);
        let ending = &line[content.len()..];
        if !done && has_comment && is_comment_line(line) {
            out.push_str(content);
            out.push_str(&suffix);
            out.push_str(ending);
            done = true;
            continue;
        }
        if !done && !has_comment && !content.starts_with('#') && !content.trim().is_empty() {
            out.push_str(&format!("#COMMENT:{DEFAULT_COMMENT}{suffix}\n"));
            done = true;
        }
        out.push_str(line);
    }
    if !done {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("#COMMENT:{DEFAULT_COMMENT}{suffix}\n"));
    }
    out
}

fn is_comment_line(line: &str) -> bool {
    line.get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("#COMMENT:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SONG: &str = "#TITLE:x\r\n#BPM:300\r\n:  0 4   5 la \r\n- 6\r\n* 6 2 7 lo\r\nE\r\n: 9 9 9 after\r\n";

    fn score() -> Score {
        Score {
            max_score: 9_000,
            notes: 7_200,
            golden: 4,
            line_bonus: 500,
            total: 7_704,
        }
    }

    #[test]
    fn test_repitch_changes_only_pitch_tokens() {
        let out = repitch(SONG, &[-2, 11]).unwrap();
        assert_eq!(
            out,
            "#TITLE:x\r\n#BPM:300\r\n:  0 4   -2 la \r\n- 6\r\n* 6 2 11 lo\r\nE\r\n: 9 9 9 after\r\n"
        );
    }

    #[test]
    fn test_repitch_same_pitches_is_identity() {
        assert_eq!(repitch(SONG, &[5, 7]).unwrap(), SONG);
    }

    #[test]
    fn test_repitch_count_mismatch() {
        let err = repitch(SONG, &[1]).unwrap_err();
        assert!(
            matches!(err, NotationError::PitchCountMismatch { expected: 2, found: 1 }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_repitch_line_without_lyric() {
        assert_eq!(repitch(": 0 4 5\nE\n", &[3]).unwrap(), ": 0 4 3\nE\n");
    }

    #[test]
    fn test_repitch_skips_lines_the_parser_rejects() {
        let text = "#BPM:300\n: 0 4 5\tla\n: 4 4 x no\n: 8 4 6 ok\nE\n";
        let err = repitch(text, &[1, 2, 3]).unwrap_err();
        assert!(
            matches!(err, NotationError::PitchCountMismatch { expected: 1, found: 3 }),
            "got {err:?}"
        );
        assert_eq!(
            repitch(text, &[9]).unwrap(),
            "#BPM:300\n: 0 4 5\tla\n: 4 4 x no\n: 8 4 9 ok\nE\n"
        );
    }

    #[test]
    fn test_append_to_existing_comment() {
        let text = "#TITLE:x\n#COMMENT:hand made\n: 0 4 5 la\nE\n";
        let out = append_score_comment(text, &score());
        assert_eq!(
            out,
            "#TITLE:x\n#COMMENT:hand made | Score: total: 7704, notes: 7200 line: 500, golden: 4\n: 0 4 5 la\nE\n"
        );
    }

    #[test]
    fn test_insert_comment_before_first_note() {
        let text = "#TITLE:x\r\n#BPM:300\r\n: 0 4 5 la\r\nE\r\n";
        let out = append_score_comment(text, &score());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], format!("#COMMENT:{DEFAULT_COMMENT} | Score: total: 7704, notes: 7200 line: 500, golden: 4"));
        assert_eq!(lines[3], ": 0 4 5 la");
    }
}
