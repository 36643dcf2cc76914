// Document header: song metadata, tempo, and gap.
//
// `Header::value` and `Header::set` are the only places that know how each
// `HeaderField` maps onto a struct field, so the writer and the parser
// cannot drift apart.

use super::version::{FormatVersion, HeaderField};
use crate::error::{NotationError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CREATOR: &str = "vocal_notation";
pub const DEFAULT_COMMENT: &str = "generated by vocal_notation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub version: FormatVersion,
    pub artist: String,
    pub title: String,
    pub year: Option<String>,
    /// Display name ("English"), not an ISO code.
    pub language: Option<String>,
    pub genre: Option<String>,
    pub cover: Option<String>,
    pub cover_url: Option<String>,
    pub mp3: Option<String>,
    pub audio: Option<String>,
    pub vocals: Option<String>,
    pub instrumental: Option<String>,
    pub tags: Option<String>,
    pub video: Option<String>,
    pub video_url: Option<String>,
    /// Notation BPM as written (already scaled by the beat multiplier).
    pub bpm: f64,
    /// Milliseconds from the start of the audio to beat 0.
    pub gap_ms: f64,
    pub creator: Option<String>,
    pub comment: Option<String>,
}

impl Default for Header {
    fn default() -> Self {
        Header {
            version: FormatVersion::V1_0_0,
            artist: String::new(),
            title: String::new(),
            year: None,
            language: None,
            genre: None,
            cover: None,
            cover_url: None,
            mp3: None,
            audio: None,
            vocals: None,
            instrumental: None,
            tags: None,
            video: None,
            video_url: None,
            bpm: 0.0,
            gap_ms: 0.0,
            creator: None,
            comment: None,
        }
    }
}

impl Header {
    /// Absolute time in seconds of a (scaled) beat number.
    pub fn beat_to_seconds(&self, beat: f64) -> f64 {
        beat * 60.0 / (self.bpm * 4.0) + self.gap_ms / 1000.0
    }

    /// Rendered value of a field, `None` when absent.
    pub fn value(&self, field: HeaderField) -> Option<String> {
        match field {
            HeaderField::Version => Some(self.version.to_string()),
            HeaderField::Artist => Some(self.artist.clone()),
            HeaderField::Title => Some(self.title.clone()),
            HeaderField::Year => self.year.clone(),
            HeaderField::Language => self.language.clone(),
            HeaderField::Genre => self.genre.clone(),
            HeaderField::Cover => self.cover.clone(),
            HeaderField::CoverUrl => self.cover_url.clone(),
            HeaderField::Mp3 => self.mp3.clone(),
            HeaderField::Audio => self.audio.clone(),
            HeaderField::Vocals => self.vocals.clone(),
            HeaderField::Instrumental => self.instrumental.clone(),
            HeaderField::Tags => self.tags.clone(),
            HeaderField::Video => self.video.clone(),
            HeaderField::VideoUrl => self.video_url.clone(),
            HeaderField::Bpm => Some(format!("{}", self.bpm)),
            HeaderField::Gap => Some(format!("{}", self.gap_ms)),
            HeaderField::Creator => self.creator.clone(),
            HeaderField::Comment => self.comment.clone(),
        }
    }

    /// Store a parsed value. Numeric fields accept a decimal comma.
    pub fn set(&mut self, field: HeaderField, value: &str, line_number: usize) -> Result<()> {
        let owned = || Some(value.to_string());
        match field {
            HeaderField::Version => {
                self.version = value.parse().map_err(|_| NotationError::MalformedHeader {
                    line_number,
                    key: field.key(),
                    value: value.to_string(),
                })?;
            }
            HeaderField::Artist => self.artist = value.to_string(),
            HeaderField::Title => self.title = value.to_string(),
            HeaderField::Year => self.year = owned(),
            HeaderField::Language => self.language = owned(),
            HeaderField::Genre => self.genre = owned(),
            HeaderField::Cover => self.cover = owned(),
            HeaderField::CoverUrl => self.cover_url = owned(),
            HeaderField::Mp3 => self.mp3 = owned(),
            HeaderField::Audio => self.audio = owned(),
            HeaderField::Vocals => self.vocals = owned(),
            HeaderField::Instrumental => self.instrumental = owned(),
            HeaderField::Tags => self.tags = owned(),
            HeaderField::Video => self.video = owned(),
            HeaderField::VideoUrl => self.video_url = owned(),
            HeaderField::Bpm => self.bpm = parse_number(field, value, line_number)?,
            HeaderField::Gap => self.gap_ms = parse_number(field, value, line_number)?,
            HeaderField::Creator => self.creator = owned(),
            HeaderField::Comment => self.comment = owned(),
        }
        Ok(())
    }
}

fn parse_number(field: HeaderField, value: &str, line_number: usize) -> Result<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| NotationError::MalformedHeader {
            line_number,
            key: field.key(),
            value: value.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Metadata normalisation
// ---------------------------------------------------------------------------

/// First standalone four-digit run ("2021-05-03" -> "2021"); the input
/// unchanged when there is none.
pub fn extract_year(date: &str) -> String {
    let chars: Vec<char> = date.chars().collect();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let before_ok = start == 0 || !is_word(chars[start - 1]);
        let after_ok = i == chars.len() || !is_word(chars[i]);
        if i - start == 4 && before_ok && after_ok {
            return chars[start..i].iter().collect();
        }
    }
    date.to_string()
}

/// Normalise a `,`/`;` separated list to `", "` separators.
pub fn format_separated(list: &str) -> String {
    list.split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("zh", "Chinese"),
];

/// English display name for a two-letter language code. Unknown codes and
/// values that are already names pass through.
pub fn language_display_name(code: &str) -> String {
    let code = code.trim();
    LANGUAGE_NAMES
        .iter()
        .find(|(iso, _)| iso.eq_ignore_ascii_case(code))
        .map_or_else(|| code.to_string(), |(_, name)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2021-05-03"), "2021");
        assert_eq!(extract_year("released 1999"), "1999");
        assert_eq!(extract_year("12345"), "12345", "five digits is not a year");
        assert_eq!(extract_year("abc2020"), "abc2020", "needs a word boundary");
        assert_eq!(extract_year("unknown"), "unknown");
    }

    #[test]
    fn test_format_separated() {
        assert_eq!(format_separated("Pop,Rock ;  Jazz"), "Pop, Rock, Jazz");
        assert_eq!(format_separated("Solo"), "Solo");
        assert_eq!(format_separated(" , "), "");
    }

    #[test]
    fn test_language_display_name() {
        assert_eq!(language_display_name("en"), "English");
        assert_eq!(language_display_name("DE"), "German");
        assert_eq!(language_display_name("Klingon"), "Klingon");
    }

    #[test]
    fn test_numeric_header_accepts_decimal_comma() {
        let mut header = Header::default();
        header.set(HeaderField::Bpm, "339,5", 3).unwrap();
        header.set(HeaderField::Gap, " 1250 ", 4).unwrap();
        assert_eq!(header.bpm, 339.5);
        assert_eq!(header.gap_ms, 1250.0);
        assert_eq!(header.value(HeaderField::Bpm).as_deref(), Some("339.5"));
        assert_eq!(header.value(HeaderField::Gap).as_deref(), Some("1250"));
    }

    #[test]
    fn test_bad_numeric_header_is_error() {
        let mut header = Header::default();
        let err = header.set(HeaderField::Bpm, "fast", 7).unwrap_err();
        assert!(
            matches!(err, NotationError::MalformedHeader { line_number: 7, key: "BPM", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_beat_to_seconds() {
        let header = Header {
            bpm: 360.0,
            gap_ms: 1000.0,
            ..Header::default()
        };
        // 24 scaled beats at 360 notation BPM = 24 * 60 / 1440 = 1 s.
        assert!((header.beat_to_seconds(24.0) - 2.0).abs() < 1e-12);
    }
}
