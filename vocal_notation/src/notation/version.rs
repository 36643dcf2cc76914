// Format versions and which header fields each one may carry.
//
// Version gating is a small declarative table instead of branches in the
// writer: each `VersionRule` names the fields that version introduces and
// whether songs written for it still get the legacy `[Karaoke]` duplicate.
// A version uses every rule whose `min_version` it reaches; the karaoke flag
// comes from the newest of those rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormatVersion {
    #[serde(rename = "0.3.0")]
    V0_3_0,
    #[serde(rename = "1.0.0")]
    V1_0_0,
    #[serde(rename = "1.1.0")]
    V1_1_0,
    #[serde(rename = "1.2.0")]
    V1_2_0,
}

impl FormatVersion {
    pub const ALL: [FormatVersion; 4] = [
        FormatVersion::V0_3_0,
        FormatVersion::V1_0_0,
        FormatVersion::V1_1_0,
        FormatVersion::V1_2_0,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormatVersion::V0_3_0 => "0.3.0",
            FormatVersion::V1_0_0 => "1.0.0",
            FormatVersion::V1_1_0 => "1.1.0",
            FormatVersion::V1_2_0 => "1.2.0",
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FormatVersion::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown format version {s:?}"))
    }
}

/// Header keys, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Version,
    Artist,
    Title,
    Year,
    Language,
    Genre,
    Cover,
    CoverUrl,
    Mp3,
    Audio,
    Vocals,
    Instrumental,
    Tags,
    Video,
    VideoUrl,
    Bpm,
    Gap,
    Creator,
    Comment,
}

impl HeaderField {
    pub const WRITE_ORDER: [HeaderField; 19] = [
        HeaderField::Version,
        HeaderField::Artist,
        HeaderField::Title,
        HeaderField::Year,
        HeaderField::Language,
        HeaderField::Genre,
        HeaderField::Cover,
        HeaderField::CoverUrl,
        HeaderField::Mp3,
        HeaderField::Audio,
        HeaderField::Vocals,
        HeaderField::Instrumental,
        HeaderField::Tags,
        HeaderField::Video,
        HeaderField::VideoUrl,
        HeaderField::Bpm,
        HeaderField::Gap,
        HeaderField::Creator,
        HeaderField::Comment,
    ];

    pub fn key(self) -> &'static str {
        match self {
            HeaderField::Version => "VERSION",
            HeaderField::Artist => "ARTIST",
            HeaderField::Title => "TITLE",
            HeaderField::Year => "YEAR",
            HeaderField::Language => "LANGUAGE",
            HeaderField::Genre => "GENRE",
            HeaderField::Cover => "COVER",
            HeaderField::CoverUrl => "COVERURL",
            HeaderField::Mp3 => "MP3",
            HeaderField::Audio => "AUDIO",
            HeaderField::Vocals => "VOCALS",
            HeaderField::Instrumental => "INSTRUMENTAL",
            HeaderField::Tags => "TAGS",
            HeaderField::Video => "VIDEO",
            HeaderField::VideoUrl => "VIDEOURL",
            HeaderField::Bpm => "BPM",
            HeaderField::Gap => "GAP",
            HeaderField::Creator => "CREATOR",
            HeaderField::Comment => "COMMENT",
        }
    }

    /// Case-insensitive lookup; `None` for keys this crate does not know.
    pub fn from_key(key: &str) -> Option<Self> {
        HeaderField::WRITE_ORDER
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(key.trim()))
    }
}

pub struct VersionRule {
    pub min_version: FormatVersion,
    pub emits: &'static [HeaderField],
    pub legacy_karaoke_duplicate: bool,
}

pub const VERSION_RULES: &[VersionRule] = &[
    VersionRule {
        min_version: FormatVersion::V0_3_0,
        emits: &[
            HeaderField::Artist,
            HeaderField::Title,
            HeaderField::Year,
            HeaderField::Language,
            HeaderField::Genre,
            HeaderField::Cover,
            HeaderField::Mp3,
            HeaderField::Video,
            HeaderField::Bpm,
            HeaderField::Gap,
            HeaderField::Creator,
            HeaderField::Comment,
        ],
        legacy_karaoke_duplicate: true,
    },
    VersionRule {
        min_version: FormatVersion::V1_0_0,
        emits: &[HeaderField::Version],
        legacy_karaoke_duplicate: true,
    },
    VersionRule {
        min_version: FormatVersion::V1_1_0,
        emits: &[
            HeaderField::Audio,
            HeaderField::Vocals,
            HeaderField::Instrumental,
            HeaderField::Tags,
        ],
        legacy_karaoke_duplicate: false,
    },
    VersionRule {
        min_version: FormatVersion::V1_2_0,
        emits: &[HeaderField::VideoUrl, HeaderField::CoverUrl],
        legacy_karaoke_duplicate: false,
    },
];

fn applicable(version: FormatVersion) -> impl Iterator<Item = &'static VersionRule> {
    VERSION_RULES.iter().filter(move |r| r.min_version <= version)
}

/// Fields a document of `version` may carry, in write order.
pub fn header_fields(version: FormatVersion) -> Vec<HeaderField> {
    HeaderField::WRITE_ORDER
        .into_iter()
        .filter(|field| applicable(version).any(|rule| rule.emits.contains(field)))
        .collect()
}

pub fn emits_karaoke_duplicate(version: FormatVersion) -> bool {
    VERSION_RULES
        .iter()
        .rev()
        .find(|rule| rule.min_version <= version)
        .is_some_and(|rule| rule.legacy_karaoke_duplicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_and_display() {
        for v in FormatVersion::ALL {
            assert_eq!(v.as_str().parse::<FormatVersion>().unwrap(), v);
        }
        assert!("2.0.0".parse::<FormatVersion>().is_err());
        assert_eq!(" 1.1.0 ".parse::<FormatVersion>().unwrap(), FormatVersion::V1_1_0);
    }

    #[test]
    fn test_version_field_gating() {
        let legacy = header_fields(FormatVersion::V0_3_0);
        assert!(!legacy.contains(&HeaderField::Version));
        assert!(!legacy.contains(&HeaderField::Audio));

        let v100 = header_fields(FormatVersion::V1_0_0);
        assert_eq!(v100[0], HeaderField::Version, "VERSION is written first");
        assert!(!v100.contains(&HeaderField::Vocals));

        let v110 = header_fields(FormatVersion::V1_1_0);
        assert!(v110.contains(&HeaderField::Audio));
        assert!(v110.contains(&HeaderField::Tags));
        assert!(!v110.contains(&HeaderField::VideoUrl));

        let v120 = header_fields(FormatVersion::V1_2_0);
        assert!(v120.contains(&HeaderField::VideoUrl));
        assert!(v120.contains(&HeaderField::CoverUrl));
        assert_eq!(v120.last(), Some(&HeaderField::Comment));
    }

    #[test]
    fn test_karaoke_duplicate_only_before_1_1_0() {
        assert!(emits_karaoke_duplicate(FormatVersion::V0_3_0));
        assert!(emits_karaoke_duplicate(FormatVersion::V1_0_0));
        assert!(!emits_karaoke_duplicate(FormatVersion::V1_1_0));
        assert!(!emits_karaoke_duplicate(FormatVersion::V1_2_0));
    }

    #[test]
    fn test_header_key_lookup_case_insensitive() {
        assert_eq!(HeaderField::from_key("bpm"), Some(HeaderField::Bpm));
        assert_eq!(HeaderField::from_key("VideoUrl"), Some(HeaderField::VideoUrl));
        assert_eq!(HeaderField::from_key("PREVIEWSTART"), None);
    }
}
