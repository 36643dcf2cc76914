// Tunable parameters for the notation pipeline.
//
// `NotationConfig` groups the knobs per stage (tempo, resegmentation,
// segment building, syllable splitting, line breaks, scoring, output). Every
// group has a `Default` matching the reference behaviour, and the whole
// struct is `#[serde(default)]`, so a JSON file only needs the fields it
// overrides.
//
// See also: `pipeline.rs`, which owns a validated `NotationConfig` and hands
// the relevant group to each stage.

use crate::error::{NotationError, Result};
use crate::notation::FormatVersion;
use crate::tempo::NOTATION_TEMPO_CEILING;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Per-stage groups
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    /// Lowest notation tempo the written BPM is scaled up to.
    pub ceiling_bpm: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        TempoConfig {
            ceiling_bpm: NOTATION_TEMPO_CEILING,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResegmentConfig {
    /// Fragments of a split word shorter than this (seconds) are dropped.
    pub min_fragment_seconds: f64,
}

impl Default for ResegmentConfig {
    fn default() -> Self {
        ResegmentConfig {
            min_fragment_seconds: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Samples at or below this confidence do not vote (unless nothing else
    /// is available).
    pub confidence_threshold: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        SegmentConfig {
            confidence_threshold: 0.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyllableConfig {
    /// Cut long spans into sixteenth-note fragments before pitch extraction.
    pub split: bool,
    /// Re-join short or same-note pause fragments after pitch extraction.
    pub merge: bool,
}

impl Default for SyllableConfig {
    fn default() -> Self {
        SyllableConfig {
            split: true,
            merge: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineBreakConfig {
    /// With fewer inter-segment gaps than this, every word-end gap breaks.
    pub min_gaps_for_threshold: usize,
}

impl Default for LineBreakConfig {
    fn default() -> Self {
        LineBreakConfig {
            min_gaps_for_threshold: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Length of one sampled scoring step, in seconds.
    pub step_seconds: f64,
    pub max_song_score: u32,
    pub line_bonus_budget: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            step_seconds: 0.09,
            max_song_score: 10_000,
            line_bonus_budget: 1_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format_version: FormatVersion,
    /// Also render the `[Karaoke]` duplicate when the version calls for one.
    pub create_karaoke: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format_version: FormatVersion::V1_0_0,
            create_karaoke: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotationConfig {
    pub tempo: TempoConfig,
    pub resegment: ResegmentConfig,
    pub segment: SegmentConfig,
    pub syllables: SyllableConfig,
    pub line_breaks: LineBreakConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

impl NotationConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| NotationError::io("reading notation config", e))?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), "loaded notation config");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: NotationConfig = serde_json::from_str(json)
            .map_err(|e| NotationError::json("parsing notation config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NotationError::json("serializing notation config", e))
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        positive("tempo.ceiling_bpm", self.tempo.ceiling_bpm)?;
        positive(
            "resegment.min_fragment_seconds",
            self.resegment.min_fragment_seconds,
        )?;
        let threshold = self.segment.confidence_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(NotationError::invalid_config(format!(
                "segment.confidence_threshold must be in [0, 1), got {threshold}"
            )));
        }
        positive("scoring.step_seconds", self.scoring.step_seconds)?;
        if self.scoring.line_bonus_budget >= self.scoring.max_song_score {
            return Err(NotationError::invalid_config(format!(
                "scoring.line_bonus_budget ({}) must be below scoring.max_song_score ({})",
                self.scoring.line_bonus_budget, self.scoring.max_song_score
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NotationError::invalid_config(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(NotationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = NotationConfig::from_json_str(
            r#"{ "scoring": { "step_seconds": 0.05 }, "output": { "format_version": "1.1.0" } }"#,
        )
        .unwrap();
        assert_eq!(config.scoring.step_seconds, 0.05);
        assert_eq!(config.scoring.max_song_score, 10_000, "untouched field keeps default");
        assert_eq!(config.output.format_version, FormatVersion::V1_1_0);
        assert_eq!(config.tempo, TempoConfig::default());
    }

    #[test]
    fn test_config_json_round_trip() {
        let mut config = NotationConfig::default();
        config.syllables.merge = false;
        config.line_breaks.min_gaps_for_threshold = 3;
        let json = config.to_json_string().unwrap();
        let restored = NotationConfig::from_json_str(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let err = NotationConfig::from_json_str(r#"{ "scoring": { "step_seconds": 0 } }"#)
            .unwrap_err();
        assert!(
            matches!(err, NotationError::InvalidConfig { .. }),
            "expected InvalidConfig, got {err:?}"
        );
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = NotationConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, NotationError::Json { .. }), "got {err:?}");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = NotationConfig::load(Path::new("/nonexistent/notation.json")).unwrap_err();
        assert!(matches!(err, NotationError::Io { .. }), "got {err:?}");
    }
}
