// 12-tone equal temperament notes.
//
// A `Note` is stored as a MIDI number (A4 = 69 = 440 Hz, C4 = 60). Notation
// documents store pitch as semitones relative to MIDI 48 (C3), so pitch 0 is
// C3 and pitch 12 is C4. Names use sharps (`C#4`, never `Db4`).
//
// Notes are plain `Copy` values; nothing mutates a note after it is built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tuning reference: A4 is MIDI 69 at 440 Hz.
pub const A4_MIDI: i32 = 69;
pub const A4_HZ: f64 = 440.0;

/// MIDI number written as pitch 0 in a notation document.
pub const NOTATION_PITCH_ORIGIN: i32 = 48;

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note {
    midi: i32,
}

impl Note {
    /// What an interval with no voiced samples resolves to.
    pub const LOWEST: Note = Note { midi: 0 };

    /// Note for a MIDI number. Any `i32` is accepted; names and
    /// frequencies extend past the MIDI range.
    pub fn from_midi(midi: i32) -> Self {
        Note { midi }
    }

    /// Nearest note to a frequency. `None` for unvoiced (non-positive or
    /// non-finite) input.
    pub fn from_frequency(hz: f64) -> Option<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return None;
        }
        let midi = A4_MIDI as f64 + 12.0 * (hz / A4_HZ).log2();
        Some(Note {
            midi: midi.round() as i32,
        })
    }

    /// Note for a pitch as written in a notation document.
    pub fn from_notation_pitch(pitch: i32) -> Self {
        Note {
            midi: pitch + NOTATION_PITCH_ORIGIN,
        }
    }

    /// MIDI number.
    pub fn midi(self) -> i32 {
        self.midi
    }

    /// Pitch as written in a notation document (semitones above C3).
    pub fn notation_pitch(self) -> i32 {
        self.midi - NOTATION_PITCH_ORIGIN
    }

    /// 0 = C ... 11 = B.
    pub fn pitch_class(self) -> u8 {
        self.midi.rem_euclid(12) as u8
    }

    /// Scientific octave number: C4 is MIDI 60, C-1 is MIDI 0.
    pub fn octave(self) -> i32 {
        self.midi.div_euclid(12) - 1
    }

    /// Same pitch class, any octave.
    pub fn matches_class(self, other: Note) -> bool {
        self.pitch_class() == other.pitch_class()
    }

    /// Equal-tempered frequency in Hz.
    pub fn frequency(self) -> f64 {
        A4_HZ * 2f64.powf((self.midi - A4_MIDI) as f64 / 12.0)
    }

    /// Name with a sharp where needed and an octave number, e.g. `C#4`.
    pub fn name(self) -> String {
        format!(
            "{}{}",
            PITCH_CLASS_NAMES[self.pitch_class() as usize],
            self.octave()
        )
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_frequencies() {
        assert_eq!(Note::from_frequency(440.0), Some(Note::from_midi(69)));
        assert_eq!(Note::from_frequency(261.63), Some(Note::from_midi(60)));
        assert_eq!(Note::from_frequency(130.81), Some(Note::from_midi(48)));
        assert!((Note::from_midi(69).frequency() - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_rounds_to_nearest_semitone() {
        // A quarter-tone below A4 plus a little still rounds up to A4.
        let hz = 440.0 * 2f64.powf(-0.4 / 12.0);
        assert_eq!(Note::from_frequency(hz).unwrap().midi(), 69);
        let hz = 440.0 * 2f64.powf(-0.6 / 12.0);
        assert_eq!(Note::from_frequency(hz).unwrap().midi(), 68);
    }

    #[test]
    fn test_unvoiced_frequency_has_no_note() {
        assert_eq!(Note::from_frequency(0.0), None);
        assert_eq!(Note::from_frequency(-3.0), None);
        assert_eq!(Note::from_frequency(f64::NAN), None);
    }

    #[test]
    fn test_names_use_sharps_and_c4_is_60() {
        assert_eq!(Note::from_midi(60).name(), "C4");
        assert_eq!(Note::from_midi(61).name(), "C#4");
        assert_eq!(Note::from_midi(69).to_string(), "A4");
        assert_eq!(Note::from_midi(47).name(), "B2");
        assert_eq!(Note::LOWEST.name(), "C-1");
    }

    #[test]
    fn test_notation_pitch_origin_is_c3() {
        let c3 = Note::from_notation_pitch(0);
        assert_eq!(c3.midi(), 48);
        assert_eq!(c3.name(), "C3");
        assert_eq!(Note::from_midi(45).notation_pitch(), -3);
    }

    #[test]
    fn test_matches_class_ignores_octave() {
        let c3 = Note::from_midi(48);
        assert!(c3.matches_class(Note::from_midi(60)));
        assert!(c3.matches_class(Note::from_midi(36)));
        assert!(!c3.matches_class(Note::from_midi(50)));
        assert_eq!(Note::from_midi(-1).pitch_class(), 11, "negative MIDI wraps like B");
    }
}
