// Tempo conversion and beat quantization.
//
// Notation files count beats in quarter-beats of the real tempo: the
// notation BPM is the real BPM divided by four, and every beat number in the
// body is `seconds * real_bpm / 60`. Low notation tempos leave too few beats
// to place syllables precisely, so the writer scales the written BPM (and
// every beat number) by an integer multiplier chosen against a tempo
// ceiling.
//
// See also: `notation/writer.rs`, the only consumer of `BeatScale`.

use crate::error::{NotationError, Result};

/// Notation tempo the multiplier search scales up to.
pub const NOTATION_TEMPO_CEILING: f64 = 400.0;

/// How far below the first ceiling-reaching multiplier the result lands.
const MULTIPLIER_BACKOFF: i64 = 2;

/// Largest multiplier still exactly representable as an `f64`. Tempos that
/// would need more are rejected as invalid.
const MAX_MULTIPLIER: i64 = 1 << 52;

/// Notation BPM for a real tempo (quarter-beats).
pub fn to_notation_tempo(real_bpm: f64) -> f64 {
    real_bpm / 4.0
}

/// Inverse of [`to_notation_tempo`].
pub fn to_real_tempo(notation_bpm: f64) -> f64 {
    notation_bpm * 4.0
}

fn check_tempo(bpm: f64) -> Result<()> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(())
    } else {
        Err(NotationError::InvalidTempo { bpm })
    }
}

/// Real beats elapsed in `seconds`. Fails with `InvalidTempo` for a
/// non-positive or non-finite tempo.
pub fn seconds_to_beats(seconds: f64, real_bpm: f64) -> Result<f64> {
    check_tempo(real_bpm)?;
    Ok(seconds * real_bpm / 60.0)
}

/// Inverse of [`seconds_to_beats`].
pub fn beats_to_seconds(beats: f64, real_bpm: f64) -> Result<f64> {
    check_tempo(real_bpm)?;
    Ok(beats * 60.0 / real_bpm)
}

/// Length of a sixteenth note at `real_bpm`, in seconds.
pub fn sixteenth_note_seconds(real_bpm: f64) -> Result<f64> {
    check_tempo(real_bpm)?;
    Ok(60.0 / real_bpm / 4.0)
}

/// Length of a thirty-second note at `real_bpm`, in seconds.
pub fn thirty_second_note_seconds(real_bpm: f64) -> Result<f64> {
    check_tempo(real_bpm)?;
    Ok(60.0 / real_bpm / 8.0)
}

/// [`choose_multiplier_with_ceiling`] against [`NOTATION_TEMPO_CEILING`].
pub fn choose_multiplier(notation_bpm: f64) -> Result<i64> {
    choose_multiplier_with_ceiling(notation_bpm, NOTATION_TEMPO_CEILING)
}

/// Beat multiplier for a notation tempo.
///
/// Finds the smallest `m >= 1` with `notation_bpm * m >= ceiling` and returns
/// `m - 2`. A result of zero or below is an error, not something to clamp:
/// fast songs are expected to be caught here.
pub fn choose_multiplier_with_ceiling(notation_bpm: f64, ceiling: f64) -> Result<i64> {
    check_tempo(notation_bpm)?;
    check_tempo(ceiling)?;

    // Jump close to the answer, then settle on the exact float boundary.
    let guess = (ceiling / notation_bpm).ceil();
    if guess >= MAX_MULTIPLIER as f64 {
        return Err(NotationError::InvalidTempo { bpm: notation_bpm });
    }
    let mut m = (guess as i64).max(1);
    while notation_bpm * (m as f64) < ceiling {
        m = m
            .checked_add(1)
            .ok_or(NotationError::InvalidTempo { bpm: notation_bpm })?;
    }
    while m > 1 && notation_bpm * ((m - 1) as f64) >= ceiling {
        m -= 1;
    }

    let multiplier = m - MULTIPLIER_BACKOFF;
    if multiplier <= 0 {
        return Err(NotationError::DegenerateMultiplier {
            notation_bpm,
            multiplier,
        });
    }
    Ok(multiplier)
}

/// Validated real tempo plus the multiplier the writer scales beats by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatScale {
    real_bpm: f64,
    multiplier: i64,
}

impl BeatScale {
    pub fn new(real_bpm: f64, ceiling: f64) -> Result<Self> {
        check_tempo(real_bpm)?;
        let multiplier = choose_multiplier_with_ceiling(to_notation_tempo(real_bpm), ceiling)?;
        Ok(BeatScale {
            real_bpm,
            multiplier,
        })
    }

    pub fn real_bpm(&self) -> f64 {
        self.real_bpm
    }

    pub fn multiplier(&self) -> i64 {
        self.multiplier
    }

    /// The BPM written into the header, rounded to two decimals.
    pub fn written_bpm(&self) -> f64 {
        let bpm = to_notation_tempo(self.real_bpm) * self.multiplier as f64;
        (bpm * 100.0).round() / 100.0
    }

    /// Whole scaled beats covering `seconds`.
    pub fn beats(&self, seconds: f64) -> i64 {
        (seconds * self.multiplier as f64 * self.real_bpm / 60.0).round() as i64
    }
}
