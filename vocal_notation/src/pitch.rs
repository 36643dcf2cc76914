// Measured pitch curve: time-sorted (time, frequency, confidence) samples.
//
// Produced by an external pitch tracker and handed over as data. A
// `PitchCurve` is validated once on construction (times non-decreasing) and
// is immutable afterwards, so it can be shared across threads freely.

use crate::error::{NotationError, Result};
use serde::{Deserialize, Serialize};

/// One tracker frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchSample {
    /// Seconds from the start of the audio.
    pub time: f64,
    /// Hz; 0 means unvoiced.
    pub frequency: f64,
    /// Tracker confidence in [0, 1].
    pub confidence: f64,
}

impl PitchSample {
    pub fn new(time: f64, frequency: f64, confidence: f64) -> Self {
        PitchSample {
            time,
            frequency,
            confidence,
        }
    }
}

/// Samples sorted by time. Deserializing runs the same check as
/// [`PitchCurve::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PitchSample>", into = "Vec<PitchSample>")]
pub struct PitchCurve {
    samples: Vec<PitchSample>,
}

impl PitchCurve {
    /// Fails with `UnsortedInput` at the first sample that goes back in
    /// time. Equal times are allowed.
    pub fn new(samples: Vec<PitchSample>) -> Result<Self> {
        if let Some(index) = samples
            .windows(2)
            .position(|pair| pair[1].time < pair[0].time)
        {
            return Err(NotationError::UnsortedInput {
                what: "pitch samples",
                index: index + 1,
            });
        }
        Ok(PitchCurve { samples })
    }

    /// All samples, in time order.
    pub fn samples(&self) -> &[PitchSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the curve has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Index of the sample whose time is closest to `time`. On an exact tie
    /// between two neighbours the later one wins.
    pub fn nearest_index(&self, time: f64) -> Option<usize> {
        if self.samples.is_empty() {
            return None;
        }
        let idx = self.samples.partition_point(|s| s.time < time);
        if idx == self.samples.len() {
            return Some(idx - 1);
        }
        if idx > 0 {
            let before = time - self.samples[idx - 1].time;
            let after = self.samples[idx].time - time;
            if before < after {
                return Some(idx - 1);
            }
        }
        Some(idx)
    }

    /// Samples that describe `[start, end]`: the half-open range between the
    /// nearest indices of both ends, or the single nearest sample when both
    /// ends land on the same one.
    pub fn window(&self, start: f64, end: f64) -> &[PitchSample] {
        let (Some(first), Some(last)) = (self.nearest_index(start), self.nearest_index(end)) else {
            return &[];
        };
        if last <= first {
            &self.samples[first..=first]
        } else {
            &self.samples[first..last]
        }
    }
}

impl TryFrom<Vec<PitchSample>> for PitchCurve {
    type Error = NotationError;

    fn try_from(samples: Vec<PitchSample>) -> Result<Self> {
        PitchCurve::new(samples)
    }
}

impl From<PitchCurve> for Vec<PitchSample> {
    fn from(curve: PitchCurve) -> Self {
        curve.samples
    }
}
