// Vocal Notation Eval
//
// Compares two notation documents for the same song (typically a reference
// chart and a generated one) by laying both onto a shared fixed-step
// timeline and counting where their pitches agree.
//
// - error.rs: Eval error enum wrapping core notation errors
// - config.rs: Step size and freestyle handling, loadable from JSON
// - datapoints.rs: Document -> per-step pitch timeline
// - compare.rs: Timeline agreement, pitch-class shift histogram, and the
//   JSON-serializable report
//
// The `compare` binary (src/bin/compare.rs) wraps this for the evaluation
// harness: two files in, one JSON report out.

pub mod compare;
pub mod config;
pub mod datapoints;
pub mod error;

pub use compare::{ComparisonReport, compare_datapoints, compare_documents};
pub use config::EvaluationConfig;
pub use datapoints::{FREESTYLE, NO_PITCH, map_to_datapoints};
pub use error::{EvalError, Result};
