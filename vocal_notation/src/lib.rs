// Vocal Notation
//
// Turns a measured vocal pitch curve plus word-level transcript timing into a
// beat-quantized singing-notation document (the line-oriented karaoke text
// format with a `#KEY:value` header, typed note lines, and an `E`
// terminator), and scores how well a notation document's pitches track the
// measured curve.
//
// Architecture:
// - error.rs: Crate error enum and `Result` alias
// - config.rs: JSON-loadable tuning knobs, grouped per stage
// - note.rs: 12-TET notes (MIDI number, frequency, names, notation pitch)
// - pitch.rs: Time-sorted pitch samples and nearest-sample lookups
// - tempo.rs: Real/notation tempo conversion and beat-multiplier choice
// - transcript.rs: Word spans, pause markers, silence intervals
// - resegment.rs: Cutting word spans against detected silence
// - segment.rs: Dominant-note extraction per time interval
// - syllables.rs: Sixteenth-note sub-segmentation and re-merging
// - notation/: Document model, version gating, writer, parser, and the
//   token-preserving rewrites (repitch, score comment)
// - scoring.rs: Step-sampled pitch scoring with line bonus
// - pipeline.rs: Stage wiring for conversion, scoring, and repitching
//
// Everything is a pure function over immutable inputs; the only I/O is
// loading a config file and reading/writing notation files.

pub mod config;
pub mod error;
pub mod notation;
pub mod note;
pub mod pipeline;
pub mod pitch;
pub mod resegment;
pub mod scoring;
pub mod segment;
pub mod syllables;
pub mod tempo;
pub mod transcript;

pub use config::NotationConfig;
pub use error::{NotationError, Result};
pub use notation::{NotationDocument, NoteKind, NoteLine};
pub use note::Note;
pub use pipeline::NotationPipeline;
pub use pitch::{PitchCurve, PitchSample};
pub use transcript::{SilenceInterval, SpanKind, WordSpan};
