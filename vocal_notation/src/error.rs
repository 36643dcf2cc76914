// Error type shared by every stage of the notation pipeline.
//
// Each failure the pipeline can hit has its own variant. Nothing here is
// recovered silently: callers decide whether a malformed line or a bad tempo
// aborts the job.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotationError {
    #[error("invalid tempo: {bpm} BPM")]
    InvalidTempo { bpm: f64 },
    #[error("tempo {notation_bpm} BPM gives beat multiplier {multiplier}")]
    DegenerateMultiplier { notation_bpm: f64, multiplier: i64 },
    #[error("malformed line {line_number}: {content:?}")]
    MalformedLine { line_number: usize, content: String },
    #[error("malformed #{key} header on line {line_number}: {value:?}")]
    MalformedHeader {
        line_number: usize,
        key: &'static str,
        value: String,
    },
    #[error("document has no note lines")]
    EmptyDocument,
    #[error("pitch curve has no samples")]
    EmptyPitchCurve,
    #[error("{what} not sorted by time at index {index}")]
    UnsortedInput { what: &'static str, index: usize },
    #[error("document has {expected} note lines but {found} pitches were supplied")]
    PitchCountMismatch { expected: usize, found: usize },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, NotationError>;

impl NotationError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn malformed_line(line_number: usize, content: &str) -> Self {
        Self::MalformedLine {
            line_number,
            content: content.to_string(),
        }
    }
}
