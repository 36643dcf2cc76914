use thiserror::Error;
use vocal_notation::NotationError;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Notation(#[from] NotationError),
    /// One side has no pitched step, so its ratios are undefined.
    #[error("{side} document has no pitched datapoints")]
    NoPitchedDatapoints { side: &'static str },
    #[error("invalid evaluation configuration: {message}")]
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

pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }
}
