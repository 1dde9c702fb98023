//! Error types for the move analyzer.
//!
//! Every failure the pipeline or its collaborators can surface is a
//! variant of [`AnalyzerError`]. Tablebase probe failures are kept in
//! their own [`ProbeError`](crate::tablebase::ProbeError) because they
//! never leave the position evaluator.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The engine binary is missing or could not be launched.
    #[error("failed to start engine at {}: {source}", path.display())]
    EngineSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the engine pipes failed.
    #[error("engine I/O error: {0}")]
    EngineIo(#[from] std::io::Error),

    /// The engine closed its output while a reply was expected.
    #[error("engine exited unexpectedly")]
    EngineExited,

    /// The engine answered with something the session cannot use.
    #[error("engine protocol error: {0}")]
    EngineProtocol(String),

    /// A per-move failure, tagged with the move being evaluated.
    #[error("evaluating {uci} failed: {source}")]
    MoveEvaluation {
        uci: String,
        #[source]
        source: Box<AnalyzerError>,
    },

    /// The caller asked the evaluation pass to stop between moves.
    #[error("evaluation cancelled after {completed} of {total} moves")]
    Cancelled { completed: usize, total: usize },

    /// The provided FEN string could not be parsed.
    #[error("Invalid FEN: {0}")]
    InvalidFen(#[from] shakmaty::fen::ParseFenError),

    /// A parsed position is invalid from the perspective of `shakmaty`.
    #[error("Invalid Chess Position: {0}")]
    InvalidPosition(#[from] shakmaty::PositionError<shakmaty::Chess>),

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("cannot access config file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// The tablebase directory exists but could not be opened.
    #[error("failed to open tablebases at {}: {source}", path.display())]
    Tablebase {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalyzerError {
    /// Whether the error means the engine session is no longer usable.
    pub fn is_engine_failure(&self) -> bool {
        match self {
            Self::EngineIo(_) | Self::EngineExited | Self::EngineProtocol(_) => true,
            Self::MoveEvaluation { source, .. } => source.is_engine_failure(),
            _ => false,
        }
    }
}
