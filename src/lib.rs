//! Ranked evaluation of every legal move in a chess position.
//!
//! For each candidate move the resulting position is looked up in the
//! Syzygy endgame tablebases when possible, and otherwise searched by a
//! UCI engine (typically Stockfish) at a depth chosen from the game
//! stage. Centipawn scores and forced results share one White-relative
//! scale, so the moves can be totally ordered for the side to move.
//!
//! The principal type is [`Analyzer`], which owns the engine and
//! tablebase handles for a session and produces an [`Analysis`] per
//! position. The individual stages ([`dynamic_depth`], [`evaluate_move`],
//! [`evaluate_all`], [`rank`]) are public as well, and work against the
//! [`Evaluator`] and [`TableProbe`] traits so that either collaborator can
//! be substituted.
//!
//! The library re‑exports `shakmaty` to make position construction easy.

mod analyzer;
mod config;
mod depth;
mod engine;
mod error;
mod evaluator;
mod ranking;
mod tablebase;
mod types;
mod uci;

/// Pipeline facade.
pub use analyzer::{Analysis, Analyzer, position_from_fen};

/// Session configuration.
pub use config::{Config, expand_home, find_engine_path};

/// Search depth selection.
pub use depth::{DepthPolicy, dynamic_depth};

/// Engine capability and its production implementation.
pub use engine::{EngineOptions, Evaluator, Score};
pub use uci::{UciEngine, UciSession};

/// Error type produced by library operations.
pub use error::AnalyzerError;

/// Evaluation stages.
pub use evaluator::{
    NoProgress, ProgressSink, engine_evaluation, evaluate_all, evaluate_move,
    tablebase_evaluation,
};
pub use ranking::rank;

/// Tablebase capability and its production implementation.
pub use tablebase::{ProbeError, SyzygyTables, TableProbe, TablebaseSummary, summarize};

/// Data structures produced by the pipeline.
pub use types::{
    Evaluation, MATE_DISTANCE_LIMIT, MoveEvaluations, Progress, RankedMove, Ranking,
    SCORE_MATE_BASE,
};

/// Re-export of `shakmaty` for convenience when building positions.
pub use shakmaty;
