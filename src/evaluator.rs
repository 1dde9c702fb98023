//! Per-move evaluation: tablebase first, engine second.

use std::time::Instant;

use shakmaty::{CastlingMode, Chess, Move, Position};

use crate::{
    engine::Evaluator,
    error::AnalyzerError,
    tablebase::TableProbe,
    types::{Evaluation, MoveEvaluations, Progress, SCORE_MATE_BASE},
};

/// Receives progress notifications from [`evaluate_all`].
pub trait ProgressSink {
    fn on_progress(&mut self, progress: Progress);

    /// Checked before each move; returning true stops the pass.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _: Progress) {}
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn on_progress(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Tablebase verdict for `pos`, or `None` when the engine must decide.
///
/// Probe failures of any kind are treated as "no result".
pub fn tablebase_evaluation(pos: &Chess, tables: &dyn TableProbe) -> Option<Evaluation> {
    let wdl = tables.probe_wdl(pos).ok()??;
    if wdl == 0 {
        return Some(Evaluation::DRAW);
    }

    let dtz = tables.probe_dtz(pos).ok()?.map(i32::abs);
    let sign = wdl.signum();
    let distance = dtz.unwrap_or(0);

    Some(Evaluation::forced(
        sign * (SCORE_MATE_BASE - distance),
        dtz.map(|d| sign * d),
    ))
}

/// Engine verdict for `pos` at the given depth. Failures propagate.
pub fn engine_evaluation<E: Evaluator + ?Sized>(
    pos: &Chess,
    engine: &mut E,
    depth: u32,
) -> Result<Evaluation, AnalyzerError> {
    engine.analyse(pos, depth).map(Evaluation::from)
}

/// Evaluate the position reached by playing `mv` from `pos`.
///
/// The move is played on a private copy, so `pos` is untouched on every
/// exit path.
pub fn evaluate_move<E: Evaluator + ?Sized>(
    pos: &Chess,
    mv: Move,
    engine: &mut E,
    depth: u32,
    tables: Option<&dyn TableProbe>,
) -> Result<(Move, Evaluation), AnalyzerError> {
    let mut child = pos.clone();
    child.play_unchecked(mv);

    if let Some(evaluation) = tables.and_then(|t| tablebase_evaluation(&child, t)) {
        return Ok((mv, evaluation));
    }

    let evaluation = engine_evaluation(&child, engine, depth)?;
    Ok((mv, evaluation))
}

/// Evaluate every legal move of `pos`, in the order the rules library
/// yields them.
///
/// The sink is notified after each move with a strictly increasing
/// completed count. Cancellation is honored between moves only.
pub fn evaluate_all<E: Evaluator + ?Sized>(
    pos: &Chess,
    engine: &mut E,
    depth: u32,
    tables: Option<&dyn TableProbe>,
    progress: &mut dyn ProgressSink,
) -> Result<MoveEvaluations, AnalyzerError> {
    let legal = pos.legal_moves();
    let total = legal.len();
    let mut evaluations = MoveEvaluations::with_capacity(total);
    if total == 0 {
        return Ok(evaluations);
    }

    let start = Instant::now();
    for (i, &mv) in legal.iter().enumerate() {
        if progress.is_cancelled() {
            return Err(AnalyzerError::Cancelled {
                completed: i,
                total,
            });
        }

        let (mv, evaluation) = evaluate_move(pos, mv, engine, depth, tables).map_err(|err| {
            AnalyzerError::MoveEvaluation {
                uci: mv.to_uci(CastlingMode::Standard).to_string(),
                source: Box::new(err),
            }
        })?;
        evaluations.insert(mv, evaluation);

        progress.on_progress(Progress {
            completed: i + 1,
            total,
            elapsed: start.elapsed(),
        });
    }

    Ok(evaluations)
}
