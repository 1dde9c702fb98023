use std::{cell::Cell, collections::HashSet};

use stockfish_analyzer::{
    Analyzer, AnalyzerError, DepthPolicy, EngineOptions, Evaluation, Evaluator, MoveEvaluations,
    NoProgress, ProbeError, Progress, Score, TableProbe, dynamic_depth, evaluate_all,
    evaluate_move, rank,
    shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position, fen::Fen},
};

/// Engine stub answering every request with the same centipawn score.
struct FlatEngine {
    score: i32,
    depths: Vec<u32>,
    fail: bool,
}

impl FlatEngine {
    fn new(score: i32) -> Self {
        Self {
            score,
            depths: Vec::new(),
            fail: false,
        }
    }
}

impl Evaluator for FlatEngine {
    fn configure(&mut self, _: &EngineOptions) -> Result<(), AnalyzerError> {
        Ok(())
    }

    fn analyse(&mut self, _: &Chess, depth: u32) -> Result<Score, AnalyzerError> {
        if self.fail {
            return Err(AnalyzerError::EngineExited);
        }
        self.depths.push(depth);
        Ok(Score::Cp(self.score))
    }

    fn quit(&mut self) -> Result<(), AnalyzerError> {
        Ok(())
    }
}

/// Tablebase stub with a fixed verdict for every position.
struct FixedTable {
    wdl: i32,
    dtz: Option<i32>,
    probes: Cell<u32>,
}

impl FixedTable {
    fn new(wdl: i32, dtz: Option<i32>) -> Self {
        Self {
            wdl,
            dtz,
            probes: Cell::new(0),
        }
    }
}

impl TableProbe for FixedTable {
    fn probe_wdl(&self, _: &Chess) -> Result<Option<i32>, ProbeError> {
        self.probes.set(self.probes.get() + 1);
        Ok(Some(self.wdl))
    }

    fn probe_dtz(&self, _: &Chess) -> Result<Option<i32>, ProbeError> {
        Ok(self.dtz)
    }
}

fn position(fen: &str) -> Chess {
    fen.parse::<Fen>()
        .unwrap()
        .into_position(CastlingMode::Standard)
        .unwrap()
}

fn snapshot(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

#[test]
fn starting_position_with_flat_engine() {
    let pos = Chess::default();
    let mut engine = FlatEngine::new(100);

    let evaluations = evaluate_all(&pos, &mut engine, 14, None, &mut NoProgress).unwrap();
    assert_eq!(evaluations.len(), 20);
    assert!(
        evaluations
            .iter()
            .all(|(_, e)| *e == Evaluation::centipawns(100))
    );
    assert!(engine.depths.iter().all(|&d| d == 14));

    let order: Vec<Move> = evaluations.moves().copied().collect();
    let ranking = rank(evaluations, true);
    let ranked: Vec<Move> = ranking.iter().map(|m| m.mv).collect();
    assert_eq!(ranked, order);
}

#[test]
fn lost_endgame_from_tablebase() {
    let pos = position("8/8/8/8/8/K7/8/k1q5 w - - 0 1");
    let table = FixedTable::new(-2, Some(5));
    let mut engine = FlatEngine::new(0);

    let evaluations = evaluate_all(&pos, &mut engine, 25, Some(&table), &mut NoProgress).unwrap();
    assert_eq!(evaluations.len(), pos.legal_moves().len());
    for (_, evaluation) in evaluations.iter() {
        assert!(evaluation.score.unwrap() < -999_000);
        assert_eq!(evaluation.mate, Some(-5));
    }
    assert!(engine.depths.is_empty());

    let ranking = rank(evaluations, true);
    let first = ranking.best().unwrap().evaluation;
    assert!(ranking.iter().all(|m| m.evaluation == first));
    assert_eq!(ranking.forced_mate(), None);
}

#[test]
fn bare_kings_go_to_engine_at_full_depth() {
    let pos = position("8/8/8/8/8/k7/8/K7 w - - 0 1");
    let depth = DepthPolicy::Dynamic.depth_for(&pos);
    assert_eq!(depth, 25);

    let mut engine = FlatEngine::new(0);
    let evaluations = evaluate_all(&pos, &mut engine, depth, None, &mut NoProgress).unwrap();
    assert_eq!(engine.depths.len(), evaluations.len());
    assert!(engine.depths.iter().all(|&d| d == 25));
}

#[test]
fn checkmated_position_has_nothing_to_evaluate() {
    // Fool's mate.
    let pos = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
    assert!(pos.is_checkmate());

    let table = FixedTable::new(2, Some(1));
    let mut engine = FlatEngine::new(0);
    let mut notified = 0;
    let mut sink = |_: Progress| notified += 1;

    let evaluations = evaluate_all(&pos, &mut engine, 20, Some(&table), &mut sink).unwrap();
    assert!(evaluations.is_empty());
    assert!(engine.depths.is_empty());
    assert_eq!(table.probes.get(), 0);
    assert_eq!(notified, 0);
}

#[test]
fn ranking_order_follows_side_to_move() {
    let scored = |pos: &Chess| -> MoveEvaluations {
        pos.legal_moves()
            .into_iter()
            .enumerate()
            .map(|(i, mv)| (mv, Evaluation::centipawns((i as i32 * 37) % 11 - 5)))
            .collect()
    };

    let white = Chess::default();
    let ranking = rank(scored(&white), true);
    let scores: Vec<i32> = ranking.iter().map(|m| m.evaluation.sort_key()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let black = position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
    let ranking = rank(scored(&black), false);
    let scores: Vec<i32> = ranking.iter().map(|m| m.evaluation.sort_key()).collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn every_legal_move_is_evaluated_once() {
    let fens = [
        "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "8/P7/8/8/8/8/k7/2K5 w - - 0 1",
    ];
    for fen in fens {
        let pos = position(fen);
        let mut engine = FlatEngine::new(0);
        let evaluations = evaluate_all(&pos, &mut engine, 1, None, &mut NoProgress).unwrap();

        let legal: HashSet<Move> = pos.legal_moves().into_iter().collect();
        let evaluated: HashSet<Move> = evaluations.moves().copied().collect();
        assert_eq!(evaluations.len(), legal.len(), "{fen}");
        assert_eq!(evaluated, legal, "{fen}");
    }
}

#[test]
fn position_is_untouched_on_success_and_failure() {
    let pos = position("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let before = snapshot(&pos);

    let mut engine = FlatEngine::new(20);
    for mv in pos.legal_moves() {
        evaluate_move(&pos, mv, &mut engine, 3, None).unwrap();
        assert_eq!(snapshot(&pos), before);
    }

    engine.fail = true;
    for mv in pos.legal_moves() {
        assert!(evaluate_move(&pos, mv, &mut engine, 3, None).is_err());
        assert_eq!(snapshot(&pos), before);
    }
}

#[test]
fn tablebase_draw_ignores_distance() {
    let pos = position("8/8/8/8/8/k7/8/K7 w - - 0 1");
    for dtz in [None, Some(0), Some(17), Some(-3)] {
        let table = FixedTable::new(0, dtz);
        let mut engine = FlatEngine::new(55);
        let evaluations =
            evaluate_all(&pos, &mut engine, 25, Some(&table), &mut NoProgress).unwrap();

        assert!(evaluations.iter().all(|(_, e)| *e == Evaluation::DRAW));
        assert!(engine.depths.is_empty());
    }
}

#[test]
fn distant_mates_keep_score_only() {
    let pos = position("8/8/8/8/8/k7/8/K7 w - - 0 1");
    let table = FixedTable::new(2, Some(1500));
    let mut engine = FlatEngine::new(0);
    let mv = pos.legal_moves()[0];

    let (_, evaluation) = evaluate_move(&pos, mv, &mut engine, 25, Some(&table)).unwrap();
    assert_eq!(evaluation.score, Some(1_000_000 - 1500));
    assert_eq!(evaluation.mate, None);

    let table = FixedTable::new(2, Some(999));
    let (_, evaluation) = evaluate_move(&pos, mv, &mut engine, 25, Some(&table)).unwrap();
    assert_eq!(evaluation.mate, Some(999));
}

#[test]
fn depth_at_the_extremes() {
    assert_eq!(dynamic_depth(&Chess::default()), 14);
    assert_eq!(dynamic_depth(&position("8/8/8/8/8/k7/8/K7 w - - 0 1")), 25);
}

#[test]
fn analyzer_runs_the_whole_pipeline() {
    let pos = position("8/8/8/8/8/K7/8/k1q5 w - - 0 1");
    let mut analyzer = Analyzer::new(
        FlatEngine::new(0),
        Some(Box::new(FixedTable::new(-2, Some(5)))),
        DepthPolicy::Dynamic,
    );

    let analysis = analyzer.analyse(&pos, &mut NoProgress).unwrap();
    assert_eq!(analysis.depth, 25);
    assert_eq!(analysis.ranking.len(), pos.legal_moves().len());
    assert!(analysis.ranking.white_to_move);
    assert!(analyzer.engine().depths.is_empty());

    let summary = analyzer.tablebase_summary(&pos).unwrap();
    assert_eq!(summary.to_string(), "Tablebase: Loss (DTZ: 5)");
    analyzer.close().unwrap();
}
