use crate::types::{MoveEvaluations, RankedMove, Ranking};

/// Order evaluated moves best-first for the side to move.
///
/// Scores are White-relative, so White wants them descending and Black
/// ascending. Unknown scores sort as 0. Equal keys keep their input order.
pub fn rank(evaluations: MoveEvaluations, white_to_move: bool) -> Ranking {
    let mut moves: Vec<RankedMove> = evaluations
        .into_iter()
        .map(|(mv, evaluation)| RankedMove::new(mv, evaluation))
        .collect();

    if white_to_move {
        moves.sort_by_key(|m| std::cmp::Reverse(m.evaluation.sort_key()));
    } else {
        moves.sort_by_key(|m| m.evaluation.sort_key());
    }

    Ranking {
        moves,
        white_to_move,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Evaluation, SCORE_MATE_BASE};
    use shakmaty::{Chess, Position};

    fn evaluations(values: &[Evaluation]) -> MoveEvaluations {
        let pos = Chess::default();
        pos.legal_moves()
            .into_iter()
            .zip(values.iter().copied())
            .collect()
    }

    fn scores(ranking: &Ranking) -> Vec<Option<i32>> {
        ranking.iter().map(|m| m.evaluation.score).collect()
    }

    #[test]
    fn white_prefers_high_scores() {
        let evals = evaluations(&[
            Evaluation::centipawns(10),
            Evaluation::centipawns(50),
            Evaluation::centipawns(-20),
        ]);
        let ranking = rank(evals, true);
        assert_eq!(scores(&ranking), [Some(50), Some(10), Some(-20)]);
    }

    #[test]
    fn black_prefers_low_scores() {
        let evals = evaluations(&[
            Evaluation::centipawns(10),
            Evaluation::centipawns(50),
            Evaluation::centipawns(-20),
        ]);
        let ranking = rank(evals, false);
        assert_eq!(scores(&ranking), [Some(-20), Some(10), Some(50)]);
    }

    #[test]
    fn unknown_scores_sort_as_level_and_ties_are_stable() {
        let evals = evaluations(&[
            Evaluation::centipawns(0),
            Evaluation::default(),
            Evaluation::centipawns(5),
            Evaluation::centipawns(0),
        ]);
        let order: Vec<_> = evals.moves().copied().collect();
        let ranking = rank(evals, true);

        assert_eq!(ranking.moves[0].mv, order[2]);
        assert_eq!(ranking.moves[1].mv, order[0]);
        assert_eq!(ranking.moves[2].mv, order[1]);
        assert_eq!(ranking.moves[2].evaluation.score, None);
        assert_eq!(ranking.moves[3].mv, order[3]);
    }

    #[test]
    fn forced_mate_only_for_side_to_move() {
        let white_mates = Evaluation::forced(SCORE_MATE_BASE - 3, Some(3));
        let black_mates = Evaluation::forced(-SCORE_MATE_BASE + 2, Some(-2));

        let ranking = rank(evaluations(&[Evaluation::centipawns(1), white_mates]), true);
        assert_eq!(ranking.forced_mate(), Some(3));

        let ranking = rank(evaluations(&[Evaluation::centipawns(1), black_mates]), false);
        assert_eq!(ranking.forced_mate(), Some(2));

        // Best move for White is still getting mated.
        let ranking = rank(evaluations(&[black_mates]), true);
        assert_eq!(ranking.forced_mate(), None);

        assert_eq!(rank(MoveEvaluations::default(), true).forced_mate(), None);
    }

    #[test]
    fn uci_wire_form() {
        let ranking = rank(evaluations(&[Evaluation::centipawns(0)]), true);
        let best = ranking.best().unwrap();
        assert_eq!(best.uci.to_string().len(), 4);
    }
}
