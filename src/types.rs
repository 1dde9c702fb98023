use std::time::Duration;

use shakmaty::{CastlingMode, Color, Move, uci::UciMove};

/// Score magnitude used for forced results, dominating any centipawn value.
pub const SCORE_MATE_BASE: i32 = 1_000_000;

/// Mate distances at or beyond this magnitude are dropped as implausible.
pub const MATE_DISTANCE_LIMIT: i32 = 1000;

/// Normalized result for one position, always from White's point of view.
///
/// `score` is a centipawn value, or saturated near [`SCORE_MATE_BASE`] for
/// forced results. `mate` is a signed distance: positive when White forces
/// the result, negative when Black does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Evaluation {
    pub score: Option<i32>,
    pub mate: Option<i32>,
}

impl Evaluation {
    pub const DRAW: Evaluation = Evaluation {
        score: Some(0),
        mate: None,
    };

    pub fn centipawns(score: i32) -> Self {
        Self {
            score: Some(score),
            mate: None,
        }
    }

    /// Forced result with a mate distance, filtering implausible distances.
    ///
    /// The score keeps the value computed from the unfiltered distance.
    pub fn forced(score: i32, mate: Option<i32>) -> Self {
        Self {
            score: Some(score),
            mate: mate.filter(|m| m.abs() < MATE_DISTANCE_LIMIT),
        }
    }

    /// Key used for ordering; an unknown score counts as level.
    pub fn sort_key(&self) -> i32 {
        self.score.unwrap_or(0)
    }

    /// Side that forces mate, if a mate distance is known.
    ///
    /// A distance of zero carries no sign, so the score decides.
    pub fn mate_winner(&self) -> Option<Color> {
        match self.mate? {
            m if m > 0 => Some(Color::White),
            m if m < 0 => Some(Color::Black),
            _ => match self.sort_key() {
                s if s > 0 => Some(Color::White),
                s if s < 0 => Some(Color::Black),
                _ => None,
            },
        }
    }
}

/// Evaluated Move Set: one entry per legal move, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveEvaluations {
    entries: Vec<(Move, Evaluation)>,
}

impl MoveEvaluations {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or replace the evaluation for `mv`, keeping keys unique.
    pub fn insert(&mut self, mv: Move, evaluation: Evaluation) {
        match self.entries.iter_mut().find(|(m, _)| *m == mv) {
            Some(entry) => entry.1 = evaluation,
            None => self.entries.push((mv, evaluation)),
        }
    }

    pub fn get(&self, mv: &Move) -> Option<&Evaluation> {
        self.entries
            .iter()
            .find_map(|(m, e)| (m == mv).then_some(e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.entries.iter().map(|(m, _)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Move, Evaluation)> {
        self.entries.iter()
    }
}

impl IntoIterator for MoveEvaluations {
    type Item = (Move, Evaluation);
    type IntoIter = std::vec::IntoIter<(Move, Evaluation)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(Move, Evaluation)> for MoveEvaluations {
    fn from_iter<I: IntoIterator<Item = (Move, Evaluation)>>(iter: I) -> Self {
        let mut evaluations = MoveEvaluations::default();
        for (mv, evaluation) in iter {
            evaluations.insert(mv, evaluation);
        }
        evaluations
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RankedMove {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub mv: Move,
    pub uci: UciMove,
    pub evaluation: Evaluation,
}

impl RankedMove {
    pub fn new(mv: Move, evaluation: Evaluation) -> Self {
        Self {
            uci: mv.to_uci(CastlingMode::Standard),
            mv,
            evaluation,
        }
    }
}

/// Ranked Move List, best move for the side to move first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ranking {
    pub moves: Vec<RankedMove>,
    pub white_to_move: bool,
}

impl Ranking {
    pub fn best(&self) -> Option<&RankedMove> {
        self.moves.first()
    }

    /// Mate distance of the top move when it forces mate for the side to move.
    pub fn forced_mate(&self) -> Option<u32> {
        let best = self.best()?;
        let mover = Color::from_white(self.white_to_move);

        (best.evaluation.mate_winner() == Some(mover))
            .then(|| best.evaluation.mate.map(i32::unsigned_abs))
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedMove> {
        self.moves.iter()
    }
}

/// Snapshot handed to a progress sink after each evaluated move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl Progress {
    /// Average time per completed move times the moves still to go.
    pub fn estimated_remaining(&self) -> Duration {
        let left = self.total.saturating_sub(self.completed) as u32;
        let done = self.completed.max(1) as u32;
        self.elapsed / done * left
    }
}
