//! Capability interface for the engine that evaluates positions the
//! tablebase cannot settle.

use shakmaty::{Chess, Color};

use crate::{
    error::AnalyzerError,
    types::{Evaluation, SCORE_MATE_BASE},
};

/// Engine result from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Cp(i32),
    /// `moves` is zero when the side to move is already mated.
    Mate { winner: Color, moves: u32 },
}

impl From<Score> for Evaluation {
    fn from(score: Score) -> Self {
        match score {
            Score::Cp(cp) => Evaluation::centipawns(cp),
            Score::Mate { winner, moves } => {
                let moves = moves as i32;
                let sign = winner.fold_wb(1, -1);
                Evaluation {
                    score: Some(sign * (SCORE_MATE_BASE - moves)),
                    mate: Some(sign * moves),
                }
            }
        }
    }
}

/// Resource settings sent to the engine once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub threads: u32,
    /// Hash table size in MB.
    pub hash_size: u32,
    pub skill_level: u8,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 4,
            hash_size: 16384,
            skill_level: 20,
        }
    }
}

impl EngineOptions {
    /// Option names and values as the engine expects them.
    pub fn to_uci_options(&self) -> [(&'static str, String); 3] {
        [
            ("Threads", self.threads.to_string()),
            ("Hash", self.hash_size.to_string()),
            ("Skill Level", self.skill_level.to_string()),
        ]
    }
}

pub trait Evaluator {
    fn configure(&mut self, options: &EngineOptions) -> Result<(), AnalyzerError>;

    /// Fixed-depth analysis of `pos`. Blocks until the engine answers.
    fn analyse(&mut self, pos: &Chess, depth: u32) -> Result<Score, AnalyzerError>;

    /// Terminates the engine; callers invoke this once per session.
    fn quit(&mut self) -> Result<(), AnalyzerError>;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn configure(&mut self, options: &EngineOptions) -> Result<(), AnalyzerError> {
        (**self).configure(options)
    }

    fn analyse(&mut self, pos: &Chess, depth: u32) -> Result<Score, AnalyzerError> {
        (**self).analyse(pos, depth)
    }

    fn quit(&mut self) -> Result<(), AnalyzerError> {
        (**self).quit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_scores_saturate() {
        let white = Evaluation::from(Score::Mate {
            winner: Color::White,
            moves: 3,
        });
        assert_eq!(white.score, Some(999_997));
        assert_eq!(white.mate, Some(3));

        let black = Evaluation::from(Score::Mate {
            winner: Color::Black,
            moves: 2,
        });
        assert_eq!(black.score, Some(-999_998));
        assert_eq!(black.mate, Some(-2));
    }

    #[test]
    fn centipawns_have_no_mate() {
        assert_eq!(Evaluation::from(Score::Cp(-35)), Evaluation::centipawns(-35));
    }

    #[test]
    fn options_in_engine_terms() {
        let opts = EngineOptions {
            threads: 8,
            hash_size: 256,
            skill_level: 15,
        };
        let names: Vec<_> = opts.to_uci_options().into_iter().collect();
        assert_eq!(names[0], ("Threads", "8".to_string()));
        assert_eq!(names[2], ("Skill Level", "15".to_string()));
    }
}
