//! Search depth selection for engine fallback evaluations.

use shakmaty::{Chess, Position};

/// How the engine search depth is chosen for a pass.
///
/// A fixed depth replaces the dynamic heuristic entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthPolicy {
    #[default]
    Dynamic,
    Fixed(u32),
}

impl DepthPolicy {
    pub fn depth_for(&self, pos: &Chess) -> u32 {
        match *self {
            DepthPolicy::Dynamic => dynamic_depth(pos),
            DepthPolicy::Fixed(depth) => depth,
        }
    }
}

/// Game-stage heuristic over non-king material and the full-move number.
///
/// Openings with most pieces on the board search shallow; endgames with a
/// collapsed branching factor search deep. First matching row wins.
pub fn dynamic_depth(pos: &Chess) -> u32 {
    let board = pos.board();
    let pieces = (board.occupied() & !board.kings()).count();
    let move_number = pos.fullmoves().get();

    match (pieces, move_number) {
        (0..=6, _) => 25,
        (7..=10, _) => 22,
        (20.., 0..=10) => 14,
        (16.., 0..=15) => 16,
        _ => 20,
    }
}
