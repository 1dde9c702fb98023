//! Self-play game state and move input.

use shakmaty::{
    Chess, EnPassantMode, Move, Position,
    san::SanPlus,
    uci::UciMove,
    zobrist::Zobrist64,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid move format. Please try again.")]
    Invalid,
    #[error("Illegal move. Please try again.")]
    Illegal,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Play(Move),
}

/// Interpret one line of user input: SAN first, then UCI.
pub fn parse_command(pos: &Chess, input: &str) -> Result<Command, InputError> {
    let input = input.trim();
    if matches!(input.to_lowercase().as_str(), "quit" | "q" | "exit") {
        return Ok(Command::Quit);
    }

    if let Ok(san) = input.parse::<SanPlus>() {
        if let Ok(mv) = san.san.to_move(pos) {
            return Ok(Command::Play(mv));
        }
    }

    let uci: UciMove = input.parse().map_err(|_| InputError::Invalid)?;
    uci.to_move(pos)
        .map(Command::Play)
        .map_err(|_| InputError::Illegal)
}

pub struct Game {
    pos: Chess,
    history: Vec<Move>,
    seen: Vec<Zobrist64>,
}

impl Game {
    pub fn new(pos: Chess) -> Self {
        let seen = vec![hash(&pos)];
        Self {
            pos,
            history: Vec::new(),
            seen,
        }
    }

    pub fn position(&self) -> &Chess {
        &self.pos
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn play(&mut self, mv: Move) {
        self.pos.play_unchecked(mv);
        self.history.push(mv);
        self.seen.push(hash(&self.pos));
    }

    fn repetitions(&self) -> usize {
        let current = hash(&self.pos);
        self.seen.iter().filter(|&&h| h == current).count()
    }

    /// Checkmate, stalemate, insufficient material, the seventy-five-move
    /// rule or fivefold repetition.
    pub fn is_over(&self) -> bool {
        self.pos.is_game_over() || self.pos.halfmoves() >= 150 || self.repetitions() >= 5
    }

    pub fn result_text(&self) -> String {
        let pos = &self.pos;
        if pos.is_checkmate() {
            let winner = if pos.turn().is_white() { "Black" } else { "White" };
            format!("Checkmate! Winner: {winner}")
        } else if pos.is_stalemate() {
            "Stalemate! The game is a draw.".to_string()
        } else if pos.is_insufficient_material() {
            "Insufficient material! The game is a draw.".to_string()
        } else if pos.halfmoves() >= 100 {
            "Fifty-move rule! The game is a draw.".to_string()
        } else if self.repetitions() >= 3 {
            "Threefold repetition! The game is a draw.".to_string()
        } else {
            "Game result: *".to_string()
        }
    }
}

fn hash(pos: &Chess) -> Zobrist64 {
    pos.zobrist_hash(EnPassantMode::Legal)
}
