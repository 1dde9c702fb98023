//! Terminal rendering for the interactive session.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use shakmaty::{
    CastlingMode, Chess, Color, File, Move, Piece, Position, Rank, Role, Square,
};
use stockfish_analyzer::{Progress, ProgressSink, RankedMove, Ranking};

fn piece_glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

/// Board from White's side, Unicode pieces, bordered squares.
pub fn render_board(pos: &Chess) -> String {
    const RULE: &str = "  -----------------\n";
    let board = pos.board();
    let mut out = String::from(RULE);

    for rank in Rank::ALL.into_iter().rev() {
        out.push(rank.char());
        out.push_str(" |");
        for file in File::ALL {
            let glyph = board
                .piece_at(Square::from_coords(file, rank))
                .map_or(' ', piece_glyph);
            out.push(glyph);
            out.push('|');
        }
        out.push('\n');
        out.push_str(RULE);
    }

    out.push_str("   ");
    for file in File::ALL {
        out.push(file.char());
        out.push(' ');
    }
    out.trim_end().to_string()
}

pub fn format_ranked_move(ranked: &RankedMove) -> String {
    let uci = ranked.uci.to_string();
    let score = ranked
        .evaluation
        .score
        .map_or_else(|| "N/A".to_string(), |s| s.to_string());
    let mate = ranked
        .evaluation
        .mate
        .map(|m| format!(", Mate in {}", m.unsigned_abs()))
        .unwrap_or_default();
    format!("{uci:5}-> Eval score: {score}{mate}")
}

pub fn print_possible_moves(ranking: &Ranking) {
    println!("Possible moves:");
    for ranked in ranking.iter() {
        println!("{}", format_ranked_move(ranked));
    }
}

/// Numbered move list, five moves per line.
pub fn format_move_history(history: &[Move]) -> String {
    const PER_LINE: usize = 5;

    let lines: Vec<String> = history
        .chunks(PER_LINE)
        .enumerate()
        .map(|(chunk, moves)| {
            moves
                .iter()
                .enumerate()
                .map(|(j, mv)| {
                    let n = chunk * PER_LINE + j + 1;
                    let sep = if n % PER_LINE != 0 { "  " } else { "" };
                    format!("{n:2}. {}{sep}", mv.to_uci(CastlingMode::Standard))
                })
                .collect()
        })
        .collect();

    format!("Moves played:\n{}\n", lines.join("\n"))
}

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Progress bar over the moves of one evaluation pass.
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn bar(&mut self, total: usize) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::with_template(
                "Evaluating: [{bar:40}] {percent:>3}% | Remaining: {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
            bar.set_style(style);
            bar
        })
    }
}

impl ProgressSink for TerminalProgress {
    fn on_progress(&mut self, progress: Progress) {
        let bar = self.bar(progress.total);
        bar.set_position(progress.completed as u64);
        bar.set_message(format_duration(progress.estimated_remaining()));
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
