//! Mailbox board used while replaying a game.
//!
//! `Board` stores one signed code per square, indexed `[file][rank]`. The
//! magnitude is the piece kind (pawn 1 .. king 6) and the sign is the owner
//! (positive for white, negative for black). Zero is an empty square.

use std::fmt;

use crate::engine::game::MoveRecord;
use crate::engine::movement::Occupancy;
use crate::engine::notation::{CastleSide, TokenKind};
use crate::engine::types::{ChessError, Color, PieceType, Square, UnresolvedKind, code_char};

/// Fields appended to every placement string by [`Board::to_fen`].
pub const FEN_SUFFIX: &str = " w KQkq - 0 1";

const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[i8; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [[0; 8]; 8],
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut board = Self::empty();
        for (file, &piece) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            for color in [Color::White, Color::Black] {
                let back = color.back_rank();
                let pawns = (back as i8 + color.pawn_direction()) as u8;
                board.set(Square::from_file_rank(file, back), piece.code(color));
                board.set(
                    Square::from_file_rank(file, pawns),
                    PieceType::Pawn.code(color),
                );
            }
        }
        board
    }

    // -----------------------------------------------------------------------
    // Squares
    // -----------------------------------------------------------------------

    #[inline]
    pub fn get(&self, sq: Square) -> i8 {
        self.squares[sq.file() as usize][sq.rank() as usize]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, code: i8) {
        self.squares[sq.file() as usize][sq.rank() as usize] = code;
    }

    /// Owner and kind of the piece on `sq`.
    pub fn piece_at(&self, sq: Square) -> Option<(Color, PieceType)> {
        let code = self.get(sq);
        Some((Color::of_code(code)?, PieceType::from_code(code)?))
    }

    /// First square, scanning a1, b1, .. h1, a2, .., holding `color`'s king.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = PieceType::King.code(color);
        (0..Square::NUM as u8)
            .map(Square::new)
            .find(|&sq| self.get(sq) == king)
    }

    /// Number of occupied squares.
    pub fn piece_count(&self) -> usize {
        self.squares.iter().flatten().filter(|&&c| c != 0).count()
    }

    // -----------------------------------------------------------------------
    // Move application
    // -----------------------------------------------------------------------

    /// Play a resolved move record on the board.
    ///
    /// Game-end markers leave the board untouched. Castles relocate king and
    /// rook between their fixed squares regardless of what occupies them.
    ///
    /// Records built by [`Game::play`](crate::engine::Game::play) always
    /// carry both squares for positional moves; a record without them is
    /// rejected with `OutOfBoard` and the board is not touched.
    pub fn apply(&mut self, record: &MoveRecord) -> Result<(), ChessError> {
        let color = record.color();
        match record.kind() {
            TokenKind::GameEnd(_) => Ok(()),
            TokenKind::Castle(side) => {
                self.castle(color, *side);
                Ok(())
            }
            TokenKind::Positional(_) => {
                let (Some(from), Some(to)) = (record.from(), record.to()) else {
                    return Err(ChessError::unresolved(
                        record.raw(),
                        UnresolvedKind::OutOfBoard,
                    ));
                };
                let moving = self.get(from);
                self.set(from, 0);
                self.set(to, moving);
                if let Some(victim) = record.en_passant_square() {
                    self.set(victim, 0);
                }
                if let Some(piece) = record.promotion() {
                    self.set(to, piece.code(color));
                }
                Ok(())
            }
        }
    }

    fn castle(&mut self, color: Color, side: CastleSide) {
        let squares = castle_squares(color, side);
        self.set(squares.king_to, self.get(squares.king_from));
        self.set(squares.king_from, 0);
        self.set(squares.rook_to, self.get(squares.rook_from));
        self.set(squares.rook_from, 0);
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Text diagram, rank 8 first, with rank numbers down the left and a
    /// file ruler underneath. Empty squares print as `.`.
    pub fn board_string(&self) -> String {
        let mut lines: Vec<String> = (0..8u8)
            .rev()
            .map(|rank| {
                let cells: Vec<String> = self
                    .squares
                    .iter()
                    .map(|column| code_char(column[rank as usize]).unwrap_or('.').to_string())
                    .collect();
                format!("{} | {}", rank + 1, cells.join(" "))
            })
            .collect();
        lines.push("  +----------------".to_string());
        lines.push("    a b c d e f g h".to_string());
        lines.join("\n")
    }
}

impl Occupancy for Board {
    #[inline]
    fn code_at(&self, sq: Square) -> i8 {
        self.get(sq)
    }
}

// ---------------------------------------------------------------------------
// Castling squares
// ---------------------------------------------------------------------------

/// Fixed king and rook squares for one castle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastleSquares {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

/// King e-file to g/c, rook h/a to f/d, on the mover's back rank.
pub fn castle_squares(color: Color, side: CastleSide) -> CastleSquares {
    let rank = color.back_rank();
    let (king_to, rook_from, rook_to) = match side {
        CastleSide::KingSide => (6, 7, 5),
        CastleSide::QueenSide => (2, 0, 3),
    };
    CastleSquares {
        king_from: Square::from_file_rank(4, rank),
        king_to: Square::from_file_rank(king_to, rank),
        rook_from: Square::from_file_rank(rook_from, rank),
        rook_to: Square::from_file_rank(rook_to, rank),
    }
}

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Board {
    /// Parse the piece-placement field of a FEN string.
    ///
    /// Any fields after the first are ignored; the board carries no side to
    /// move, castling rights or clocks.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let placement = fen
            .split_whitespace()
            .next()
            .ok_or_else(|| ChessError::InvalidFen("empty FEN string".to_string()))?;

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (rank, row) in (0..8u8).rev().zip(rows) {
            board.fill_rank(rank, row)?;
        }
        Ok(board)
    }

    /// Place one `/`-separated row of a placement field, a-file first.
    fn fill_rank(&mut self, rank: u8, row: &str) -> Result<(), ChessError> {
        let bad = |what: String| ChessError::InvalidFen(format!("rank {}: {what}", rank + 1));
        let mut file = 0u8;
        for ch in row.chars() {
            let width = match ch {
                '1'..='8' => ch as u8 - b'0',
                _ => {
                    let (color, piece) = PieceType::from_char(ch)
                        .ok_or_else(|| bad(format!("unexpected '{ch}'")))?;
                    if file < 8 {
                        self.set(Square::from_file_rank(file, rank), piece.code(color));
                    }
                    1
                }
            };
            file += width;
            if file > 8 {
                return Err(bad("more than 8 squares".to_string()));
            }
        }
        if file != 8 {
            return Err(bad(format!("{file} squares instead of 8")));
        }
        Ok(())
    }

    /// Piece placement only, rank 8 first.
    pub fn placement(&self) -> String {
        let mut fen = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match code_char(self.get(Square::from_file_rank(file, rank))) {
                    Some(ch) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(ch);
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen
    }

    /// Placement followed by the constant [`FEN_SUFFIX`].
    pub fn to_fen(&self) -> String {
        let mut fen = self.placement();
        fen.push_str(FEN_SUFFIX);
        fen
    }

    pub fn is_starting(&self) -> bool {
        self.placement() == STARTING_PLACEMENT
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.placement())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
