//! Lexical classification of algebraic move tokens.
//!
//! A token is reduced to one of six positional shapes, a castle, or a
//! game-end marker. Nothing here looks at a board; turning a shape into
//! origin and destination squares is the resolver's job.
//!
//! Token examples: `e4`, `Nf3`, `Nbd7`, `Qh4e1`, `exd5`, `R1a3`, `O-O`,
//! `e8=Q+`, `1/2-1/2`.

use std::fmt;

use crate::engine::types::{
    ChessError, MalformedKind, PieceType, Square, file_index, rank_index,
};

// =========================================================================
// Token kinds
// =========================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    fn from_token(s: &str) -> Option<Self> {
        match s {
            "O-O" | "0-0" => Some(CastleSide::KingSide),
            "O-O-O" | "0-0-0" => Some(CastleSide::QueenSide),
            _ => None,
        }
    }
}

/// Result marker that closes a movetext.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Unfinished,
}

impl GameResult {
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" => Some(GameResult::Draw),
            "*" => Some(GameResult::Unfinished),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unfinished => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six positional move shapes, numbered 1..6 in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveShape {
    /// `e4`
    PawnAdvance { to: Square },
    /// `Nf3`
    Piece { piece: PieceType, to: Square },
    /// `Nbd7`
    PieceFile { piece: PieceType, file: u8, to: Square },
    /// `Qh4e1`
    PieceSquare { piece: PieceType, from: Square, to: Square },
    /// `ed5`, written `exd5` before capture marks are removed.
    PawnFile { file: u8, to: Square },
    /// `R1a3`
    PieceRank { piece: PieceType, rank: u8, to: Square },
}

impl MoveShape {
    pub fn number(&self) -> u8 {
        match self {
            MoveShape::PawnAdvance { .. } => 1,
            MoveShape::Piece { .. } => 2,
            MoveShape::PieceFile { .. } => 3,
            MoveShape::PieceSquare { .. } => 4,
            MoveShape::PawnFile { .. } => 5,
            MoveShape::PieceRank { .. } => 6,
        }
    }

    pub fn destination(&self) -> Square {
        match *self {
            MoveShape::PawnAdvance { to }
            | MoveShape::Piece { to, .. }
            | MoveShape::PieceFile { to, .. }
            | MoveShape::PieceSquare { to, .. }
            | MoveShape::PawnFile { to, .. }
            | MoveShape::PieceRank { to, .. } => to,
        }
    }

    pub fn piece(&self) -> PieceType {
        match *self {
            MoveShape::PawnAdvance { .. } | MoveShape::PawnFile { .. } => PieceType::Pawn,
            MoveShape::Piece { piece, .. }
            | MoveShape::PieceFile { piece, .. }
            | MoveShape::PieceSquare { piece, .. }
            | MoveShape::PieceRank { piece, .. } => piece,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Castle(CastleSide),
    GameEnd(GameResult),
    Positional(MoveShape),
}

/// A move token after stripping and shape recognition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedMove {
    /// Token exactly as it appeared in the movetext.
    pub raw: String,
    /// Token with capture/check/mate marks and the promotion suffix removed.
    pub stripped: String,
    /// From the leading letter; pawn when there is none.
    pub piece: PieceType,
    pub capture: bool,
    pub check: bool,
    pub mate: bool,
    pub promotion: Option<PieceType>,
    pub kind: TokenKind,
}

impl ClassifiedMove {
    pub fn shape(&self) -> Option<&MoveShape> {
        match &self.kind {
            TokenKind::Positional(shape) => Some(shape),
            _ => None,
        }
    }
}

// =========================================================================
// Classification
// =========================================================================

/// Classify one move token.
///
/// Capture (`x`), check (`+`) and mate (`#`) marks are recorded and removed
/// wherever they appear. A `=` must be followed by exactly one piece letter.
pub fn classify(token: &str) -> Result<ClassifiedMove, ChessError> {
    let piece = token
        .chars()
        .next()
        .and_then(PieceType::from_letter)
        .unwrap_or(PieceType::Pawn);

    let capture = token.contains('x');
    let check = token.contains('+');
    let mate = token.contains('#');
    let mut stripped: String = token
        .chars()
        .filter(|c| !matches!(c, 'x' | '+' | '#'))
        .collect();

    let mut promotion = None;
    if let Some(idx) = stripped.find('=') {
        let suffix = &stripped[idx + 1..];
        let mut letters = suffix.chars();
        match (letters.next().and_then(PieceType::from_letter), letters.next()) {
            (Some(promoted), None) => promotion = Some(promoted),
            _ => {
                return Err(ChessError::malformed(
                    token,
                    MalformedKind::InvalidPromotion(suffix.to_string()),
                ));
            }
        }
        stripped.truncate(idx);
    }

    let (piece, kind) = if let Some(side) = CastleSide::from_token(&stripped) {
        (PieceType::King, TokenKind::Castle(side))
    } else if let Some(result) = GameResult::from_token(&stripped) {
        (piece, TokenKind::GameEnd(result))
    } else {
        let shape = parse_shape(&stripped)
            .ok_or_else(|| ChessError::malformed(token, MalformedKind::UnrecognizedShape))?;
        (piece, TokenKind::Positional(shape))
    };

    Ok(ClassifiedMove {
        raw: token.to_string(),
        stripped,
        piece,
        capture,
        check,
        mate,
        promotion,
        kind,
    })
}

fn square(file: char, rank: char) -> Option<Square> {
    Some(Square::from_file_rank(file_index(file)?, rank_index(rank)?))
}

fn parse_shape(stripped: &str) -> Option<MoveShape> {
    let chars: Vec<char> = stripped.chars().collect();
    match chars.as_slice() {
        &[f, r] => Some(MoveShape::PawnAdvance { to: square(f, r)? }),
        &[lead, f, r] => {
            let to = square(f, r)?;
            if let Some(piece) = PieceType::from_letter(lead) {
                Some(MoveShape::Piece { piece, to })
            } else {
                Some(MoveShape::PawnFile {
                    file: file_index(lead)?,
                    to,
                })
            }
        }
        &[lead, hint, f, r] => {
            let piece = PieceType::from_letter(lead)?;
            let to = square(f, r)?;
            if let Some(file) = file_index(hint) {
                Some(MoveShape::PieceFile { piece, file, to })
            } else {
                Some(MoveShape::PieceRank {
                    piece,
                    rank: rank_index(hint)?,
                    to,
                })
            }
        }
        &[lead, ff, fr, f, r] => Some(MoveShape::PieceSquare {
            piece: PieceType::from_letter(lead)?,
            from: square(ff, fr)?,
            to: square(f, r)?,
        }),
        _ => None,
    }
}

// =========================================================================
// Tests
// =========================================================================
