use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Sign carried by this side's piece codes on a [`Board`](super::board::Board).
    #[inline]
    pub const fn sign(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Colour owning a signed piece code, `None` for an empty square.
    #[inline]
    pub fn of_code(code: i8) -> Option<Color> {
        match code.signum() {
            1 => Some(Color::White),
            -1 => Some(Color::Black),
            _ => None,
        }
    }

    /// Direction of pawn travel along the rank axis.
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        self.sign()
    }

    /// Back rank index (0 for white, 7 for black).
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
///
/// The discriminant doubles as the magnitude of the piece's board code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Number of piece types.
    pub const COUNT: usize = 6;

    /// Unsigned board code, 1 (pawn) through 6 (king).
    #[inline]
    pub const fn magnitude(self) -> i8 {
        self as i8
    }

    /// Signed board code for a piece of `color`.
    #[inline]
    pub const fn code(self, color: Color) -> i8 {
        self.magnitude() * color.sign()
    }

    /// Piece kind of a signed board code, `None` for empty or out-of-range codes.
    pub fn from_code(code: i8) -> Option<Self> {
        match code.unsigned_abs() {
            1 => Some(PieceType::Pawn),
            2 => Some(PieceType::Knight),
            3 => Some(PieceType::Bishop),
            4 => Some(PieceType::Rook),
            5 => Some(PieceType::Queen),
            6 => Some(PieceType::King),
            _ => None,
        }
    }

    /// Upper-case notation letter (`P`, `N`, `B`, `R`, `Q`, `K`).
    pub fn letter(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    /// Parse an upper-case notation letter.
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        match color {
            Color::White => self.letter(),
            Color::Black => self.letter().to_ascii_lowercase(),
        }
    }

    /// Parse a piece character (case gives the colour).
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Self::from_letter(c.to_ascii_uppercase()).map(|pt| (color, pt))
    }

    /// Bishops, rooks and queens move along rays.
    #[inline]
    pub fn is_slider(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Rook | PieceType::Queen)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

/// Notation letter of a signed board code: upper-case for white, lower-case
/// for black, `None` for an empty square.
pub fn code_char(code: i8) -> Option<char> {
    let color = Color::of_code(code)?;
    PieceType::from_code(code).map(|pt| pt.to_char(color))
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the chess board (0..63, LERF: a1=0, h8=63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(pub u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub fn new(index: u8) -> Self {
        debug_assert!(index < 64, "Square index out of range: {index}");
        Square(index)
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Build a square from signed coordinates, `None` when off the board.
    #[inline]
    pub fn try_from_coords(file: i8, rank: i8) -> Option<Self> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::from_file_rank(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// The square `(df, dr)` away, `None` when that leaves the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        Self::try_from_coords(self.file() as i8 + df, self.rank() as i8 + dr)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = file_index(bytes[0] as char)?;
        let rank = rank_index(bytes[1] as char)?;
        Some(Square::from_file_rank(file, rank))
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        format!("{file}{rank}")
    }

    /// Iterate every square file by file: a1, a2, .. a8, b1, .. h8.
    pub fn file_major() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|file| (0..8u8).map(move |rank| Square::from_file_rank(file, rank)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_algebraic())
    }
}

/// File letter `a`..`h` to index 0..7.
#[inline]
pub fn file_index(c: char) -> Option<u8> {
    match c {
        'a'..='h' => Some(c as u8 - b'a'),
        _ => None,
    }
}

/// Rank digit `1`..`8` to index 0..7.
#[inline]
pub fn rank_index(c: char) -> Option<u8> {
    match c {
        '1'..='8' => Some(c as u8 - b'1'),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Why a move token could not be read.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedKind {
    #[error("invalid promotion piece [{0}]")]
    InvalidPromotion(String),

    #[error("token does not match any move shape")]
    UnrecognizedShape,

    #[error("pawn moves cannot be disambiguated by rank")]
    PawnRankDisambiguation,

    #[error("unterminated comment")]
    UnterminatedComment,
}

/// Why a well-formed move token could not be played on the board.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnresolvedKind {
    #[error("no pawn can reach the destination")]
    PawnOrigin,

    #[error("no {0} can reach the destination")]
    PieceOrigin(PieceType),

    #[error("origin square {square} does not hold the named piece")]
    PieceMismatch { square: Square },

    #[error("en passant capture expected on {square}")]
    EnPassantExpected { square: Square },

    #[error("move squares fall outside the board")]
    OutOfBoard,
}

/// Domain errors for move resolution and board handling.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("malformed move `{token}`: {kind}")]
    MalformedMove { token: String, kind: MalformedKind },

    #[error("unresolved move `{token}`: {kind}")]
    UnresolvedMove { token: String, kind: UnresolvedKind },

    #[error("invalid FEN string: {0}")]
    InvalidFen(String),
}

impl ChessError {
    pub fn malformed(token: impl Into<String>, kind: MalformedKind) -> Self {
        ChessError::MalformedMove {
            token: token.into(),
            kind,
        }
    }

    pub fn unresolved(token: impl Into<String>, kind: UnresolvedKind) -> Self {
        ChessError::UnresolvedMove {
            token: token.into(),
            kind,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ChessError::MalformedMove { .. })
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, ChessError::UnresolvedMove { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn color_display() {
        assert_eq!(Color::White.to_string(), "white");
        assert_eq!(Color::Black.to_string(), "black");
    }

    #[test]
    fn color_of_code() {
        assert_eq!(Color::of_code(3), Some(Color::White));
        assert_eq!(Color::of_code(-6), Some(Color::Black));
        assert_eq!(Color::of_code(0), None);
    }

    #[test]
    fn piece_codes_carry_colour_sign() {
        assert_eq!(PieceType::Pawn.code(Color::White), 1);
        assert_eq!(PieceType::Pawn.code(Color::Black), -1);
        assert_eq!(PieceType::King.code(Color::White), 6);
        assert_eq!(PieceType::Queen.code(Color::Black), -5);
    }

    #[test]
    fn piece_from_code() {
        for pt in PieceType::ALL {
            assert_eq!(PieceType::from_code(pt.code(Color::White)), Some(pt));
            assert_eq!(PieceType::from_code(pt.code(Color::Black)), Some(pt));
        }
        assert_eq!(PieceType::from_code(0), None);
        assert_eq!(PieceType::from_code(7), None);
    }

    #[test]
    fn piece_type_char_round_trip() {
        for pt in PieceType::ALL {
            let wc = pt.to_char(Color::White);
            let bc = pt.to_char(Color::Black);
            assert!(wc.is_ascii_uppercase());
            assert!(bc.is_ascii_lowercase());
            assert_eq!(PieceType::from_char(wc), Some((Color::White, pt)));
            assert_eq!(PieceType::from_char(bc), Some((Color::Black, pt)));
        }
    }

    #[test]
    fn piece_letter_rejects_lowercase() {
        assert_eq!(PieceType::from_letter('N'), Some(PieceType::Knight));
        assert_eq!(PieceType::from_letter('n'), None);
        assert_eq!(PieceType::from_letter('X'), None);
    }

    #[test]
    fn code_char_letters() {
        assert_eq!(code_char(2), Some('N'));
        assert_eq!(code_char(-2), Some('n'));
        assert_eq!(code_char(0), None);
    }

    #[test]
    fn square_from_algebraic() {
        assert_eq!(Square::from_algebraic("a1"), Some(Square(0)));
        assert_eq!(Square::from_algebraic("h1"), Some(Square(7)));
        assert_eq!(Square::from_algebraic("a8"), Some(Square(56)));
        assert_eq!(Square::from_algebraic("h8"), Some(Square(63)));
        assert_eq!(Square::from_algebraic("e4"), Some(Square(28)));
    }

    #[test]
    fn square_from_algebraic_invalid() {
        assert_eq!(Square::from_algebraic(""), None);
        assert_eq!(Square::from_algebraic("a"), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("abc"), None);
    }

    #[test]
    fn square_algebraic_round_trip() {
        for i in 0..64 {
            let sq = Square(i);
            assert_eq!(Square::from_algebraic(&sq.to_algebraic()), Some(sq));
        }
    }

    #[test]
    fn square_offset_stays_on_board() {
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(e4.offset(1, 2), Square::from_algebraic("f6"));
        assert_eq!(e4.offset(-4, -3), Square::from_algebraic("a1"));
        assert_eq!(e4.offset(4, 0), None);
        assert_eq!(e4.offset(0, -4), None);
    }

    #[test]
    fn file_major_order() {
        let order: Vec<String> = Square::file_major().take(9).map(|s| s.to_algebraic()).collect();
        assert_eq!(
            order,
            ["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "b1"]
        );
        assert_eq!(Square::file_major().count(), Square::NUM);
    }

    #[test]
    fn error_display_names_token() {
        let err = ChessError::malformed("e8=X", MalformedKind::InvalidPromotion("X".into()));
        assert_eq!(err.to_string(), "malformed move `e8=X`: invalid promotion piece [X]");
        assert!(err.is_malformed());
        assert!(!err.is_unresolved());

        let err = ChessError::unresolved("Nf3", UnresolvedKind::PieceOrigin(PieceType::Knight));
        assert_eq!(err.to_string(), "unresolved move `Nf3`: no knight can reach the destination");
        assert!(err.is_unresolved());
    }
}
