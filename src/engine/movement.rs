//! Movement patterns shared by the move resolver and the position encoder.
//!
//! Every piece kind maps to either a fixed list of single-step offsets or a
//! list of ray directions. Offsets are `(file delta, rank delta)`. Ray walks
//! are plain loops bounded by the board edge.

use crate::engine::types::{PieceType, Square};

/// A `(file delta, rank delta)` pair.
pub type Delta = (i8, i8);

pub const KNIGHT_STEPS: [Delta; 8] = [
    (-1, 2),
    (1, 2),
    (-1, -2),
    (1, -2),
    (-2, 1),
    (-2, -1),
    (2, -1),
    (2, 1),
];

pub const BISHOP_RAYS: [Delta; 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

pub const ROOK_RAYS: [Delta; 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Bishop directions followed by rook directions. Also the king's step table.
pub const QUEEN_RAYS: [Delta; 8] = [
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
];

/// How a piece kind covers the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    /// Colour-dependent geometry; each caller handles pawns itself.
    Pawn,
    /// One step along each offset.
    Steps(&'static [Delta]),
    /// Repeated steps along each direction until blocked.
    Rays(&'static [Delta]),
}

/// Movement table for a piece kind.
pub fn movement(piece: PieceType) -> Movement {
    match piece {
        PieceType::Pawn => Movement::Pawn,
        PieceType::Knight => Movement::Steps(&KNIGHT_STEPS),
        PieceType::Bishop => Movement::Rays(&BISHOP_RAYS),
        PieceType::Rook => Movement::Rays(&ROOK_RAYS),
        PieceType::Queen => Movement::Rays(&QUEEN_RAYS),
        PieceType::King => Movement::Steps(&QUEEN_RAYS),
    }
}

/// Whether a ray direction runs along a diagonal.
#[inline]
pub fn is_diagonal(dir: Delta) -> bool {
    dir.0 != 0 && dir.1 != 0
}

/// Whether a slider of kind `piece` attacks along `dir`.
pub fn slides_along(piece: PieceType, dir: Delta) -> bool {
    match piece {
        PieceType::Queen => true,
        PieceType::Bishop => is_diagonal(dir),
        PieceType::Rook => !is_diagonal(dir),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Occupancy
// ---------------------------------------------------------------------------

/// Read access to signed piece codes, implemented by the live board and by
/// hypothetical views over it.
pub trait Occupancy {
    /// Signed piece code on `sq`; 0 when empty.
    fn code_at(&self, sq: Square) -> i8;

    #[inline]
    fn is_empty(&self, sq: Square) -> bool {
        self.code_at(sq) == 0
    }
}

// ---------------------------------------------------------------------------
// Walkers
// ---------------------------------------------------------------------------

/// Squares along one direction, excluding the start square.
#[derive(Clone, Debug)]
pub struct Ray {
    at: Square,
    dir: Delta,
}

impl Iterator for Ray {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        let next = self.at.offset(self.dir.0, self.dir.1)?;
        self.at = next;
        Some(next)
    }
}

/// Walk from `from` along `dir` to the board edge.
pub fn ray(from: Square, dir: Delta) -> Ray {
    Ray { at: from, dir }
}

/// On-board squares one offset away from `from`, in table order.
pub fn steps(from: Square, offsets: &[Delta]) -> impl Iterator<Item = Square> + '_ {
    offsets.iter().filter_map(move |&(df, dr)| from.offset(df, dr))
}

/// How far a sight line looks past occupied squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sight {
    /// Stop at the first occupied square.
    FirstBlocker,
    /// Keep walking over empty squares behind the first occupied square and
    /// stop at the next one.
    BehindFirstBlocker,
}

/// What one ray sees from a square.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SightLine {
    /// Empty squares before the first blocker.
    pub open: Vec<Square>,
    /// Occupied squares in walk order; at most one or two depending on [`Sight`].
    pub blockers: Vec<Square>,
}

impl SightLine {
    pub fn first_blocker(&self) -> Option<Square> {
        self.blockers.first().copied()
    }

    pub fn second_blocker(&self) -> Option<Square> {
        self.blockers.get(1).copied()
    }
}

/// Classify the squares along one ray from `from`.
pub fn sight_line<B: Occupancy + ?Sized>(
    board: &B,
    from: Square,
    dir: Delta,
    sight: Sight,
) -> SightLine {
    let limit = match sight {
        Sight::FirstBlocker => 1,
        Sight::BehindFirstBlocker => 2,
    };
    let mut line = SightLine::default();
    for sq in ray(from, dir) {
        if board.is_empty(sq) {
            if line.blockers.is_empty() {
                line.open.push(sq);
            }
            continue;
        }
        line.blockers.push(sq);
        if line.blockers.len() == limit {
            break;
        }
    }
    line
}

/// First occupied square along `dir` from `from`.
pub fn first_blocker<B: Occupancy + ?Sized>(board: &B, from: Square, dir: Delta) -> Option<Square> {
    ray(from, dir).find(|&sq| !board.is_empty(sq))
}
