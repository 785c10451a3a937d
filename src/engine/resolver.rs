//! Turn a classified move token into origin and destination squares.
//!
//! Candidates are searched outward from the destination using the moving
//! piece's movement table. The first candidate that holds the right piece,
//! fits any disambiguation hint, and does not uncover a sliding attack on its
//! own king wins. Only the discovered-line check is performed; the resolver
//! does not otherwise validate legality.

use tracing::debug;

use crate::engine::board::{Board, castle_squares};
use crate::engine::movement::{
    Delta, Movement, Occupancy, QUEEN_RAYS, first_blocker, movement, slides_along,
};
use crate::engine::notation::{ClassifiedMove, MoveShape, TokenKind};
use crate::engine::types::{
    ChessError, Color, MalformedKind, PieceType, Square, UnresolvedKind,
};

/// Squares a move touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub from: Option<Square>,
    pub to: Option<Square>,
    /// Square of the pawn removed by an en passant capture.
    pub en_passant: Option<Square>,
}

/// Resolve `mv` for `color` against `board`.
pub fn resolve(mv: &ClassifiedMove, color: Color, board: &Board) -> Result<Resolution, ChessError> {
    match &mv.kind {
        TokenKind::GameEnd(_) => Ok(Resolution::default()),
        TokenKind::Castle(side) => {
            let squares = castle_squares(color, *side);
            Ok(Resolution {
                from: Some(squares.king_from),
                to: Some(squares.king_to),
                en_passant: None,
            })
        }
        TokenKind::Positional(shape) => resolve_shape(&mv.raw, shape, color, board),
    }
}

fn resolve_shape(
    token: &str,
    shape: &MoveShape,
    color: Color,
    board: &Board,
) -> Result<Resolution, ChessError> {
    let to = shape.destination();
    let piece = shape.piece();
    let from = match *shape {
        MoveShape::PawnAdvance { to } => pawn_origin(token, board, color, to.file(), to)?,
        MoveShape::Piece { piece, to } => origin(token, board, color, piece, to, Hint::None)?,
        MoveShape::PieceFile { piece, file, to } => {
            origin(token, board, color, piece, to, Hint::File(file))?
        }
        MoveShape::PieceSquare { piece, from, .. } => {
            if board.get(from) != piece.code(color) {
                return Err(ChessError::unresolved(
                    token,
                    UnresolvedKind::PieceMismatch { square: from },
                ));
            }
            from
        }
        MoveShape::PawnFile { file, to } => pawn_origin(token, board, color, file, to)?,
        MoveShape::PieceRank { piece, rank, to } => {
            if piece == PieceType::Pawn {
                return Err(ChessError::malformed(
                    token,
                    MalformedKind::PawnRankDisambiguation,
                ));
            }
            origin(token, board, color, piece, to, Hint::Rank(rank))?
        }
    };

    let en_passant = if piece == PieceType::Pawn {
        en_passant_victim(token, board, color, from, to)?
    } else {
        None
    };

    debug!(token, %from, %to, "resolved move");
    Ok(Resolution {
        from: Some(from),
        to: Some(to),
        en_passant,
    })
}

// ---------------------------------------------------------------------------
// Candidate search
// ---------------------------------------------------------------------------

/// Disambiguation carried by the token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hint {
    None,
    File(u8),
    Rank(u8),
}

impl Hint {
    fn matches(self, sq: Square) -> bool {
        match self {
            Hint::None => true,
            Hint::File(file) => sq.file() == file,
            Hint::Rank(rank) => sq.rank() == rank,
        }
    }
}

fn origin(
    token: &str,
    board: &Board,
    color: Color,
    piece: PieceType,
    to: Square,
    hint: Hint,
) -> Result<Square, ChessError> {
    let found = match movement(piece) {
        Movement::Pawn => {
            let file = match hint {
                Hint::File(file) => file,
                _ => to.file(),
            };
            return pawn_origin(token, board, color, file, to);
        }
        Movement::Steps(offsets) => step_origin(board, color, piece, to, offsets, hint),
        Movement::Rays(dirs) => ray_origin(board, color, piece, to, dirs, hint),
    };
    found.ok_or_else(|| ChessError::unresolved(token, UnresolvedKind::PieceOrigin(piece)))
}

/// One or two squares behind `to` on `file`, nearer first.
fn pawn_origin(
    token: &str,
    board: &Board,
    color: Color,
    file: u8,
    to: Square,
) -> Result<Square, ChessError> {
    let pawn = PieceType::Pawn.code(color);
    let back = -color.pawn_direction();
    (1..=2)
        .filter_map(|dist| Square::try_from_coords(file as i8, to.rank() as i8 + back * dist))
        .find(|&sq| board.get(sq) == pawn)
        .ok_or_else(|| ChessError::unresolved(token, UnresolvedKind::PawnOrigin))
}

fn step_origin(
    board: &Board,
    color: Color,
    piece: PieceType,
    to: Square,
    offsets: &[Delta],
    hint: Hint,
) -> Option<Square> {
    let code = piece.code(color);
    offsets
        .iter()
        .filter_map(|&(df, dr)| to.offset(df, dr))
        .filter(|&sq| board.get(sq) == code && hint.matches(sq))
        .find(|&sq| piece == PieceType::King || !exposes_king(board, color, sq, to))
}

fn ray_origin(
    board: &Board,
    color: Color,
    piece: PieceType,
    to: Square,
    dirs: &[Delta],
    hint: Hint,
) -> Option<Square> {
    let code = piece.code(color);
    dirs.iter()
        .filter_map(|&dir| first_blocker(board, to, dir))
        .filter(|&sq| board.get(sq) == code && hint.matches(sq))
        .find(|&sq| !exposes_king(board, color, sq, to))
}

// ---------------------------------------------------------------------------
// Discovered-line check
// ---------------------------------------------------------------------------

/// The board as it would look with the piece on `from` standing on `to`.
struct Hypothetical<'a> {
    board: &'a Board,
    from: Square,
    to: Square,
    moving: i8,
}

impl Occupancy for Hypothetical<'_> {
    fn code_at(&self, sq: Square) -> i8 {
        if sq == self.from {
            0
        } else if sq == self.to {
            self.moving
        } else {
            self.board.get(sq)
        }
    }
}

/// Whether moving `color`'s piece from `from` to `to` leaves its king on an
/// open line to an enemy queen, rook or bishop. Always false without a king.
pub fn exposes_king(board: &Board, color: Color, from: Square, to: Square) -> bool {
    let Some(king) = board.king_square(color) else {
        return false;
    };
    let view = Hypothetical {
        board,
        from,
        to,
        moving: board.get(from),
    };
    QUEEN_RAYS.iter().any(|&dir| {
        let Some(hit) = first_blocker(&view, king, dir) else {
            return false;
        };
        let code = view.code_at(hit);
        Color::of_code(code) == Some(!color)
            && PieceType::from_code(code).is_some_and(|pt| slides_along(pt, dir))
    })
}

// ---------------------------------------------------------------------------
// En passant
// ---------------------------------------------------------------------------

/// A pawn changing file onto an empty square must be capturing en passant;
/// the captured pawn stands beside the origin on the destination file.
fn en_passant_victim(
    token: &str,
    board: &Board,
    color: Color,
    from: Square,
    to: Square,
) -> Result<Option<Square>, ChessError> {
    if from.file() == to.file() || board.get(to) != 0 {
        return Ok(None);
    }
    let victim = Square::from_file_rank(to.file(), from.rank());
    if board.get(victim) == PieceType::Pawn.code(!color) {
        Ok(Some(victim))
    } else {
        Err(ChessError::unresolved(
            token,
            UnresolvedKind::EnPassantExpected { square: victim },
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::notation::classify;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn board(placement: &str) -> Board {
        Board::from_fen(placement).unwrap()
    }

    fn squares(token: &str, color: Color, board: &Board) -> (Square, Square) {
        let res = resolve(&classify(token).unwrap(), color, board).unwrap();
        (res.from.unwrap(), res.to.unwrap())
    }

    fn error(token: &str, color: Color, board: &Board) -> ChessError {
        resolve(&classify(token).unwrap(), color, board).unwrap_err()
    }

    // ===================================================================
    // Shape 1 and 5: pawns
    // ===================================================================

    #[test]
    fn pawn_single_and_double_push() {
        let start = Board::starting();
        assert_eq!(squares("e3", Color::White, &start), (sq("e2"), sq("e3")));
        assert_eq!(squares("e4", Color::White, &start), (sq("e2"), sq("e4")));
        assert_eq!(squares("d5", Color::Black, &start), (sq("d7"), sq("d5")));
    }

    #[test]
    fn pawn_push_without_pawn() {
        let start = Board::starting();
        assert_eq!(
            error("e5", Color::White, &start),
            ChessError::unresolved("e5", UnresolvedKind::PawnOrigin)
        );
    }

    #[test]
    fn pawn_capture_by_file() {
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR");
        assert_eq!(squares("exd5", Color::White, &b), (sq("e4"), sq("d5")));
        assert_eq!(squares("dxe4", Color::Black, &b), (sq("d5"), sq("e4")));
    }

    #[test]
    fn pawn_push_on_first_rank_has_no_origin() {
        let b = Board::empty();
        assert_eq!(
            error("a1", Color::White, &b),
            ChessError::unresolved("a1", UnresolvedKind::PawnOrigin)
        );
    }

    // ===================================================================
    // Shape 2: piece to square
    // ===================================================================

    #[test]
    fn knight_from_start() {
        let start = Board::starting();
        assert_eq!(squares("Nf3", Color::White, &start), (sq("g1"), sq("f3")));
        assert_eq!(squares("Nc6", Color::Black, &start), (sq("b8"), sq("c6")));
    }

    #[test]
    fn bishop_along_open_diagonal() {
        let b = board("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR");
        assert_eq!(squares("Bb5", Color::White, &b), (sq("f1"), sq("b5")));
    }

    #[test]
    fn slider_blocked_by_own_pawn() {
        let start = Board::starting();
        assert_eq!(
            error("Bb5", Color::White, &start),
            ChessError::unresolved("Bb5", UnresolvedKind::PieceOrigin(PieceType::Bishop))
        );
    }

    #[test]
    fn king_single_step() {
        let b = board("4k3/8/8/8/8/8/8/4K3");
        assert_eq!(squares("Kd2", Color::White, &b), (sq("e1"), sq("d2")));
        assert_eq!(squares("Kf7", Color::Black, &b), (sq("e8"), sq("f7")));
    }

    #[test]
    fn explicit_pawn_letter_resolves_as_pawn() {
        let start = Board::starting();
        assert_eq!(squares("Pe4", Color::White, &start), (sq("e2"), sq("e4")));
    }

    // ===================================================================
    // Shape 3 and 6: disambiguation
    // ===================================================================

    #[test]
    fn file_disambiguation() {
        // Knights on b8 and f6 both reach d7.
        let b = board("rn2kb1r/8/5n2/8/8/8/8/4K3");
        assert_eq!(squares("Nbd7", Color::Black, &b), (sq("b8"), sq("d7")));
        assert_eq!(squares("Nfd7", Color::Black, &b), (sq("f6"), sq("d7")));
    }

    #[test]
    fn rank_disambiguation() {
        // Rooks on a1 and a5 both reach a3.
        let b = board("4k3/8/8/R7/8/8/8/R3K3");
        assert_eq!(squares("R1a3", Color::White, &b), (sq("a1"), sq("a3")));
        assert_eq!(squares("R5a3", Color::White, &b), (sq("a5"), sq("a3")));
    }

    #[test]
    fn pawn_with_file_letter() {
        let b = board("4k3/8/8/3p4/4P3/8/8/4K3");
        assert_eq!(squares("Pexd5", Color::White, &b), (sq("e4"), sq("d5")));
    }

    #[test]
    fn pawn_rank_disambiguation_is_malformed() {
        let start = Board::starting();
        assert_eq!(
            error("P2e4", Color::White, &start),
            ChessError::malformed("P2e4", MalformedKind::PawnRankDisambiguation)
        );
    }

    #[test]
    fn file_hint_without_matching_piece() {
        // Only the b1 knight reaches d2, and the token asks for the c-file.
        let b = board("4k3/8/8/8/8/8/8/1N2K3");
        assert_eq!(
            error("Ncd2", Color::White, &b),
            ChessError::unresolved("Ncd2", UnresolvedKind::PieceOrigin(PieceType::Knight))
        );
    }

    #[test]
    fn rank_hint_without_matching_piece() {
        let b = board("4k3/8/8/8/8/8/8/R3K3");
        assert_eq!(
            error("R5a3", Color::White, &b),
            ChessError::unresolved("R5a3", UnresolvedKind::PieceOrigin(PieceType::Rook))
        );
    }

    #[test]
    fn pawn_capture_without_pawn_on_file() {
        let b = board("4k3/8/8/3p4/8/8/8/4K3");
        assert_eq!(
            error("exd5", Color::White, &b),
            ChessError::unresolved("exd5", UnresolvedKind::PawnOrigin)
        );
    }

    // ===================================================================
    // Shape 4: explicit origin
    // ===================================================================

    #[test]
    fn explicit_origin() {
        let b = board("4k3/8/8/8/7Q/8/8/Q3K3");
        assert_eq!(squares("Qh4d4", Color::White, &b), (sq("h4"), sq("d4")));
    }

    #[test]
    fn explicit_origin_without_piece() {
        let b = board("4k3/8/8/8/8/8/8/Q3K3");
        assert_eq!(
            error("Qh4d4", Color::White, &b),
            ChessError::unresolved(
                "Qh4d4",
                UnresolvedKind::PieceMismatch { square: sq("h4") }
            )
        );
    }

    // ===================================================================
    // Discovered-line check
    // ===================================================================

    #[test]
    fn pinned_knight_is_skipped() {
        // Knight c3 is pinned against e1 by the bishop on b4; knight g1 must move.
        let b = board("4k3/8/8/8/1b6/2N5/8/4K1N1");
        assert_eq!(squares("Ne2", Color::White, &b), (sq("g1"), sq("e2")));
    }

    #[test]
    fn pinned_rook_is_skipped_along_its_ray() {
        // Rook e2 shields g2 from the rook on a2, so the a4 rook goes to e4.
        let b = board("7k/8/8/8/R7/8/r3R1K1/8");
        assert_eq!(squares("Re4", Color::White, &b), (sq("a4"), sq("e4")));
    }

    #[test]
    fn pinned_piece_may_move_along_the_pin() {
        // Rook d2 stays on the d-file, so the king remains covered.
        let b = board("3qk3/8/8/8/8/8/3R4/3K4");
        assert_eq!(squares("Rd5", Color::White, &b), (sq("d2"), sq("d5")));
    }

    #[test]
    fn only_candidate_pinned() {
        let b = board("4k3/8/8/8/1b6/2N5/8/4K3");
        assert_eq!(
            error("Ne2", Color::White, &b),
            ChessError::unresolved("Ne2", UnresolvedKind::PieceOrigin(PieceType::Knight))
        );
    }

    #[test]
    fn hint_applies_before_the_pin_filter() {
        // The c-file names the pinned knight; g1 also reaches e2 but is not asked for.
        let b = board("4k3/8/8/8/1b6/2N5/8/4K1N1");
        assert_eq!(
            error("Nce2", Color::White, &b),
            ChessError::unresolved("Nce2", UnresolvedKind::PieceOrigin(PieceType::Knight))
        );
        assert_eq!(squares("Nge2", Color::White, &b), (sq("g1"), sq("e2")));
    }

    #[test]
    fn knight_check_on_own_king_is_not_detected() {
        // The f3 knight keeps checking e1 after the rook leaves; only slider lines count.
        let b = board("4k3/8/8/8/8/5n2/3R4/4K3");
        assert_eq!(squares("Rd5", Color::White, &b), (sq("d2"), sq("d5")));
    }

    #[test]
    fn capturing_the_pinner_is_allowed() {
        let b = board("4k3/8/8/8/1b6/2N5/8/4K3");
        assert!(!exposes_king(&b, Color::White, sq("c3"), sq("b4")));
    }

    #[test]
    fn no_king_never_exposes() {
        let b = board("8/8/8/8/1b6/2N5/8/8");
        assert!(!exposes_king(&b, Color::White, sq("c3"), sq("e2")));
    }

    #[test]
    fn rook_does_not_pin_on_diagonal() {
        let b = board("4k3/8/8/8/1r6/2N5/8/4K3");
        assert!(!exposes_king(&b, Color::White, sq("c3"), sq("e2")));
    }

    #[test]
    fn king_ignores_discovered_line() {
        // Moving along the rook's file would be illegal, but the king is exempt.
        let b = board("4r1k1/8/8/8/8/8/8/4K3");
        assert_eq!(squares("Ke2", Color::White, &b), (sq("e1"), sq("e2")));
    }

    // ===================================================================
    // En passant
    // ===================================================================

    #[test]
    fn en_passant_detected() {
        let b = board("4k3/8/8/3Pp3/8/8/8/4K3");
        let res = resolve(&classify("dxe6").unwrap(), Color::White, &b).unwrap();
        assert_eq!(res.from, Some(sq("d5")));
        assert_eq!(res.to, Some(sq("e6")));
        assert_eq!(res.en_passant, Some(sq("e5")));
    }

    #[test]
    fn diagonal_onto_empty_square_without_victim() {
        let b = board("4k3/8/8/3P4/8/8/8/4K3");
        assert_eq!(
            error("dxe6", Color::White, &b),
            ChessError::unresolved("dxe6", UnresolvedKind::EnPassantExpected { square: sq("e5") })
        );
    }

    #[test]
    fn ordinary_capture_is_not_en_passant() {
        let b = board("4k3/8/4p3/3P4/8/8/8/4K3");
        let res = resolve(&classify("dxe6").unwrap(), Color::White, &b).unwrap();
        assert_eq!(res.en_passant, None);
    }

    // ===================================================================
    // Castles and game-end markers
    // ===================================================================

    #[test]
    fn castle_uses_fixed_king_squares() {
        let start = Board::starting();
        assert_eq!(squares("O-O", Color::White, &start), (sq("e1"), sq("g1")));
        assert_eq!(squares("O-O-O", Color::Black, &start), (sq("e8"), sq("c8")));
    }

    #[test]
    fn game_end_has_no_squares() {
        let res = resolve(&classify("1-0").unwrap(), Color::White, &Board::starting()).unwrap();
        assert_eq!(res, Resolution::default());
    }
}
