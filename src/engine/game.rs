//! Per-game replay state.
//!
//! `Game` owns the board a transcript is replayed on and the ordered list of
//! move records. Every record keeps a copy of the board as it stood before
//! the move, the position the move was resolved against and the one handed
//! to the encoder.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::engine::board::Board;
use crate::engine::notation::{self, CastleSide, ClassifiedMove, GameResult, MoveShape, TokenKind};
use crate::engine::resolver::{self, Resolution};
use crate::engine::types::{ChessError, Color, PieceType, Square};

// =========================================================================
// MoveRecord
// =========================================================================

/// A resolved move token.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    ply: usize,
    classified: ClassifiedMove,
    color: Color,
    resolution: Resolution,
    annotation: Option<String>,
    /// Board before this move.
    board: Board,
}

impl MoveRecord {
    fn new(
        ply: usize,
        classified: ClassifiedMove,
        color: Color,
        resolution: Resolution,
        board: Board,
    ) -> Self {
        MoveRecord {
            ply,
            classified,
            color,
            resolution,
            annotation: None,
            board,
        }
    }

    /// Zero-based index of the token within its game.
    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn raw(&self) -> &str {
        &self.classified.raw
    }

    pub fn stripped(&self) -> &str {
        &self.classified.stripped
    }

    pub fn kind(&self) -> &TokenKind {
        &self.classified.kind
    }

    pub fn shape(&self) -> Option<&MoveShape> {
        self.classified.shape()
    }

    pub fn piece(&self) -> PieceType {
        self.classified.piece
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn from(&self) -> Option<Square> {
        self.resolution.from
    }

    pub fn to(&self) -> Option<Square> {
        self.resolution.to
    }

    pub fn is_capture(&self) -> bool {
        self.classified.capture
    }

    pub fn is_check(&self) -> bool {
        self.classified.check
    }

    pub fn is_mate(&self) -> bool {
        self.classified.mate
    }

    pub fn is_promotion(&self) -> bool {
        self.classified.promotion.is_some()
    }

    pub fn promotion(&self) -> Option<PieceType> {
        self.classified.promotion
    }

    pub fn castle(&self) -> Option<CastleSide> {
        match self.classified.kind {
            TokenKind::Castle(side) => Some(side),
            _ => None,
        }
    }

    pub fn is_castle_kingside(&self) -> bool {
        self.castle() == Some(CastleSide::KingSide)
    }

    pub fn is_castle_queenside(&self) -> bool {
        self.castle() == Some(CastleSide::QueenSide)
    }

    pub fn is_en_passant(&self) -> bool {
        self.resolution.en_passant.is_some()
    }

    /// Square of the pawn removed by an en passant capture.
    pub fn en_passant_square(&self) -> Option<Square> {
        self.resolution.en_passant
    }

    pub fn game_result(&self) -> Option<GameResult> {
        match self.classified.kind {
            TokenKind::GameEnd(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_game_end(&self) -> bool {
        self.game_result().is_some()
    }

    /// Comment text that followed the move in the transcript.
    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    /// Board as it stood before this move was played.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn summary(&self) -> MoveSummary {
        MoveSummary {
            ply: self.ply,
            token: self.raw().to_string(),
            color: self.color,
            piece: self.piece(),
            from: self.from(),
            to: self.to(),
            capture: self.is_capture(),
            check: self.is_check(),
            mate: self.is_mate(),
            promotion: self.promotion(),
            castle: self.castle().map(|side| match side {
                CastleSide::KingSide => "kingside",
                CastleSide::QueenSide => "queenside",
            }),
            en_passant: self.en_passant_square(),
            result: self.game_result().map(GameResult::as_str),
            annotation: self.annotation.clone(),
            fen_before: self.board.to_fen(),
        }
    }
}

/// JSON-friendly view of a [`MoveRecord`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoveSummary {
    pub ply: usize,
    pub token: String,
    pub color: Color,
    pub piece: PieceType,
    pub from: Option<Square>,
    pub to: Option<Square>,
    pub capture: bool,
    pub check: bool,
    pub mate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub castle: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_passant: Option<Square>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub fen_before: String,
}

// =========================================================================
// Game
// =========================================================================

/// One game being replayed from its movetext.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    side_to_move: Color,
    moves: Vec<MoveRecord>,
    tags: HashMap<String, String>,
    result: Option<GameResult>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A game from the standard starting position, white to move.
    pub fn new() -> Self {
        Self::from_board(Board::starting(), Color::White)
    }

    /// A game continuing from an arbitrary board.
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Game {
            board,
            side_to_move,
            moves: Vec::new(),
            tags: HashMap::new(),
            result: None,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Board after the last move.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    /// Result marker seen in the movetext, if any.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn set_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(name.into(), value.into());
    }

    // -----------------------------------------------------------------
    // Replay
    // -----------------------------------------------------------------

    /// Classify, resolve and apply one move token for the side to move.
    ///
    /// On error the game is left exactly as it was.
    pub fn play(&mut self, token: &str) -> Result<&MoveRecord, ChessError> {
        let color = self.side_to_move;
        let classified = notation::classify(token)?;
        let resolution = resolver::resolve(&classified, color, &self.board)?;

        let ply = self.moves.len();
        let record = MoveRecord::new(ply, classified, color, resolution, self.board.clone());
        self.board.apply(&record)?;

        debug!(ply, token, %color, "played move");
        if let Some(result) = record.game_result() {
            self.result = Some(result);
        }
        self.side_to_move = !color;
        self.moves.push(record);
        Ok(&self.moves[ply])
    }

    /// Attach comment text to the most recent move. Returns `false` when no
    /// move has been played yet.
    pub fn annotate_last(&mut self, text: impl Into<String>) -> bool {
        match self.moves.last_mut() {
            Some(record) => {
                record.annotation = Some(text.into());
                true
            }
            None => false,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
