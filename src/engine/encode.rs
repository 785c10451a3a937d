//! Relational encoding of a board snapshot.
//!
//! Every occupied square is analysed for the squares its piece can reach,
//! attack, defend, or attack through one enemy piece (ray attack). The
//! result is written as one line of whitespace-separated tokens per square,
//! the form consumed by the position index:
//!
//! ```text
//! Ra1 Ra2|0.890625 Ra3|0.78125 R>a7 R=a8
//! ```
//!
//! Reachable tokens carry a payload weight after the delimiter; the other
//! relations are marked with `>` (attacking), `<` (defending) and `=`
//! (ray attack).

use crate::engine::board::Board;
use crate::engine::movement::{
    Delta, Movement, QUEEN_RAYS, Sight, movement, sight_line, steps,
};
use crate::engine::types::{Color, PieceType, Square, code_char};

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Reachable,
    Attacking,
    Defending,
    RayAttack,
}

impl Relation {
    /// Token marker; reachable squares have none.
    pub fn marker(self) -> Option<char> {
        match self {
            Relation::Reachable => None,
            Relation::Attacking => Some('>'),
            Relation::Defending => Some('<'),
            Relation::RayAttack => Some('='),
        }
    }
}

/// Aligned-square distance between `a` and `b`.
///
/// Only meaningful for squares sharing a rank, file or diagonal.
pub fn board_distance(a: Square, b: Square) -> u8 {
    let df = a.file().abs_diff(b.file());
    let dr = a.rank().abs_diff(b.rank());
    if a.rank() == b.rank() {
        df
    } else if a.file() == b.file() {
        dr
    } else {
        (df + dr) >> 1
    }
}

/// Payload weight of a reachable square `distance` away.
#[inline]
pub fn reachable_weight(distance: u8) -> f32 {
    1.0 - (7.0 / 64.0) * distance as f32
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Relations of the piece standing on `origin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analysis {
    /// Notation letter, case giving the colour.
    pub piece: char,
    pub origin: Square,
    pub reachable: Vec<Square>,
    pub attacking: Vec<Square>,
    pub defending: Vec<Square>,
    pub ray_attacking: Vec<Square>,
}

impl Analysis {
    fn new(piece: char, origin: Square) -> Self {
        Analysis {
            piece,
            origin,
            reachable: Vec::new(),
            attacking: Vec::new(),
            defending: Vec::new(),
            ray_attacking: Vec::new(),
        }
    }

    fn record(&mut self, relation: Relation, sq: Square) {
        match relation {
            Relation::Reachable => self.reachable.push(sq),
            Relation::Attacking => self.attacking.push(sq),
            Relation::Defending => self.defending.push(sq),
            Relation::RayAttack => self.ray_attacking.push(sq),
        }
    }

    /// Entries in output order: reachable, attacking, defending, ray attack.
    pub fn entries(&self, mode: EncodingMode) -> Vec<EncodingEntry> {
        let reachable: &[Square] = match mode {
            EncodingMode::Document => &self.reachable,
            EncodingMode::Query => &[],
        };
        [
            (Relation::Reachable, reachable),
            (Relation::Attacking, &self.attacking[..]),
            (Relation::Defending, &self.defending[..]),
            (Relation::RayAttack, &self.ray_attacking[..]),
        ]
        .into_iter()
        .flat_map(|(relation, squares)| {
            squares.iter().map(move |&target| EncodingEntry {
                piece: self.piece,
                origin: self.origin,
                target,
                relation,
            })
        })
        .collect()
    }
}

/// Analyse the piece on `sq`; `None` for an empty square.
pub fn analyze(board: &Board, sq: Square) -> Option<Analysis> {
    let code = board.get(sq);
    let color = Color::of_code(code)?;
    let piece = PieceType::from_code(code)?;
    let mut analysis = Analysis::new(code_char(code)?, sq);

    match (piece, movement(piece)) {
        (_, Movement::Pawn) => pawn_relations(board, sq, color, &mut analysis),
        (PieceType::King, _) => {
            ray_relations(board, sq, color, &QUEEN_RAYS, &mut analysis);
            let near = |t: &Square| board_distance(sq, *t) <= 1;
            analysis.reachable.retain(near);
            analysis.attacking.retain(near);
            analysis.defending.retain(near);
            analysis.ray_attacking.clear();
        }
        (_, Movement::Steps(offsets)) => step_relations(board, sq, color, offsets, &mut analysis),
        (_, Movement::Rays(dirs)) => ray_relations(board, sq, color, dirs, &mut analysis),
    }
    Some(analysis)
}

/// Relation of `target` to a piece of `color`: empty, enemy or friend.
fn relation_to(board: &Board, color: Color, target: Square) -> Relation {
    match Color::of_code(board.get(target)) {
        None => Relation::Reachable,
        Some(owner) if owner == color => Relation::Defending,
        Some(_) => Relation::Attacking,
    }
}

// Pawns of both colours look toward rank 8 here.
fn pawn_relations(board: &Board, sq: Square, color: Color, analysis: &mut Analysis) {
    if let Some(ahead) = sq.offset(0, 1)
        && board.get(ahead) == 0
    {
        analysis.record(Relation::Reachable, ahead);
    }
    for df in [1, -1] {
        if let Some(target) = sq.offset(df, 1)
            && relation_to(board, color, target) == Relation::Attacking
        {
            analysis.record(Relation::Attacking, target);
        }
    }
}

fn step_relations(
    board: &Board,
    sq: Square,
    color: Color,
    offsets: &[Delta],
    analysis: &mut Analysis,
) {
    for target in steps(sq, offsets) {
        analysis.record(relation_to(board, color, target), target);
    }
}

fn ray_relations(board: &Board, sq: Square, color: Color, dirs: &[Delta], analysis: &mut Analysis) {
    for &dir in dirs {
        let line = sight_line(board, sq, dir, Sight::BehindFirstBlocker);
        analysis.reachable.extend_from_slice(&line.open);
        let Some(first) = line.first_blocker() else {
            continue;
        };
        match relation_to(board, color, first) {
            Relation::Attacking => {
                analysis.record(Relation::Attacking, first);
                if let Some(second) = line.second_blocker() {
                    let relation = match relation_to(board, color, second) {
                        Relation::Attacking => Relation::RayAttack,
                        other => other,
                    };
                    analysis.record(relation, second);
                }
            }
            relation => analysis.record(relation, first),
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodingMode {
    /// Every relation, with weighted reachable squares. Used for indexing.
    Document,
    /// Attack, defense and ray-attack relations only. Used for retrieval.
    Query,
}

/// One relation of one piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingEntry {
    pub piece: char,
    pub origin: Square,
    pub target: Square,
    pub relation: Relation,
}

impl EncodingEntry {
    /// Payload weight, present for reachable squares only.
    pub fn weight(&self) -> Option<f32> {
        (self.relation == Relation::Reachable)
            .then(|| reachable_weight(board_distance(self.origin, self.target)))
    }

    pub fn token(&self, delimiter: char) -> String {
        match (self.relation.marker(), self.weight()) {
            (Some(marker), _) => format!("{}{marker}{}", self.piece, self.target),
            (None, Some(weight)) => format!("{}{}{delimiter}{weight:?}", self.piece, self.target),
            (None, None) => format!("{}{}", self.piece, self.target),
        }
    }
}

/// Writes board snapshots as relation token streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionEncoder {
    delimiter: char,
}

impl Default for PositionEncoder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELIMITER)
    }
}

impl PositionEncoder {
    pub const DEFAULT_DELIMITER: char = '|';

    pub fn new(delimiter: char) -> Self {
        PositionEncoder { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Every occupied square's analysis, a1, a2, .. a8, b1, .. h8.
    pub fn analyses(&self, board: &Board) -> Vec<Analysis> {
        Square::file_major()
            .filter_map(|sq| analyze(board, sq))
            .collect()
    }

    /// One line per occupied square, each ending in `\n`.
    pub fn encode(&self, board: &Board, mode: EncodingMode) -> String {
        let mut out = String::new();
        for analysis in self.analyses(board) {
            out.push(analysis.piece);
            out.push_str(&analysis.origin.to_algebraic());
            for entry in analysis.entries(mode) {
                out.push(' ');
                out.push_str(&entry.token(self.delimiter));
            }
            out.push('\n');
        }
        out
    }

    pub fn document(&self, board: &Board) -> String {
        self.encode(board, EncodingMode::Document)
    }

    pub fn query(&self, board: &Board) -> String {
        self.encode(board, EncodingMode::Query)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
