pub mod board;
pub mod encode;
pub mod game;
pub mod movement;
pub mod notation;
pub mod resolver;
pub mod types;

pub use board::Board;
pub use encode::{EncodingMode, PositionEncoder};
pub use game::{Game, MoveRecord, MoveSummary};
pub use notation::{ClassifiedMove, MoveShape, TokenKind, classify};
pub use resolver::{Resolution, resolve};
pub use types::*;
