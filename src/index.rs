//! Hand-off of encoded positions to a search indexer.
//!
//! Each move record of a replayed game becomes one document: the board it
//! was played on, rendered as a placement string and as a document-mode
//! encoding. Opening moves are left out so that common openings do not
//! flood the index.

use serde::Serialize;

use crate::config::AppConfig;
use crate::engine::encode::PositionEncoder;
use crate::engine::game::Game;

/// One indexable position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionDocument {
    pub game_id: String,
    /// Zero-based move record index the position was taken from.
    pub ply: usize,
    /// `White:Black:Result` from the game's tags.
    pub info: String,
    pub fen: String,
    pub content: String,
}

/// `White:Black:Result`, with missing tags left empty.
pub fn game_info(game: &Game) -> String {
    let tag = |name: &str| game.tag(name).unwrap_or_default();
    format!("{}:{}:{}", tag("White"), tag("Black"), tag("Result"))
}

/// Documents for every position past the first `num_skip` full moves, up
/// to the game-end marker.
pub fn documents(game_id: &str, game: &Game, config: &AppConfig) -> Vec<PositionDocument> {
    let encoder = config.encoder();
    let info = game_info(game);
    game.moves()
        .iter()
        .take_while(|record| !record.is_game_end())
        .filter(|record| record.ply() / 2 >= config.num_skip)
        .map(|record| PositionDocument {
            game_id: game_id.to_string(),
            ply: record.ply(),
            info: info.clone(),
            fen: record.board().to_fen(),
            content: encoder.document(record.board()),
        })
        .collect()
}

/// Query encoding of the board held by the last move record.
pub fn query_encoding(game: &Game, delimiter: char) -> Option<String> {
    let record = game.last_move()?;
    Some(PositionEncoder::new(delimiter).query(record.board()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(tokens: &[&str]) -> Game {
        let mut game = Game::new();
        for token in tokens {
            game.play(token).unwrap();
        }
        game
    }

    fn config(num_skip: usize) -> AppConfig {
        AppConfig {
            num_skip,
            ..AppConfig::default()
        }
    }

    #[test]
    fn info_from_tags() {
        let mut game = Game::new();
        game.set_tag("White", "Anderssen");
        game.set_tag("Result", "1-0");
        assert_eq!(game_info(&game), "Anderssen::1-0");
    }

    #[test]
    fn documents_skip_opening_moves() {
        let game = replay(&["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "1-0"]);
        let docs = documents("g1", &game, &config(1));
        let plies: Vec<usize> = docs.iter().map(|d| d.ply).collect();
        assert_eq!(plies, [2, 3, 4, 5]);
        assert_eq!(docs[0].game_id, "g1");
        assert_eq!(docs[0].info, "::");
        assert_eq!(
            docs[0].fen,
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(docs[0].content, config(1).encoder().document(game.moves()[2].board()));
    }

    #[test]
    fn documents_stop_at_game_end() {
        let game = replay(&["d4", "d5", "*"]);
        let docs = documents("g", &game, &config(0));
        assert_eq!(docs.len(), 2);
        assert!(docs[0].content.starts_with("Ra1 R<a2 R<b1\n"));
    }

    #[test]
    fn short_game_yields_nothing() {
        let game = replay(&["e4", "e5", "1-0"]);
        assert!(documents("g", &game, &AppConfig::default()).is_empty());
    }

    #[test]
    fn query_uses_last_snapshot() {
        assert_eq!(query_encoding(&Game::new(), '|'), None);

        let game = replay(&["e4", "e5"]);
        let query = query_encoding(&game, '|').unwrap();
        assert_eq!(query, PositionEncoder::new('|').query(game.moves()[1].board()));
        assert!(!query.contains('|'));
    }
}
