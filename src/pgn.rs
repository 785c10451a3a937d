//! PGN transcript reading.
//!
//! A transcript holds any number of games. Each game is a block of tag
//! lines (`[White "Morphy"]`) followed by movetext (`1. e4 e5 2. Nf3 ...`)
//! closed by a result marker. Games are replayed independently: a bad move
//! stops its own game and nothing else.

use tracing::{debug, warn};

use crate::engine::game::Game;
use crate::engine::types::{ChessError, MalformedKind};

const RESULT_MARKERS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

// =========================================================================
// Game splitting
// =========================================================================

/// Split a transcript into game blocks.
///
/// A block ends at the first non-tag line ending with a result marker. Blank
/// lines are dropped and every kept line is trimmed. Text after the last
/// marker becomes a final block of its own.
pub fn split_games(text: &str) -> Vec<String> {
    let mut games = Vec::new();
    let mut current = String::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        current.push_str(line);
        current.push('\n');
        if !line.starts_with('[') && RESULT_MARKERS.iter().any(|m| line.ends_with(m)) {
            games.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        games.push(current);
    }
    games
}

/// Parse a `[Name "Value"]` tag line.
pub fn parse_tag(line: &str) -> Option<(String, String)> {
    let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
    let (name, value) = inner.split_once(char::is_whitespace)?;
    let value = value.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((name.to_string(), value.to_string()))
}

// =========================================================================
// Movetext tokenization
// =========================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Move(String),
    /// Text between `{` and `}` with whitespace collapsed.
    Comment(String),
}

/// Split movetext into move and comment tokens.
///
/// Move numbers (`12.`, `12...`, or glued as in `12.e4`), `e.p.` markers and
/// `$n` glyphs are dropped; trailing `!` and `?` are stripped from moves.
pub fn tokenize_movetext(text: &str) -> Result<Vec<Token>, ChessError> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        push_moves(&rest[..open], &mut tokens);
        let body = &rest[open + 1..];
        let Some(close) = body.find('}') else {
            let fragment = rest[open..].split_whitespace().next().unwrap_or("{");
            return Err(ChessError::malformed(
                fragment,
                MalformedKind::UnterminatedComment,
            ));
        };
        let comment = body[..close].split_whitespace().collect::<Vec<_>>().join(" ");
        tokens.push(Token::Comment(comment));
        rest = &body[close + 1..];
    }
    push_moves(rest, &mut tokens);
    Ok(tokens)
}

fn push_moves(segment: &str, tokens: &mut Vec<Token>) {
    for word in segment.split_whitespace() {
        let word = strip_move_number(word);
        if word.is_empty() {
            continue;
        }
        if word == "e.p." || word.starts_with('$') {
            debug!(word, "skipping annotation token");
            continue;
        }
        let word = word.trim_end_matches(['!', '?']);
        if !word.is_empty() {
            tokens.push(Token::Move(word.to_string()));
        }
    }
}

fn strip_move_number(word: &str) -> &str {
    let after_digits = word.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() < word.len() && after_digits.starts_with('.') {
        after_digits.trim_start_matches('.')
    } else {
        word
    }
}

// =========================================================================
// Game parsing
// =========================================================================

/// A replayed game and the error that stopped it, if any.
#[derive(Clone, Debug)]
pub struct ParsedGame {
    pub game: Game,
    pub error: Option<ChessError>,
}

impl ParsedGame {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Read tags and replay the movetext of one game block.
///
/// Moves before a failure stay applied; the failure is kept on the result.
pub fn parse_game(text: &str) -> ParsedGame {
    let mut game = Game::new();
    let mut movetext = String::new();
    for line in text.lines().map(str::trim) {
        if line.starts_with('[') {
            match parse_tag(line) {
                Some((name, value)) => game.set_tag(name, value),
                None => debug!(line, "ignoring malformed tag line"),
            }
        } else if !line.is_empty() {
            movetext.push_str(line);
            movetext.push(' ');
        }
    }
    let error = replay(&mut game, &movetext).err();
    ParsedGame { game, error }
}

fn replay(game: &mut Game, movetext: &str) -> Result<(), ChessError> {
    for token in tokenize_movetext(movetext)? {
        match token {
            Token::Move(text) => {
                game.play(&text)?;
            }
            Token::Comment(text) => {
                if !game.annotate_last(text) {
                    debug!("ignoring comment before the first move");
                }
            }
        }
    }
    Ok(())
}

/// Parse every game in a transcript. Aborted games are logged and kept.
pub fn parse_all(text: &str) -> Vec<ParsedGame> {
    split_games(text)
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let parsed = parse_game(block);
            if let Some(err) = &parsed.error {
                warn!(
                    game = index,
                    moves = parsed.game.moves().len(),
                    error = %err,
                    "game aborted"
                );
                debug!("board at abort:\n{}", parsed.game.board());
            }
            parsed
        })
        .collect()
}

// =========================================================================
// Tests
// =========================================================================
